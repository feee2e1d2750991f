//! Bucket metrics: storage class analysis exports.

use crate::catalog::params::{ParamKind, ParamSpec, Params};
use crate::catalog::request::{AnalyticsSettings, ProviderRequest, bucket_arn};
use crate::catalog::{BuildContext, OperationSpec};
use crate::types::error::SpecError;

pub const STORAGE_CLASS_ANALYSIS: &str = "storage-class-analysis";

const DEFAULT_ANALYSIS_ID: &str = "AnalysisConfig";

pub(super) const SPECS: &[OperationSpec] = &[OperationSpec {
    name: STORAGE_CLASS_ANALYSIS,
    description: "Analyse access patterns and export the results",
    params: &[
        ParamSpec::required(
            "destination",
            ParamKind::String,
            "bucket receiving the CSV export",
        ),
        ParamSpec::optional(
            "prefix",
            ParamKind::String,
            "only analyse keys under this prefix",
        ),
        ParamSpec::optional("id", ParamKind::String, "configuration id (default AnalysisConfig)"),
    ],
    secondary_resource: Some("destination"),
    requires_versioning: false,
    builder: build_storage_class_analysis,
}];

fn build_storage_class_analysis(
    ctx: &BuildContext<'_>,
    params: &Params,
) -> Result<ProviderRequest, SpecError> {
    let id = params.str_or("id", DEFAULT_ANALYSIS_ID);
    let destination = params.str_or("destination", ctx.target.name());
    // An empty prefix means the whole bucket.
    let filter_prefix = params
        .str("prefix")
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string);

    Ok(ProviderRequest::PutAnalytics {
        bucket: ctx.target.name().to_string(),
        analytics: AnalyticsSettings {
            id: id.to_string(),
            destination_bucket: destination.to_string(),
            destination_arn: bucket_arn(destination),
            export_prefix: format!("storage-analysis/{id}/"),
            filter_prefix,
        },
    })
}
