//! Bucket properties: versioning, default encryption, server access logging,
//! transfer acceleration and requester pays.

use crate::catalog::params::{ParamKind, ParamSpec, Params};
use crate::catalog::request::{EncryptionSettings, ProviderRequest};
use crate::catalog::{BuildContext, OperationSpec};
use crate::types::error::SpecError;

pub const VERSIONING_ENABLE: &str = "versioning-enable";
pub const ENCRYPTION: &str = "encryption";
pub const ACCESS_LOGGING: &str = "access-logging";
pub const TRANSFER_ACCELERATION: &str = "transfer-acceleration";
pub const REQUESTER_PAYS: &str = "requester-pays";

pub const ALGORITHM_AES256: &str = "AES256";
pub const ALGORITHM_KMS: &str = "aws:kms";

const DEFAULT_LOG_PREFIX: &str = "logs/";

pub(super) const SPECS: &[OperationSpec] = &[
    OperationSpec {
        name: VERSIONING_ENABLE,
        description: "Enable object versioning",
        params: &[ParamSpec::optional(
            "bucket",
            ParamKind::String,
            "bucket to version (defaults to the target bucket)",
        )],
        secondary_resource: Some("bucket"),
        requires_versioning: false,
        builder: build_versioning,
    },
    OperationSpec {
        name: ENCRYPTION,
        description: "Set default server-side encryption",
        params: &[
            ParamSpec::optional(
                "algorithm",
                ParamKind::Enum(&[ALGORITHM_AES256, ALGORITHM_KMS]),
                "server-side encryption algorithm (default AES256)",
            ),
            ParamSpec::optional(
                "kms-key-id",
                ParamKind::String,
                "KMS key id or ARN, required with aws:kms",
            ),
            ParamSpec::optional(
                "bucket-key-enabled",
                ParamKind::Boolean,
                "use an S3 Bucket Key for SSE-KMS",
            ),
        ],
        secondary_resource: None,
        requires_versioning: false,
        builder: build_encryption,
    },
    OperationSpec {
        name: ACCESS_LOGGING,
        description: "Enable server access logging",
        params: &[
            ParamSpec::required(
                "target-bucket",
                ParamKind::String,
                "bucket that receives the access logs",
            ),
            ParamSpec::optional("prefix", ParamKind::String, "log object key prefix (default logs/)"),
        ],
        secondary_resource: Some("target-bucket"),
        requires_versioning: false,
        builder: build_access_logging,
    },
    OperationSpec {
        name: TRANSFER_ACCELERATION,
        description: "Enable or suspend Transfer Acceleration",
        params: &[ParamSpec::optional(
            "enabled",
            ParamKind::Boolean,
            "true to enable, false to suspend (default true)",
        )],
        secondary_resource: None,
        requires_versioning: false,
        builder: build_transfer_acceleration,
    },
    OperationSpec {
        name: REQUESTER_PAYS,
        description: "Make requesters pay for requests and data transfer",
        params: &[ParamSpec::optional(
            "enabled",
            ParamKind::Boolean,
            "true for Requester, false for BucketOwner (default true)",
        )],
        secondary_resource: None,
        requires_versioning: false,
        builder: build_requester_pays,
    },
];

fn build_versioning(ctx: &BuildContext<'_>, params: &Params) -> Result<ProviderRequest, SpecError> {
    Ok(ProviderRequest::PutVersioning {
        bucket: params.str_or("bucket", ctx.target.name()).to_string(),
    })
}

fn build_encryption(ctx: &BuildContext<'_>, params: &Params) -> Result<ProviderRequest, SpecError> {
    let algorithm = params.str_or("algorithm", ALGORITHM_AES256);
    let kms_key_id = params.str("kms-key-id").map(str::to_string);

    match (algorithm, &kms_key_id) {
        (ALGORITHM_KMS, None) => {
            return Err(SpecError::InvalidParameter {
                field: "kms-key-id".to_string(),
                reason: format!("required when algorithm is {ALGORITHM_KMS}"),
            });
        }
        (ALGORITHM_AES256, Some(_)) => {
            return Err(SpecError::InvalidParameter {
                field: "kms-key-id".to_string(),
                reason: format!("only valid when algorithm is {ALGORITHM_KMS}"),
            });
        }
        _ => {}
    }

    let bucket_key_enabled = if params.contains("bucket-key-enabled") {
        Some(params.bool_or("bucket-key-enabled", false))
    } else {
        None
    };

    Ok(ProviderRequest::PutEncryption {
        bucket: ctx.target.name().to_string(),
        encryption: EncryptionSettings {
            algorithm: algorithm.to_string(),
            kms_key_id,
            bucket_key_enabled,
        },
    })
}

fn build_access_logging(
    ctx: &BuildContext<'_>,
    params: &Params,
) -> Result<ProviderRequest, SpecError> {
    Ok(ProviderRequest::PutLogging {
        bucket: ctx.target.name().to_string(),
        target_bucket: params.str_or("target-bucket", ctx.target.name()).to_string(),
        target_prefix: params.str_or("prefix", DEFAULT_LOG_PREFIX).to_string(),
    })
}

fn build_transfer_acceleration(
    ctx: &BuildContext<'_>,
    params: &Params,
) -> Result<ProviderRequest, SpecError> {
    Ok(ProviderRequest::PutAccelerate {
        bucket: ctx.target.name().to_string(),
        enabled: params.bool_or("enabled", true),
    })
}

fn build_requester_pays(
    ctx: &BuildContext<'_>,
    params: &Params,
) -> Result<ProviderRequest, SpecError> {
    Ok(ProviderRequest::PutRequestPayment {
        bucket: ctx.target.name().to_string(),
        requester_pays: params.bool_or("enabled", true),
    })
}
