//! Bucket management: lifecycle rules, replication and inventory reports.

use crate::catalog::params::{ParamKind, ParamSpec, Params};
use crate::catalog::request::{
    InventorySettings, LifecycleRuleSettings, LifecycleTransition, ProviderRequest,
    ReplicationRuleSettings, bucket_arn,
};
use crate::catalog::{BuildContext, OperationSpec, positive_i32};
use crate::types::error::SpecError;

pub const LIFECYCLE_POLICY: &str = "lifecycle-policy";
pub const REPLICATION_RULE: &str = "replication-rule";
pub const INVENTORY_REPORT: &str = "inventory-report";

const TRANSITION_STORAGE_CLASSES: &[&str] = &[
    "STANDARD_IA",
    "ONEZONE_IA",
    "INTELLIGENT_TIERING",
    "GLACIER_IR",
    "GLACIER",
    "DEEP_ARCHIVE",
];

const REPLICATION_STORAGE_CLASSES: &[&str] = &[
    "STANDARD",
    "REDUCED_REDUNDANCY",
    "STANDARD_IA",
    "ONEZONE_IA",
    "INTELLIGENT_TIERING",
    "GLACIER_IR",
    "GLACIER",
    "DEEP_ARCHIVE",
];

const DEFAULT_LIFECYCLE_RULE_ID: &str = "TransitionToGlacier";
const DEFAULT_INFREQUENT_ACCESS_DAYS: i32 = 30;
const DEFAULT_ARCHIVE_DAYS: i32 = 90;
const DEFAULT_EXPIRATION_DAYS: i32 = 365;

const DEFAULT_REPLICATION_RULE_ID: &str = "ReplicationRule";
const DEFAULT_REPLICATION_ROLE_NAME: &str = "s3-replication-role";

const DEFAULT_INVENTORY_ID: &str = "InventoryConfig";

pub(super) const SPECS: &[OperationSpec] = &[
    OperationSpec {
        name: LIFECYCLE_POLICY,
        description: "Transition objects to colder storage and expire them",
        params: &[
            ParamSpec::optional("rule-id", ParamKind::String, "rule id (default TransitionToGlacier)"),
            ParamSpec::optional("prefix", ParamKind::String, "key prefix the rule applies to"),
            ParamSpec::optional(
                "infrequent-access-days",
                ParamKind::Integer,
                "days before the first transition (default 30)",
            ),
            ParamSpec::optional(
                "infrequent-access-storage-class",
                ParamKind::Enum(TRANSITION_STORAGE_CLASSES),
                "storage class of the first transition (default STANDARD_IA)",
            ),
            ParamSpec::optional(
                "archive-days",
                ParamKind::Integer,
                "days before the archive transition (default 90)",
            ),
            ParamSpec::optional(
                "archive-storage-class",
                ParamKind::Enum(TRANSITION_STORAGE_CLASSES),
                "storage class of the archive transition (default GLACIER)",
            ),
            ParamSpec::optional(
                "expiration-days",
                ParamKind::Integer,
                "days before objects expire (default 365)",
            ),
        ],
        secondary_resource: None,
        requires_versioning: false,
        builder: build_lifecycle,
    },
    OperationSpec {
        name: REPLICATION_RULE,
        description: "Replicate objects to another bucket",
        params: &[
            ParamSpec::required("destination", ParamKind::String, "destination bucket"),
            ParamSpec::required(
                "account-id",
                ParamKind::String,
                "AWS account id owning the replication role",
            ),
            ParamSpec::optional(
                "role-name",
                ParamKind::String,
                "IAM role assumed by S3 (default s3-replication-role)",
            ),
            ParamSpec::optional(
                "storage-class",
                ParamKind::Enum(REPLICATION_STORAGE_CLASSES),
                "storage class of replicas (default STANDARD)",
            ),
            ParamSpec::optional("priority", ParamKind::Integer, "rule priority (default 1)"),
        ],
        secondary_resource: Some("destination"),
        requires_versioning: true,
        builder: build_replication,
    },
    OperationSpec {
        name: INVENTORY_REPORT,
        description: "Publish a scheduled inventory report",
        params: &[
            ParamSpec::optional(
                "destination",
                ParamKind::String,
                "bucket receiving the report (defaults to the target bucket)",
            ),
            ParamSpec::optional(
                "frequency",
                ParamKind::Enum(&["Daily", "Weekly"]),
                "report schedule (default Daily)",
            ),
            ParamSpec::optional(
                "format",
                ParamKind::Enum(&["CSV", "ORC", "Parquet"]),
                "report format (default CSV)",
            ),
            ParamSpec::optional("id", ParamKind::String, "configuration id (default InventoryConfig)"),
            ParamSpec::optional(
                "included-versions",
                ParamKind::Enum(&["All", "Current"]),
                "object versions to include (default All)",
            ),
        ],
        secondary_resource: Some("destination"),
        requires_versioning: false,
        builder: build_inventory,
    },
];

fn build_lifecycle(ctx: &BuildContext<'_>, params: &Params) -> Result<ProviderRequest, SpecError> {
    let infrequent_access_days =
        positive_i32(params, "infrequent-access-days", DEFAULT_INFREQUENT_ACCESS_DAYS)?;
    let archive_days = positive_i32(params, "archive-days", DEFAULT_ARCHIVE_DAYS)?;
    let expiration_days = positive_i32(params, "expiration-days", DEFAULT_EXPIRATION_DAYS)?;

    if archive_days <= infrequent_access_days {
        return Err(SpecError::InvalidParameter {
            field: "archive-days".to_string(),
            reason: format!(
                "must be greater than infrequent-access-days ({infrequent_access_days})"
            ),
        });
    }
    if expiration_days <= archive_days {
        return Err(SpecError::InvalidParameter {
            field: "expiration-days".to_string(),
            reason: format!("must be greater than archive-days ({archive_days})"),
        });
    }

    Ok(ProviderRequest::PutLifecycle {
        bucket: ctx.target.name().to_string(),
        rule: LifecycleRuleSettings {
            id: params.str_or("rule-id", DEFAULT_LIFECYCLE_RULE_ID).to_string(),
            prefix: params.str_or("prefix", "").to_string(),
            transitions: vec![
                LifecycleTransition {
                    days: infrequent_access_days,
                    storage_class: params
                        .str_or("infrequent-access-storage-class", "STANDARD_IA")
                        .to_string(),
                },
                LifecycleTransition {
                    days: archive_days,
                    storage_class: params.str_or("archive-storage-class", "GLACIER").to_string(),
                },
            ],
            expiration_days,
        },
    })
}

fn build_replication(ctx: &BuildContext<'_>, params: &Params) -> Result<ProviderRequest, SpecError> {
    let destination = params.str_or("destination", "");
    if destination == ctx.target.name() {
        return Err(SpecError::InvalidParameter {
            field: "destination".to_string(),
            reason: "must differ from the source bucket".to_string(),
        });
    }

    let account_id = params.str_or("account-id", "");
    if account_id.len() != 12 || !account_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(SpecError::InvalidParameter {
            field: "account-id".to_string(),
            reason: format!("'{account_id}' is not a 12 digit AWS account id"),
        });
    }

    let role_name = params.str_or("role-name", DEFAULT_REPLICATION_ROLE_NAME);

    Ok(ProviderRequest::PutReplication {
        bucket: ctx.target.name().to_string(),
        role_arn: format!("arn:aws:iam::{account_id}:role/{role_name}"),
        rule: ReplicationRuleSettings {
            id: DEFAULT_REPLICATION_RULE_ID.to_string(),
            priority: positive_i32(params, "priority", 1)?,
            destination_bucket: destination.to_string(),
            destination_arn: bucket_arn(destination),
            storage_class: params.str_or("storage-class", "STANDARD").to_string(),
        },
    })
}

fn build_inventory(ctx: &BuildContext<'_>, params: &Params) -> Result<ProviderRequest, SpecError> {
    let destination = params.str_or("destination", ctx.target.name());

    Ok(ProviderRequest::PutInventory {
        bucket: ctx.target.name().to_string(),
        inventory: InventorySettings {
            id: params.str_or("id", DEFAULT_INVENTORY_ID).to_string(),
            destination_bucket: destination.to_string(),
            destination_arn: bucket_arn(destination),
            frequency: params.str_or("frequency", "Daily").to_string(),
            format: params.str_or("format", "CSV").to_string(),
            included_versions: params.str_or("included-versions", "All").to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::catalog::{OperationRequest, SettingsCatalog};
    use crate::types::ResourceRef;

    fn build_with(
        request: OperationRequest,
        versioned: &[&str],
    ) -> Result<ProviderRequest, SpecError> {
        let target = ResourceRef::new("my-data-bucket", "eu-west-2");
        let versioned: HashSet<String> = versioned.iter().map(|s| s.to_string()).collect();
        SettingsCatalog::standard().build(&BuildContext::new(&target, &versioned), &request)
    }

    fn replication_request() -> OperationRequest {
        OperationRequest::new(REPLICATION_RULE)
            .with_param("destination", "backup-bucket")
            .with_param("account-id", "123456789012")
    }

    #[test]
    fn lifecycle_defaults() {
        let request = build_with(OperationRequest::new(LIFECYCLE_POLICY), &[]).unwrap();
        assert_eq!(
            request,
            ProviderRequest::PutLifecycle {
                bucket: "my-data-bucket".to_string(),
                rule: LifecycleRuleSettings {
                    id: "TransitionToGlacier".to_string(),
                    prefix: String::new(),
                    transitions: vec![
                        LifecycleTransition {
                            days: 30,
                            storage_class: "STANDARD_IA".to_string()
                        },
                        LifecycleTransition {
                            days: 90,
                            storage_class: "GLACIER".to_string()
                        },
                    ],
                    expiration_days: 365,
                },
            }
        );
    }

    #[test]
    fn lifecycle_days_must_increase() {
        let request = OperationRequest::new(LIFECYCLE_POLICY)
            .with_param("infrequent-access-days", 60)
            .with_param("archive-days", 45);
        assert!(matches!(
            build_with(request, &[]),
            Err(SpecError::InvalidParameter { field, .. }) if field == "archive-days"
        ));

        let request = OperationRequest::new(LIFECYCLE_POLICY).with_param("expiration-days", 90);
        assert!(matches!(
            build_with(request, &[]),
            Err(SpecError::InvalidParameter { field, .. }) if field == "expiration-days"
        ));
    }

    #[test]
    fn lifecycle_days_must_be_positive() {
        let request = OperationRequest::new(LIFECYCLE_POLICY).with_param("infrequent-access-days", 0);
        assert!(matches!(
            build_with(request, &[]),
            Err(SpecError::InvalidParameter { field, .. }) if field == "infrequent-access-days"
        ));
    }

    #[test]
    fn replication_requires_versioned_source_and_destination() {
        assert!(matches!(
            build_with(replication_request(), &[]),
            Err(SpecError::PreconditionUnmet(_))
        ));
        assert!(matches!(
            build_with(replication_request(), &["my-data-bucket"]),
            Err(SpecError::PreconditionUnmet(message)) if message.contains("'backup-bucket'")
        ));
        assert!(matches!(
            build_with(replication_request(), &["backup-bucket"]),
            Err(SpecError::PreconditionUnmet(message)) if message.contains("'my-data-bucket'")
        ));
    }

    #[test]
    fn replication_builds_when_both_versioned() {
        let request = build_with(replication_request(), &["my-data-bucket", "backup-bucket"]).unwrap();
        assert_eq!(
            request,
            ProviderRequest::PutReplication {
                bucket: "my-data-bucket".to_string(),
                role_arn: "arn:aws:iam::123456789012:role/s3-replication-role".to_string(),
                rule: ReplicationRuleSettings {
                    id: "ReplicationRule".to_string(),
                    priority: 1,
                    destination_bucket: "backup-bucket".to_string(),
                    destination_arn: "arn:aws:s3:::backup-bucket".to_string(),
                    storage_class: "STANDARD".to_string(),
                },
            }
        );
    }

    #[test]
    fn replication_missing_destination() {
        let request = OperationRequest::new(REPLICATION_RULE).with_param("account-id", "123456789012");
        assert_eq!(
            build_with(request, &[]),
            Err(SpecError::MissingParameter("destination".to_string()))
        );
    }

    #[test]
    fn replication_rejects_malformed_account_id() {
        let request = replication_request().with_param("account-id", "YOUR_ACCOUNT_ID");
        assert!(matches!(
            build_with(request, &["my-data-bucket", "backup-bucket"]),
            Err(SpecError::InvalidParameter { field, .. }) if field == "account-id"
        ));
    }

    #[test]
    fn replication_rejects_account_id_with_surrounding_whitespace() {
        for account_id in [" 123456789012", "123456789012 ", "\t123456789012\n"] {
            let request = replication_request().with_param("account-id", account_id);
            assert_eq!(
                build_with(request, &["my-data-bucket", "backup-bucket"]),
                Err(SpecError::InvalidParameter {
                    field: "account-id".to_string(),
                    reason: format!("'{account_id}' is not a 12 digit AWS account id"),
                })
            );
        }
    }

    #[test]
    fn replication_to_self_is_invalid() {
        let request = replication_request().with_param("destination", "my-data-bucket");
        assert!(matches!(
            build_with(request, &["my-data-bucket"]),
            Err(SpecError::InvalidParameter { field, .. }) if field == "destination"
        ));
    }

    #[test]
    fn inventory_defaults_to_target_destination() {
        let request = build_with(OperationRequest::new(INVENTORY_REPORT), &[]).unwrap();
        let ProviderRequest::PutInventory { inventory, .. } = request else {
            panic!("unexpected request");
        };
        assert_eq!(inventory.id, "InventoryConfig");
        assert_eq!(inventory.destination_arn, "arn:aws:s3:::my-data-bucket");
        assert_eq!(inventory.frequency, "Daily");
        assert_eq!(inventory.format, "CSV");
        assert_eq!(inventory.included_versions, "All");
    }

    #[test]
    fn inventory_options() {
        let request = OperationRequest::new(INVENTORY_REPORT)
            .with_param("destination", "report-bucket")
            .with_param("frequency", "WEEKLY")
            .with_param("format", "parquet");
        let ProviderRequest::PutInventory { inventory, .. } = build_with(request, &[]).unwrap()
        else {
            panic!("unexpected request");
        };
        assert_eq!(inventory.destination_bucket, "report-bucket");
        assert_eq!(inventory.frequency, "Weekly");
        assert_eq!(inventory.format, "Parquet");
    }
}
