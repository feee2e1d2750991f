pub mod client_builder;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{BuildError, DisplayErrorContext, SdkError};
use aws_sdk_s3::types::{
    AccelerateConfiguration, AnalyticsConfiguration, AnalyticsExportDestination, AnalyticsFilter,
    AnalyticsS3BucketDestination, AnalyticsS3ExportFileFormat, BucketAccelerateStatus,
    BucketCannedAcl, BucketLifecycleConfiguration, BucketLocationConstraint, BucketLoggingStatus,
    BucketVersioningStatus, CorsConfiguration, CorsRule, CreateBucketConfiguration,
    DeleteMarkerReplication, DeleteMarkerReplicationStatus, Destination, ExpirationStatus,
    InventoryConfiguration, InventoryDestination, InventoryFormat, InventoryFrequency,
    InventoryIncludedObjectVersions, InventoryS3BucketDestination, InventorySchedule,
    LifecycleExpiration, LifecycleRule, LifecycleRuleFilter, LoggingEnabled, ObjectOwnership,
    OwnershipControls, OwnershipControlsRule, Payer, PublicAccessBlockConfiguration,
    ReplicationConfiguration, ReplicationRule, ReplicationRuleFilter, ReplicationRuleStatus,
    RequestPaymentConfiguration, ServerSideEncryption, ServerSideEncryptionByDefault,
    ServerSideEncryptionConfiguration, ServerSideEncryptionRule, StorageClass, StorageClassAnalysis,
    StorageClassAnalysisDataExport, StorageClassAnalysisSchemaVersion, Transition,
    TransitionStorageClass, VersioningConfiguration,
};
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use aws_smithy_types_convert::date_time::DateTimeExt;
use chrono::{DateTime, Utc};

use crate::catalog::request::{
    AnalyticsSettings, CorsRuleSettings, EncryptionSettings, InventorySettings,
    LifecycleRuleSettings, PublicAccessBlockFlags, ReplicationRuleSettings,
};
use crate::catalog::ProviderRequest;
use crate::config::ClientConfig;
use crate::provider::{Provider, ProviderClient, ProviderError, ProviderFactory};
use crate::types::RemoteObject;

const US_EAST_1: &str = "us-east-1";
const DIRECTORY_DELIMITER: &str = "/";

/// Extracts the S3 error code and message from an AWS SDK error.
///
/// For service errors (S3 API responses), returns the S3 error code
/// (e.g. "AccessDenied", "MalformedXML") and the human-readable error
/// message from the response. For other error types (network, timeout,
/// construction failure), returns "N/A" as the code and the full error
/// description as the message.
fn extract_sdk_error_details<E>(e: &SdkError<E>) -> (String, String)
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    if let Some(service_err) = e.as_service_error() {
        (
            service_err.code().unwrap_or("unknown").to_string(),
            service_err.message().unwrap_or("no message").to_string(),
        )
    } else {
        ("N/A".to_string(), DisplayErrorContext(e).to_string())
    }
}

/// Map an SDK failure onto the provider error taxonomy.
fn classify_sdk_error<E>(e: &SdkError<E>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = e.raw_response().map(|response| response.status().as_u16());
    let (code, message) = extract_sdk_error_details(e);

    match e {
        SdkError::ServiceError(_) => classify_response(status, code, message),
        SdkError::ResponseError(_) if matches!(status, Some(401 | 403 | 404)) => {
            classify_response(status, code, message)
        }
        _ => ProviderError::Transport(message),
    }
}

/// Classify an answered request by HTTP status, then by S3 error code.
fn classify_response(status: Option<u16>, code: String, message: String) -> ProviderError {
    match (status, code.as_str()) {
        (Some(404), _) | (_, "NotFound" | "NoSuchBucket") => ProviderError::NotFound { code },
        (Some(401 | 403), _) | (_, "AccessDenied" | "Forbidden" | "AllAccessDisabled") => {
            ProviderError::Forbidden { code, message }
        }
        _ => ProviderError::Rejected { code, message },
    }
}

fn construction_failure(e: BuildError) -> ProviderError {
    ProviderError::Transport(format!("failed to construct request: {e}"))
}

/// Factory for creating S3 provider instances.
pub struct S3ProviderFactory;

#[async_trait]
impl ProviderFactory for S3ProviderFactory {
    async fn create(client_config: ClientConfig) -> Provider {
        let client = Arc::new(client_config.create_client().await);
        Box::new(S3Provider { client })
    }
}

/// [`ProviderClient`] backed by `aws-sdk-s3`.
#[derive(Clone)]
pub struct S3Provider {
    client: Arc<Client>,
}

impl S3Provider {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    fn failure<E>(&self, api: &str, bucket: &str, e: SdkError<E>) -> ProviderError
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
    {
        let error = classify_sdk_error(&e);
        let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
        match error {
            ProviderError::NotFound { .. } => {
                tracing::debug!(
                    bucket = bucket,
                    s3_error_code = s3_error_code,
                    "S3 {} API call for bucket '{}' returned not found.",
                    api,
                    bucket,
                );
            }
            _ => {
                tracing::error!(
                    bucket = bucket,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 {} API call failed for bucket '{}': {} ({}).",
                    api,
                    bucket,
                    s3_error_code,
                    s3_error_message,
                );
            }
        }
        error
    }
}

#[async_trait]
impl ProviderClient for S3Provider {
    async fn head_bucket(&self, bucket: &str) -> Result<(), ProviderError> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| self.failure("HeadBucket", bucket, e))
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), ProviderError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if region != US_EAST_1 {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map(|_| ())
            .map_err(|e| self.failure("CreateBucket", bucket, e))
    }

    async fn list_buckets(&self) -> Result<Vec<String>, ProviderError> {
        let mut names = Vec::new();
        let mut continuation_token = None;

        loop {
            let output = self
                .client
                .list_buckets()
                .set_continuation_token(continuation_token.clone())
                .send()
                .await
                .map_err(|e| self.failure("ListBuckets", "*", e))?;

            names.extend(
                output
                    .buckets()
                    .iter()
                    .filter_map(|bucket| bucket.name().map(String::from)),
            );

            match output.continuation_token() {
                Some(token) if !token.is_empty() => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(names)
    }

    async fn list_common_prefixes(&self, bucket: &str) -> Result<Vec<String>, ProviderError> {
        let mut prefixes = Vec::new();
        let mut continuation_token = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .delimiter(DIRECTORY_DELIMITER)
                .set_continuation_token(continuation_token.clone())
                .send()
                .await
                .map_err(|e| self.failure("ListObjectsV2", bucket, e))?;

            prefixes.extend(
                output
                    .common_prefixes()
                    .iter()
                    .filter_map(|prefix| prefix.prefix().map(String::from)),
            );

            if output.is_truncated() == Some(true) {
                continuation_token = output.next_continuation_token().map(String::from);
            } else {
                break;
            }
        }

        Ok(prefixes)
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<RemoteObject>, ProviderError> {
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation_token.clone())
                .send()
                .await
                .map_err(|e| self.failure("ListObjectsV2", bucket, e))?;

            for object in output.contents() {
                let Some(key) = object.key() else {
                    continue;
                };
                objects.push(RemoteObject {
                    key: key.to_string(),
                    size: object.size().unwrap_or_default(),
                    last_modified: object
                        .last_modified()
                        .and_then(|time| time.to_chrono_utc().ok())
                        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                });
            }

            if output.is_truncated() == Some(true) {
                continuation_token = output.next_continuation_token().map(String::from);
            } else {
                break;
            }
        }

        tracing::debug!(bucket = bucket, count = objects.len(), "listed objects.");

        Ok(objects)
    }

    async fn send(&self, request: &ProviderRequest) -> Result<(), ProviderError> {
        let api = request.api_name();
        let bucket = request.bucket();

        match request {
            ProviderRequest::PutVersioning { bucket } => self
                .client
                .put_bucket_versioning()
                .bucket(bucket)
                .versioning_configuration(
                    VersioningConfiguration::builder()
                        .status(BucketVersioningStatus::Enabled)
                        .build(),
                )
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
            ProviderRequest::PutEncryption { bucket, encryption } => self
                .client
                .put_bucket_encryption()
                .bucket(bucket)
                .server_side_encryption_configuration(
                    encryption_configuration(encryption).map_err(construction_failure)?,
                )
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
            ProviderRequest::PutLogging {
                bucket,
                target_bucket,
                target_prefix,
            } => self
                .client
                .put_bucket_logging()
                .bucket(bucket)
                .bucket_logging_status(
                    BucketLoggingStatus::builder()
                        .logging_enabled(
                            LoggingEnabled::builder()
                                .target_bucket(target_bucket)
                                .target_prefix(target_prefix)
                                .build()
                                .map_err(construction_failure)?,
                        )
                        .build(),
                )
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
            ProviderRequest::PutAccelerate { bucket, enabled } => {
                let status = if *enabled {
                    BucketAccelerateStatus::Enabled
                } else {
                    BucketAccelerateStatus::Suspended
                };
                self.client
                    .put_bucket_accelerate_configuration()
                    .bucket(bucket)
                    .accelerate_configuration(
                        AccelerateConfiguration::builder().status(status).build(),
                    )
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|e| self.failure(api, bucket, e))
            }
            ProviderRequest::PutRequestPayment {
                bucket,
                requester_pays,
            } => {
                let payer = if *requester_pays {
                    Payer::Requester
                } else {
                    Payer::BucketOwner
                };
                self.client
                    .put_bucket_request_payment()
                    .bucket(bucket)
                    .request_payment_configuration(
                        RequestPaymentConfiguration::builder()
                            .payer(payer)
                            .build()
                            .map_err(construction_failure)?,
                    )
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|e| self.failure(api, bucket, e))
            }
            ProviderRequest::PutLifecycle { bucket, rule } => self
                .client
                .put_bucket_lifecycle_configuration()
                .bucket(bucket)
                .lifecycle_configuration(
                    lifecycle_configuration(rule).map_err(construction_failure)?,
                )
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
            ProviderRequest::PutReplication {
                bucket,
                role_arn,
                rule,
            } => self
                .client
                .put_bucket_replication()
                .bucket(bucket)
                .replication_configuration(
                    replication_configuration(role_arn, rule).map_err(construction_failure)?,
                )
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
            ProviderRequest::PutInventory { bucket, inventory } => self
                .client
                .put_bucket_inventory_configuration()
                .bucket(bucket)
                .id(&inventory.id)
                .inventory_configuration(
                    inventory_configuration(inventory).map_err(construction_failure)?,
                )
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
            ProviderRequest::PutAnalytics { bucket, analytics } => self
                .client
                .put_bucket_analytics_configuration()
                .bucket(bucket)
                .id(&analytics.id)
                .analytics_configuration(
                    analytics_configuration(analytics).map_err(construction_failure)?,
                )
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
            ProviderRequest::PutPublicAccessBlock { bucket, flags } => self
                .client
                .put_public_access_block()
                .bucket(bucket)
                .public_access_block_configuration(public_access_block_configuration(flags))
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
            ProviderRequest::PutPolicy { bucket, policy } => self
                .client
                .put_bucket_policy()
                .bucket(bucket)
                .policy(policy)
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
            ProviderRequest::PutOwnershipControls { bucket, ownership } => self
                .client
                .put_bucket_ownership_controls()
                .bucket(bucket)
                .ownership_controls(
                    OwnershipControls::builder()
                        .rules(
                            OwnershipControlsRule::builder()
                                .object_ownership(ObjectOwnership::from(ownership.as_str()))
                                .build()
                                .map_err(construction_failure)?,
                        )
                        .build()
                        .map_err(construction_failure)?,
                )
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
            ProviderRequest::PutCannedAcl { bucket, acl } => self
                .client
                .put_bucket_acl()
                .bucket(bucket)
                .acl(BucketCannedAcl::from(acl.as_str()))
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
            ProviderRequest::PutCors { bucket, rule } => self
                .client
                .put_bucket_cors()
                .bucket(bucket)
                .cors_configuration(cors_configuration(rule).map_err(construction_failure)?)
                .send()
                .await
                .map(|_| ())
                .map_err(|e| self.failure(api, bucket, e)),
        }
        .inspect(|_| tracing::debug!(bucket = bucket, "S3 {} API call succeeded.", api))
    }
}

fn encryption_configuration(
    encryption: &EncryptionSettings,
) -> Result<ServerSideEncryptionConfiguration, BuildError> {
    let by_default = ServerSideEncryptionByDefault::builder()
        .sse_algorithm(ServerSideEncryption::from(encryption.algorithm.as_str()))
        .set_kms_master_key_id(encryption.kms_key_id.clone())
        .build()?;

    ServerSideEncryptionConfiguration::builder()
        .rules(
            ServerSideEncryptionRule::builder()
                .apply_server_side_encryption_by_default(by_default)
                .set_bucket_key_enabled(encryption.bucket_key_enabled)
                .build(),
        )
        .build()
}

fn lifecycle_configuration(
    rule: &LifecycleRuleSettings,
) -> Result<BucketLifecycleConfiguration, BuildError> {
    let transitions = rule
        .transitions
        .iter()
        .map(|transition| {
            Transition::builder()
                .days(transition.days)
                .storage_class(TransitionStorageClass::from(
                    transition.storage_class.as_str(),
                ))
                .build()
        })
        .collect::<Vec<_>>();

    let lifecycle_rule = LifecycleRule::builder()
        .id(&rule.id)
        .filter(LifecycleRuleFilter::builder().prefix(&rule.prefix).build())
        .status(ExpirationStatus::Enabled)
        .set_transitions(Some(transitions))
        .expiration(
            LifecycleExpiration::builder()
                .days(rule.expiration_days)
                .build(),
        )
        .build()?;

    BucketLifecycleConfiguration::builder()
        .rules(lifecycle_rule)
        .build()
}

fn replication_configuration(
    role_arn: &str,
    rule: &ReplicationRuleSettings,
) -> Result<ReplicationConfiguration, BuildError> {
    let destination = Destination::builder()
        .bucket(&rule.destination_arn)
        .storage_class(StorageClass::from(rule.storage_class.as_str()))
        .build()?;

    let replication_rule = ReplicationRule::builder()
        .id(&rule.id)
        .priority(rule.priority)
        .status(ReplicationRuleStatus::Enabled)
        .filter(ReplicationRuleFilter::builder().prefix("").build())
        .delete_marker_replication(
            DeleteMarkerReplication::builder()
                .status(DeleteMarkerReplicationStatus::Disabled)
                .build(),
        )
        .destination(destination)
        .build()?;

    ReplicationConfiguration::builder()
        .role(role_arn)
        .rules(replication_rule)
        .build()
}

fn inventory_configuration(
    inventory: &InventorySettings,
) -> Result<InventoryConfiguration, BuildError> {
    let destination = InventoryDestination::builder()
        .s3_bucket_destination(
            InventoryS3BucketDestination::builder()
                .bucket(&inventory.destination_arn)
                .format(InventoryFormat::from(inventory.format.as_str()))
                .build()?,
        )
        .build();

    InventoryConfiguration::builder()
        .id(&inventory.id)
        .is_enabled(true)
        .destination(destination)
        .schedule(
            InventorySchedule::builder()
                .frequency(InventoryFrequency::from(inventory.frequency.as_str()))
                .build()?,
        )
        .included_object_versions(InventoryIncludedObjectVersions::from(
            inventory.included_versions.as_str(),
        ))
        .build()
}

fn analytics_configuration(
    analytics: &AnalyticsSettings,
) -> Result<AnalyticsConfiguration, BuildError> {
    let destination = AnalyticsExportDestination::builder()
        .s3_bucket_destination(
            AnalyticsS3BucketDestination::builder()
                .format(AnalyticsS3ExportFileFormat::Csv)
                .bucket(&analytics.destination_arn)
                .prefix(&analytics.export_prefix)
                .build()?,
        )
        .build();

    let data_export = StorageClassAnalysisDataExport::builder()
        .output_schema_version(StorageClassAnalysisSchemaVersion::V1)
        .destination(destination)
        .build()?;

    AnalyticsConfiguration::builder()
        .id(&analytics.id)
        .set_filter(analytics.filter_prefix.clone().map(AnalyticsFilter::Prefix))
        .storage_class_analysis(
            StorageClassAnalysis::builder()
                .data_export(data_export)
                .build(),
        )
        .build()
}

fn public_access_block_configuration(
    flags: &PublicAccessBlockFlags,
) -> PublicAccessBlockConfiguration {
    PublicAccessBlockConfiguration::builder()
        .block_public_acls(flags.block_public_acls)
        .ignore_public_acls(flags.ignore_public_acls)
        .block_public_policy(flags.block_public_policy)
        .restrict_public_buckets(flags.restrict_public_buckets)
        .build()
}

fn cors_configuration(rule: &CorsRuleSettings) -> Result<CorsConfiguration, BuildError> {
    CorsConfiguration::builder()
        .cors_rules(
            CorsRule::builder()
                .set_allowed_headers(Some(rule.allowed_headers.clone()))
                .set_allowed_methods(Some(rule.allowed_methods.clone()))
                .set_allowed_origins(Some(rule.allowed_origins.clone()))
                .set_max_age_seconds(rule.max_age_seconds)
                .build()?,
        )
        .build()
}
