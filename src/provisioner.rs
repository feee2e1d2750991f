use tracing::{info, warn};

use crate::provider::{Provider, ProviderError};
use crate::types::ResourceRef;
use crate::types::error::S3confError;
use crate::validator::{ResourceValidator, validate_bucket_name};

/// Creates buckets after checking they do not already exist.
///
/// The existence probe and the create call are not atomic. A bucket created
/// by someone else in between surfaces as a provider rejection.
pub struct BucketProvisioner {
    provider: Provider,
    validator: ResourceValidator,
}

impl BucketProvisioner {
    pub fn new(provider: Provider) -> Self {
        let validator = ResourceValidator::new(provider.clone());
        Self {
            provider,
            validator,
        }
    }

    pub async fn create(&self, resource: &ResourceRef) -> Result<(), S3confError> {
        let bucket = resource.name();
        validate_bucket_name(bucket)?;

        if self.validator.exists(resource).await? {
            warn!(bucket = bucket, "bucket already exists.");
            return Err(S3confError::BucketAlreadyExists(bucket.to_string()));
        }

        self.provider
            .create_bucket(bucket, resource.region())
            .await
            .map_err(|e| match e {
                ProviderError::Rejected { code, .. }
                    if code == "BucketAlreadyExists" || code == "BucketAlreadyOwnedByYou" =>
                {
                    S3confError::BucketAlreadyExists(bucket.to_string())
                }
                other => S3confError::AwsSdk(other.to_string()),
            })?;

        info!(
            bucket = bucket,
            region = resource.region(),
            "bucket created."
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockProvider, ProviderCall, init_dummy_tracing_subscriber};
    use crate::types::error::ValidationError;

    #[tokio::test]
    async fn creates_missing_bucket_in_region() {
        init_dummy_tracing_subscriber();

        let provider = MockProvider::new();
        let provisioner = BucketProvisioner::new(Box::new(provider.clone()));

        provisioner
            .create(&ResourceRef::new("new-bucket", "eu-west-2"))
            .await
            .unwrap();

        assert_eq!(
            provider.calls(),
            vec![
                ProviderCall::HeadBucket("new-bucket".to_string()),
                ProviderCall::CreateBucket {
                    bucket: "new-bucket".to_string(),
                    region: "eu-west-2".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn existing_bucket_is_not_recreated() {
        init_dummy_tracing_subscriber();

        let provider = MockProvider::new().with_buckets(&["my-data-bucket"]);
        let provisioner = BucketProvisioner::new(Box::new(provider.clone()));

        let result = provisioner
            .create(&ResourceRef::new("my-data-bucket", "eu-west-2"))
            .await;

        assert_eq!(
            result,
            Err(S3confError::BucketAlreadyExists("my-data-bucket".to_string()))
        );
        assert_eq!(result.unwrap_err().exit_code(), 1);
        assert!(!provider.calls().iter().any(ProviderCall::is_mutation));
    }

    #[tokio::test]
    async fn invalid_name_is_rejected_locally() {
        init_dummy_tracing_subscriber();

        let provider = MockProvider::new();
        let provisioner = BucketProvisioner::new(Box::new(provider.clone()));

        let result = provisioner
            .create(&ResourceRef::new("Bad_Bucket", "eu-west-2"))
            .await;

        assert!(matches!(
            result,
            Err(S3confError::Validation(ValidationError::InvalidName { .. }))
        ));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn denied_probe_stops_creation() {
        init_dummy_tracing_subscriber();

        let provider = MockProvider::new().with_head_failure(
            "someone-elses",
            ProviderError::Forbidden {
                code: "AccessDenied".to_string(),
                message: "denied".to_string(),
            },
        );
        let provisioner = BucketProvisioner::new(Box::new(provider.clone()));

        let result = provisioner
            .create(&ResourceRef::new("someone-elses", "us-east-1"))
            .await;

        assert!(matches!(
            result,
            Err(S3confError::Validation(ValidationError::Auth { .. }))
        ));
        assert!(!provider.calls().iter().any(ProviderCall::is_mutation));
    }
}
