use async_trait::async_trait;
use dyn_clone::DynClone;
use thiserror::Error;

use crate::catalog::ProviderRequest;
use crate::config::ClientConfig;
use crate::types::RemoteObject;

pub mod s3;

/// Type alias for a boxed provider trait object.
pub type Provider = Box<dyn ProviderClient + Send + Sync>;

/// Factory trait for creating Provider instances.
#[async_trait]
pub trait ProviderFactory {
    async fn create(client_config: ClientConfig) -> Provider;
}

/// Classified failure of a single provider call.
///
/// Classification uses the HTTP status of the response first and the S3 error
/// code second. Anything that never produced a response is `Transport`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("not found ({code})")]
    NotFound { code: String },

    #[error("forbidden: {code} ({message})")]
    Forbidden { code: String, message: String },

    #[error("{code}: {message}")]
    Rejected { code: String, message: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

impl ProviderError {
    pub fn code(&self) -> &str {
        match self {
            ProviderError::NotFound { code }
            | ProviderError::Forbidden { code, .. }
            | ProviderError::Rejected { code, .. } => code,
            ProviderError::Transport(_) => "N/A",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ProviderError::NotFound { code } => format!("resource not found ({code})"),
            ProviderError::Forbidden { message, .. }
            | ProviderError::Rejected { message, .. }
            | ProviderError::Transport(message) => message.clone(),
        }
    }
}

/// Operations s3conf needs from an object-storage control plane.
///
/// Every call is a single round trip (paginated listings aside). Nothing is
/// cached between calls.
#[async_trait]
pub trait ProviderClient: DynClone {
    /// Existence and accessibility probe for a bucket.
    async fn head_bucket(&self, bucket: &str) -> Result<(), ProviderError>;

    /// Create a bucket in `region`.
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), ProviderError>;

    /// Names of every bucket owned by the caller.
    async fn list_buckets(&self) -> Result<Vec<String>, ProviderError>;

    /// Top-level "directories" (common prefixes with delimiter `/`).
    async fn list_common_prefixes(&self, bucket: &str) -> Result<Vec<String>, ProviderError>;

    /// Every object in the bucket, following continuation tokens.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<RemoteObject>, ProviderError>;

    /// Execute one configuration mutation.
    async fn send(&self, request: &ProviderRequest) -> Result<(), ProviderError>;
}

dyn_clone::clone_trait_object!(ProviderClient);

/// Create the S3 provider described by `client_config`.
pub async fn create_provider(client_config: ClientConfig) -> Provider {
    s3::S3ProviderFactory::create(client_config).await
}
