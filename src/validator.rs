//! Bucket existence and naming checks.

use std::net::Ipv4Addr;

use tracing::{debug, warn};

use crate::provider::{Provider, ProviderError};
use crate::types::ResourceRef;
use crate::types::error::ValidationError;

const MIN_BUCKET_NAME_LENGTH: usize = 3;
const MAX_BUCKET_NAME_LENGTH: usize = 63;

const RESERVED_PREFIXES: &[&str] = &["xn--", "sthree-", "amzn-s3-demo-"];
const RESERVED_SUFFIXES: &[&str] = &["-s3alias", "--ol-s3", ".mrap", "--x-s3", "--table-s3"];

/// Confirms that buckets exist and are reachable before anything is changed.
///
/// Every call performs one live probe. Results are never cached, so a bucket
/// deleted between two checks is reported as missing by the second one.
#[derive(Clone)]
pub struct ResourceValidator {
    provider: Provider,
}

impl ResourceValidator {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }

    /// `Ok(false)` when the bucket does not exist.
    pub async fn exists(&self, resource: &ResourceRef) -> Result<bool, ValidationError> {
        let bucket = resource.name();
        validate_bucket_name(bucket)?;

        match self.provider.head_bucket(bucket).await {
            Ok(()) => {
                debug!(bucket = bucket, "bucket exists.");
                Ok(true)
            }
            Err(ProviderError::NotFound { .. }) => {
                debug!(bucket = bucket, "bucket does not exist.");
                Ok(false)
            }
            Err(ProviderError::Forbidden { code, .. }) => {
                warn!(bucket = bucket, code = code, "access to bucket denied.");
                Err(ValidationError::Auth {
                    bucket: bucket.to_string(),
                    code,
                })
            }
            Err(ProviderError::Transport(message)) => {
                warn!(bucket = bucket, "bucket check did not reach the provider: {message}");
                Err(ValidationError::Transport {
                    bucket: bucket.to_string(),
                    message,
                })
            }
            Err(ProviderError::Rejected { code, message }) => {
                warn!(bucket = bucket, code = code, "unexpected answer to bucket check: {message}");
                Err(ValidationError::Unknown {
                    bucket: bucket.to_string(),
                    message: format!("{code}: {message}"),
                })
            }
        }
    }

    /// Like [`exists`](Self::exists), but a missing bucket is an error.
    pub async fn ensure_exists(&self, resource: &ResourceRef) -> Result<(), ValidationError> {
        if self.exists(resource).await? {
            Ok(())
        } else {
            Err(ValidationError::NotFound(resource.name().to_string()))
        }
    }
}

/// Check a general purpose bucket name against the S3 naming rules.
/// No request is sent.
///
/// # Example
///
/// ```
/// use s3conf_rs::validate_bucket_name;
///
/// assert!(validate_bucket_name("my-data-bucket").is_ok());
/// assert!(validate_bucket_name("My_Bucket").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| -> Result<(), ValidationError> {
        Err(ValidationError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.len() < MIN_BUCKET_NAME_LENGTH || name.len() > MAX_BUCKET_NAME_LENGTH {
        return invalid("must be between 3 and 63 characters long");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return invalid("may only contain lowercase letters, digits, dots and hyphens");
    }

    let starts_and_ends_alphanumeric = name
        .chars()
        .next()
        .zip(name.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());
    if !starts_and_ends_alphanumeric {
        return invalid("must begin and end with a letter or digit");
    }
    if name.contains("..") {
        return invalid("must not contain two adjacent periods");
    }
    if name.parse::<Ipv4Addr>().is_ok() {
        return invalid("must not be formatted as an IP address");
    }
    if let Some(prefix) = RESERVED_PREFIXES.iter().find(|p| name.starts_with(*p)) {
        return invalid(format!("must not start with the reserved prefix '{prefix}'").as_str());
    }
    if let Some(suffix) = RESERVED_SUFFIXES.iter().find(|s| name.ends_with(*s)) {
        return invalid(format!("must not end with the reserved suffix '{suffix}'").as_str());
    }

    Ok(())
}
