use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use zeroize_derive::{Zeroize, ZeroizeOnDrop};

use crate::types::error::{ApplyError, SpecError};

pub mod error;
pub mod token;

/// Identifies the bucket a run operates on.
///
/// Immutable once constructed; the region travels with the name so that
/// nothing downstream depends on an implicit, process-wide region setting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    name: String,
    region: String,
}

impl ResourceRef {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Another bucket in the same region (destination buckets, log targets).
    pub fn sibling(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.region.clone())
    }
}

impl Display for ResourceRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}", self.name)
    }
}

/// An object entry as returned by the provider's object listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteObject {
    pub key: String,
    pub size: i64,
    pub last_modified: DateTime<Utc>,
}

/// A display-ready listing row: cleaned name, size in KB, modification time.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedObject {
    pub name: String,
    pub size_kb: f64,
    pub last_modified: DateTime<Utc>,
}

/// Result of listing a bucket: top-level "directories" and files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingReport {
    pub directories: Vec<String>,
    pub objects: Vec<ListedObject>,
}

/// Why an operation was not sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DryRun,
    Cancelled,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DryRun => write!(f, "dry-run"),
            SkipReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Classified failure of a single operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationFailure {
    Spec(SpecError),
    Apply(ApplyError),
}

impl Display for OperationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OperationFailure::Spec(e) => write!(f, "{e}"),
            OperationFailure::Apply(e) => write!(f, "{e}"),
        }
    }
}

impl OperationFailure {
    /// True for precondition failures, whether raised while building the
    /// request or while validating a secondary resource.
    pub fn is_precondition_unmet(&self) -> bool {
        matches!(
            self,
            OperationFailure::Spec(SpecError::PreconditionUnmet(_))
                | OperationFailure::Apply(ApplyError::PreconditionUnmet(_))
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Applied,
    Skipped(SkipReason),
    Failed(OperationFailure),
}

impl Display for OutcomeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Applied => write!(f, "applied"),
            OutcomeStatus::Skipped(reason) => write!(f, "skipped ({reason})"),
            OutcomeStatus::Failed(failure) => write!(f, "failed: {failure}"),
        }
    }
}

/// Result of one requested operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub operation: String,
    pub bucket: String,
    pub status: OutcomeStatus,
}

impl OperationOutcome {
    pub fn applied(operation: &str, bucket: &str) -> Self {
        Self::new(operation, bucket, OutcomeStatus::Applied)
    }

    pub fn skipped(operation: &str, bucket: &str, reason: SkipReason) -> Self {
        Self::new(operation, bucket, OutcomeStatus::Skipped(reason))
    }

    pub fn failed(operation: &str, bucket: &str, failure: OperationFailure) -> Self {
        Self::new(operation, bucket, OutcomeStatus::Failed(failure))
    }

    fn new(operation: &str, bucket: &str, status: OutcomeStatus) -> Self {
        Self {
            operation: operation.to_string(),
            bucket: bucket.to_string(),
            status,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.status == OutcomeStatus::Applied
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }

    pub fn failure(&self) -> Option<&OperationFailure> {
        match &self.status {
            OutcomeStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Ordered outcomes of a run, one per submitted request, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeReport {
    outcomes: Vec<OperationOutcome>,
}

impl OutcomeReport {
    pub fn new(outcomes: Vec<OperationOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[OperationOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<OperationOutcome> {
        self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn applied_count(&self) -> u64 {
        self.outcomes.iter().filter(|o| o.is_applied()).count() as u64
    }

    pub fn failed_count(&self) -> u64 {
        self.outcomes.iter().filter(|o| o.is_failed()).count() as u64
    }

    pub fn skipped_count(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Skipped(_)))
            .count() as u64
    }

    pub fn has_failure(&self) -> bool {
        self.outcomes.iter().any(OperationOutcome::is_failed)
    }
}

/// AWS configuration file locations.
#[derive(Debug, Clone)]
pub struct ClientConfigLocation {
    pub aws_config_file: Option<PathBuf>,
    pub aws_shared_credentials_file: Option<PathBuf>,
}

/// AWS credential sources supported by s3conf-rs.
#[derive(Debug, Clone)]
pub enum S3Credentials {
    Profile(String),
    Credentials { access_keys: AccessKeys },
    FromEnvironment,
}

/// AWS access key pair with secure zeroization.
///
/// The secret_access_key and session_token are securely cleared from memory
/// when this struct is dropped, using the zeroize crate.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessKeys {
    pub access_key: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Debug for AccessKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_struct("AccessKeys");
        let session_token = self
            .session_token
            .as_ref()
            .map_or("None", |_| "** redacted **");
        keys.field("access_key", &self.access_key)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &session_token);
        keys.finish()
    }
}
