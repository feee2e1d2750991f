use anyhow::Error;
use thiserror::Error;

/// Application-level error types for s3conf-rs.
///
/// These represent errors that end a whole command: configuration problems,
/// a target bucket that cannot be validated, cancellation and partial failure.
/// Per-operation failures are not errors at this level; they are recorded in
/// the [`OutcomeReport`](crate::types::OutcomeReport).
///
/// ## Exit Codes
///
/// Each variant maps to an exit code (via `exit_code()`):
/// - 0: Non-error conditions (Cancelled)
/// - 1: General errors (AwsSdk, Validation, BucketAlreadyExists, Io)
/// - 2: Configuration errors (InvalidConfig)
/// - 3: Partial failure (some operations applied, some failed)
#[derive(Error, Debug, PartialEq)]
pub enum S3confError {
    /// AWS SDK error surfaced outside the per-operation outcome report.
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    /// Configuration error (non-retryable).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The target bucket failed validation.
    #[error("Bucket validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// `create` was asked for a bucket that already exists.
    #[error("Bucket '{0}' already exists")]
    BucketAlreadyExists(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Operation cancelled by user.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Some requested operations failed.
    #[error("Partial failure: {applied} applied, {failed} failed")]
    PartialFailure { applied: u64, failed: u64 },
}

impl S3confError {
    /// Get the appropriate process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            S3confError::Cancelled => 0,
            S3confError::InvalidConfig(_) => 2,
            S3confError::PartialFailure { .. } => 3,
            _ => 1,
        }
    }
}

/// Failure of a bucket existence/accessibility check.
///
/// "Not found" is only an error when the caller requires the bucket to exist
/// (`ResourceValidator::ensure_exists`); `ResourceValidator::exists` reports it
/// as `Ok(false)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The name violates S3 bucket naming rules. No request was sent.
    #[error("invalid bucket name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("bucket '{0}' does not exist")]
    NotFound(String),

    #[error("transport error while checking bucket '{bucket}': {message}")]
    Transport { bucket: String, message: String },

    #[error("access denied to bucket '{bucket}' ({code})")]
    Auth { bucket: String, code: String },

    #[error("unexpected error while checking bucket '{bucket}': {message}")]
    Unknown { bucket: String, message: String },
}

/// Failure to turn an [`OperationRequest`](crate::catalog::OperationRequest)
/// into a provider request. Always raised before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("invalid parameter '{field}': {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("precondition unmet: {0}")]
    PreconditionUnmet(String),
}

/// Failure while executing a built request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// The provider answered and refused the request (denial, conflict,
    /// malformed configuration, missing resource).
    #[error("rejected by provider: {code} ({message})")]
    ProviderRejected { code: String, message: String },

    /// The request never got a provider answer.
    #[error("transport error: {0}")]
    Transport(String),

    /// A resource the operation depends on could not be validated.
    #[error("precondition unmet: {0}")]
    PreconditionUnmet(String),
}

/// Check if an anyhow::Error wraps a cancellation error.
pub fn is_cancelled_error(e: &Error) -> bool {
    if let Some(err) = e.downcast_ref::<S3confError>() {
        return *err == S3confError::Cancelled;
    }
    false
}

/// Extract the exit code from an anyhow::Error, defaulting to 1.
pub fn exit_code_from_error(e: &Error) -> i32 {
    if let Some(err) = e.downcast_ref::<S3confError>() {
        return err.exit_code();
    }
    1
}
