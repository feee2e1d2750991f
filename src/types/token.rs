/// A cancellation token used to stop a run between operations.
///
/// This is a type alias for [`tokio_util::sync::CancellationToken`]. Pass the
/// token to [`ConfigurationApplier::apply`](crate::ConfigurationApplier::apply)
/// and call [`cancel()`](tokio_util::sync::CancellationToken::cancel) on it to
/// stop before the next operation starts (e.g., in a Ctrl+C handler).
///
/// # Example
///
/// ```
/// use s3conf_rs::create_run_cancellation_token;
///
/// let token = create_run_cancellation_token();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
pub type RunCancellationToken = tokio_util::sync::CancellationToken;

/// Create a new [`RunCancellationToken`].
pub fn create_run_cancellation_token() -> RunCancellationToken {
    tokio_util::sync::CancellationToken::new()
}
