//! Applies a batch of configuration operations to one bucket.
//!
//! The applier validates the target once, resolves every request through the
//! [`SettingsCatalog`], and sends the resulting provider requests one at a
//! time. A failing operation never stops the run; each request gets exactly
//! one [`OperationOutcome`] and the report keeps submission order.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::catalog::{
    BuildContext, OperationRequest, ProviderRequest, ResolvedOperation, SettingsCatalog,
};
use crate::provider::{Provider, ProviderError};
use crate::types::error::{ApplyError, ValidationError};
use crate::types::token::RunCancellationToken;
use crate::types::{OperationFailure, OperationOutcome, OutcomeReport, ResourceRef, SkipReason};
use crate::validator::ResourceValidator;

/// State carried between the operations of one `apply` call.
#[derive(Debug, Default)]
struct Session {
    versioned_buckets: HashSet<String>,
}

impl Session {
    fn record_success(&mut self, request: &ProviderRequest) {
        if let ProviderRequest::PutVersioning { bucket } = request {
            self.versioned_buckets.insert(bucket.clone());
        }
    }
}

pub struct ConfigurationApplier {
    provider: Provider,
    validator: ResourceValidator,
    catalog: Arc<SettingsCatalog>,
    dry_run: bool,
}

impl ConfigurationApplier {
    pub fn new(
        provider: Provider,
        validator: ResourceValidator,
        catalog: Arc<SettingsCatalog>,
    ) -> Self {
        Self {
            provider,
            validator,
            catalog,
            dry_run: false,
        }
    }

    /// Applier over the standard catalog with a validator sharing `provider`.
    pub fn with_provider(provider: Provider) -> Self {
        let validator = ResourceValidator::new(provider.clone());
        Self::new(provider, validator, SettingsCatalog::global())
    }

    /// Resolve and validate everything, but send nothing.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Apply `requests` to `target`.
    ///
    /// Fails only when the target itself cannot be validated; in that case no
    /// request is processed. Requests whose operation requires versioning run
    /// after every other request, so a versioning request later in the batch
    /// still counts for them.
    pub async fn apply(
        &self,
        target: &ResourceRef,
        requests: Vec<OperationRequest>,
        cancellation_token: &RunCancellationToken,
    ) -> Result<OutcomeReport, ValidationError> {
        self.validator.ensure_exists(target).await?;
        info!(
            bucket = target.name(),
            operations = requests.len(),
            dry_run = self.dry_run,
            "target bucket validated."
        );

        let mut session = Session::default();
        let mut outcomes: Vec<Option<OperationOutcome>> = vec![None; requests.len()];

        for index in self.execution_order(&requests) {
            let outcome = self
                .apply_one(target, &requests[index], &mut session, cancellation_token)
                .await;
            outcomes[index] = Some(outcome);
        }

        let report = OutcomeReport::new(outcomes.into_iter().flatten().collect());
        info!(
            bucket = target.name(),
            applied = report.applied_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "configuration run finished."
        );
        Ok(report)
    }

    fn execution_order(&self, requests: &[OperationRequest]) -> Vec<usize> {
        let (deferred, immediate): (Vec<usize>, Vec<usize>) = (0..requests.len())
            .partition(|&index| self.catalog.requires_versioning(&requests[index].operation));
        immediate.into_iter().chain(deferred).collect()
    }

    async fn apply_one(
        &self,
        target: &ResourceRef,
        request: &OperationRequest,
        session: &mut Session,
        cancellation_token: &RunCancellationToken,
    ) -> OperationOutcome {
        let operation = request.operation.as_str();

        if cancellation_token.is_cancelled() {
            warn!(
                operation = operation,
                bucket = target.name(),
                "operation skipped: run cancelled."
            );
            return OperationOutcome::skipped(operation, target.name(), SkipReason::Cancelled);
        }

        let ctx = BuildContext::new(target, &session.versioned_buckets);
        let resolved = match self.catalog.resolve(&ctx, request) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(
                    operation = operation,
                    bucket = target.name(),
                    error = %e,
                    "operation rejected before sending."
                );
                return OperationOutcome::failed(
                    operation,
                    target.name(),
                    OperationFailure::Spec(e),
                );
            }
        };
        let bucket = resolved.request.bucket().to_string();

        if let Err(failure) = self.validate_secondary(target, &resolved).await {
            warn!(
                operation = operation,
                bucket = bucket,
                error = %failure,
                "secondary bucket validation failed."
            );
            return OperationOutcome::failed(operation, &bucket, OperationFailure::Apply(failure));
        }

        if self.dry_run {
            info!(
                operation = operation,
                bucket = bucket,
                api = resolved.request.api_name(),
                "[dry-run] operation would be applied."
            );
            session.record_success(&resolved.request);
            return OperationOutcome::skipped(operation, &bucket, SkipReason::DryRun);
        }

        debug!(
            operation = operation,
            bucket = bucket,
            api = resolved.request.api_name(),
            "sending request."
        );
        match self.provider.send(&resolved.request).await {
            Ok(()) => {
                session.record_success(&resolved.request);
                info!(operation = operation, bucket = bucket, "operation applied.");
                OperationOutcome::applied(operation, &bucket)
            }
            Err(e) => {
                let failure = into_apply_error(e);
                error!(
                    operation = operation,
                    bucket = bucket,
                    error = %failure,
                    "operation failed."
                );
                OperationOutcome::failed(operation, &bucket, OperationFailure::Apply(failure))
            }
        }
    }

    async fn validate_secondary(
        &self,
        target: &ResourceRef,
        resolved: &ResolvedOperation,
    ) -> Result<(), ApplyError> {
        let Some(secondary) = resolved.secondary_bucket(target) else {
            return Ok(());
        };

        self.validator
            .ensure_exists(&target.sibling(secondary))
            .await
            .map_err(|e| ApplyError::PreconditionUnmet(e.to_string()))
    }
}

fn into_apply_error(error: ProviderError) -> ApplyError {
    match error {
        ProviderError::Transport(message) => ApplyError::Transport(message),
        other => ApplyError::ProviderRejected {
            code: other.code().to_string(),
            message: other.message(),
        },
    }
}
