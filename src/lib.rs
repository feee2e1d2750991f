/*!
# Overview
s3conf-rs is an Amazon S3 bucket configuration tool.
It applies named, validated configuration changes (versioning, encryption,
lifecycle, replication, inventory, storage class analysis, public access,
ownership, CORS and more) to a bucket and reports the outcome of every one.

## Features
- **Typed operation catalog**: every operation declares its parameters,
  secondary bucket and preconditions; requests are checked before any call
- **Validate, then apply**: the target bucket is probed first; a failing
  operation never stops the others
- **Dependency aware**: replication waits for versioning requested in the same
  run, and fails early when either bucket is not versioned
- **Dry-run and cancellation**: resolve everything without sending, or stop
  between operations on Ctrl+C
- **Listing and creation**: list bucket contents sorted by modification time,
  create buckets with a location constraint
- **Library-First**: the s3conf CLI is a thin wrapper over this crate

## As a Library

```toml
[dependencies]
s3conf-rs = "0.1"
tokio = { version = "1", features = ["full"] }
```

```no_run
use s3conf_rs::config::ClientConfig;
use s3conf_rs::{
    ConfigurationApplier, OperationRequest, ResourceRef, create_provider,
    create_run_cancellation_token,
};

#[tokio::main]
async fn main() {
    let provider = create_provider(ClientConfig::default()).await;
    let applier = ConfigurationApplier::with_provider(provider);

    let report = applier
        .apply(
            &ResourceRef::new("my-data-bucket", "eu-west-2"),
            vec![
                OperationRequest::new("versioning-enable"),
                OperationRequest::new("lifecycle-policy"),
            ],
            &create_run_cancellation_token(),
        )
        .await
        .unwrap();

    for outcome in report.outcomes() {
        println!("{} {}: {}", outcome.bucket, outcome.operation, outcome.status);
    }
}
```
*/

pub mod applier;
pub mod catalog;
pub mod config;
pub mod lister;
pub mod prompt;
pub mod provider;
pub mod provisioner;
pub mod types;
pub mod validator;

#[cfg(test)]
mod lib_properties;
#[cfg(test)]
pub(crate) mod test_utils;

pub use applier::ConfigurationApplier;
pub use catalog::{OperationRequest, OperationSpec, ParamValue, SettingsCatalog};
pub use config::Config;
pub use config::args::CLIArgs;
pub use lister::{ContentLister, ListingOptions};
pub use prompt::InteractiveSelector;
pub use provider::{Provider, ProviderClient, ProviderError, create_provider};
pub use provisioner::BucketProvisioner;
pub use types::error::{S3confError, exit_code_from_error, is_cancelled_error};
pub use types::token::{RunCancellationToken, create_run_cancellation_token};
pub use types::{OperationOutcome, OutcomeReport, OutcomeStatus, ResourceRef};
pub use validator::{ResourceValidator, validate_bucket_name};
