use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing::{debug, error, info, trace, warn};

use s3conf_rs::config::{ApplyConfig, ClientConfig, Command, Config, ListConfig};
use s3conf_rs::{
    BucketProvisioner, CLIArgs, ConfigurationApplier, ContentLister, InteractiveSelector,
    OperationRequest, Provider, ResourceRef, ResourceValidator, RunCancellationToken, S3confError,
    SettingsCatalog, create_provider, create_run_cancellation_token, exit_code_from_error,
    is_cancelled_error,
};

mod ctrl_c_handler;
mod report;
mod tracing_init;

const EXIT_CODE_GENERAL_ERROR: i32 = 1;

/// s3conf - Amazon S3 bucket configuration tool.
///
/// This binary is a thin wrapper over the s3conf-rs library.
/// All core functionality is implemented in the library crate.
#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config_exit_if_err();

    if let Some(shell) = config.auto_complete_shell {
        generate(
            shell,
            &mut CLIArgs::command(),
            "s3conf",
            &mut std::io::stdout(),
        );

        return Ok(());
    }

    start_tracing_if_necessary(&config);

    trace!("config = {:?}", config);

    match run(config).await {
        Ok(()) => Ok(()),
        Err(e) if is_cancelled_error(&e) => {
            debug!("s3conf cancelled by user.");
            Ok(())
        }
        Err(e) => {
            let exit_code = exit_code_from_error(&e);
            if exit_code == EXIT_CODE_GENERAL_ERROR {
                return Err(e);
            }
            error!("{e:#}");
            std::process::exit(exit_code);
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
fn load_config_exit_if_err() -> Config {
    match Config::try_from(CLIArgs::parse()) {
        Ok(config) => config,
        Err(error_message) => {
            clap::Error::raw(clap::error::ErrorKind::ValueValidation, error_message).exit()
        }
    }
}

fn start_tracing_if_necessary(config: &Config) -> bool {
    let Some(tracing_config) = config.tracing_config.as_ref() else {
        return false;
    };

    tracing_init::init_tracing(tracing_config);
    true
}

async fn run(config: Config) -> Result<()> {
    let Config {
        command,
        client_config,
        ..
    } = config;

    match command {
        Command::Apply(apply_config) => run_apply(client_config, apply_config).await,
        Command::List(list_config) => run_list(client_config, list_config).await,
        Command::Create { target } => run_create(client_config, target).await,
        Command::Operations => {
            report::print_catalog(&SettingsCatalog::global());
            Ok(())
        }
    }
}

async fn run_apply(client_config: ClientConfig, apply_config: ApplyConfig) -> Result<()> {
    let ApplyConfig {
        target,
        mut requests,
        interactive,
        dry_run,
    } = apply_config;

    if interactive {
        let prompt_target = target.clone();
        let selected =
            tokio::task::spawn_blocking(move || InteractiveSelector::new().select(&prompt_target))
                .await??;
        requests.extend(selected);
    }

    if requests.is_empty() {
        warn!(
            bucket = target.name(),
            "no operation selected. only the bucket will be checked."
        );
    }

    let cancellation_token = create_run_cancellation_token();
    ctrl_c_handler::spawn_ctrl_c_handler(cancellation_token.clone());

    let provider = create_provider(client_config).await;
    apply_requests(provider, &target, requests, dry_run, &cancellation_token).await
}

async fn apply_requests(
    provider: Provider,
    target: &ResourceRef,
    requests: Vec<OperationRequest>,
    dry_run: bool,
    cancellation_token: &RunCancellationToken,
) -> Result<()> {
    let start_time = tokio::time::Instant::now();
    debug!(bucket = target.name(), "configuration run start.");

    let report = ConfigurationApplier::with_provider(provider)
        .dry_run(dry_run)
        .apply(target, requests, cancellation_token)
        .await
        .map_err(S3confError::Validation)?;

    let duration_sec = format!("{:.3}", start_time.elapsed().as_secs_f32());
    report::print_outcomes(&report, &duration_sec);

    if report.has_failure() {
        for outcome in report.outcomes().iter().filter(|o| o.is_failed()) {
            error!(
                bucket = outcome.bucket.as_str(),
                operation = outcome.operation.as_str(),
                "{}",
                outcome.status
            );
        }
        return Err(anyhow!(S3confError::PartialFailure {
            applied: report.applied_count(),
            failed: report.failed_count(),
        }));
    }

    if cancellation_token.is_cancelled() {
        return Err(anyhow!(S3confError::Cancelled));
    }
    cancellation_token.cancel();

    debug!(duration_sec = duration_sec, "s3conf has been completed.");
    Ok(())
}

async fn run_list(client_config: ClientConfig, list_config: ListConfig) -> Result<()> {
    let ListConfig {
        target,
        options,
        force,
    } = list_config;

    let provider = create_provider(client_config).await;
    let lister = ContentLister::new(provider.clone());

    let buckets = lister.list_bucket_names().await?;
    report::print_bucket_names(&buckets);

    if !buckets.iter().any(|bucket| bucket == target.name()) {
        warn!(
            bucket = target.name(),
            "bucket was not found among the buckets of this account."
        );
        if !force && !confirm_list_foreign_bucket(&target).await? {
            return Err(anyhow!(S3confError::Cancelled));
        }
    }

    ResourceValidator::new(provider)
        .ensure_exists(&target)
        .await
        .map_err(S3confError::Validation)?;

    let listing = lister.list(&target, &options).await?;
    report::print_listing(target.name(), &listing);

    info!(
        bucket = target.name(),
        directories = listing.directories.len(),
        objects = listing.objects.len(),
        "bucket listed."
    );
    Ok(())
}

async fn confirm_list_foreign_bucket(target: &ResourceRef) -> Result<bool> {
    let question = format!("Bucket '{}' is not in your account. Continue?", target.name());
    tokio::task::spawn_blocking(move || InteractiveSelector::new().confirm(&question)).await?
}

async fn run_create(client_config: ClientConfig, target: ResourceRef) -> Result<()> {
    let provider = create_provider(client_config).await;
    BucketProvisioner::new(provider).create(&target).await?;

    println!("Bucket '{}' created in {}.", target.name(), target.region());
    Ok(())
}
