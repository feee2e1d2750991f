use std::ffi::OsString;
use std::path::PathBuf;

use aws_smithy_types::checksum_config::RequestChecksumCalculation;
use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::catalog::OperationRequest;
use crate::catalog::management::{INVENTORY_REPORT, LIFECYCLE_POLICY, REPLICATION_RULE};
use crate::catalog::metrics::STORAGE_CLASS_ANALYSIS;
use crate::catalog::permissions::{
    CORS_RULE, OBJECT_OWNERSHIP, PRIVATE_ACL, PUBLIC_ACCESS_BLOCK, SECURE_TRANSPORT_POLICY,
};
use crate::catalog::properties::{
    ACCESS_LOGGING, ENCRYPTION, REQUESTER_PAYS, TRANSFER_ACCELERATION, VERSIONING_ENABLE,
};
use crate::config::{
    ApplyConfig, CLITimeoutConfig, ClientConfig, Command, Config, DEFAULT_REGION, ListConfig,
    RetryConfig, TracingConfig,
};
use crate::lister::{DEFAULT_STRIP_PREFIXES, ListingOptions};
use crate::types::{AccessKeys, ClientConfigLocation, ResourceRef, S3Credentials};

mod value_parser;


// ---------------------------------------------------------------------------
// Default constants
// ---------------------------------------------------------------------------

const DEFAULT_AWS_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_INITIAL_BACKOFF_MILLISECONDS: u64 = 100;
const DEFAULT_JSON_TRACING: bool = false;
const DEFAULT_AWS_SDK_TRACING: bool = false;
const DEFAULT_SPAN_EVENTS_TRACING: bool = false;
const DEFAULT_DISABLE_COLOR_TRACING: bool = false;
const DEFAULT_FORCE_PATH_STYLE: bool = false;
const DEFAULT_ACCELERATE: bool = false;
const DEFAULT_DISABLE_STALLED_STREAM_PROTECTION: bool = false;
const DEFAULT_DRY_RUN: bool = false;
const DEFAULT_INTERACTIVE: bool = false;
const DEFAULT_FORCE: bool = false;

// ---------------------------------------------------------------------------
// Error messages
// ---------------------------------------------------------------------------

const ERROR_MESSAGE_COMMAND_REQUIRED: &str =
    "A subcommand is required: apply, list, create or operations.";
const ERROR_MESSAGE_NO_OPERATION: &str =
    "No operation selected. Pass operation flags or --interactive.";
const ERROR_MESSAGE_AWS_MAX_ATTEMPTS_ZERO: &str = "AWS max attempts must be at least 1.";
const ERROR_MESSAGE_INVALID_BUCKET: &str =
    "Bucket must be a bucket name or s3://<BUCKET_NAME>, without a key prefix.";
const ERROR_MESSAGE_INVALID_OPERATION: &str =
    "Operation must be NAME or NAME:KEY=VALUE[;KEY=VALUE]...";

// ---------------------------------------------------------------------------
// Value parser helpers
// ---------------------------------------------------------------------------

fn check_bucket(s: &str) -> Result<String, String> {
    let bucket = s.strip_prefix("s3://").unwrap_or(s);
    let bucket = bucket.strip_suffix('/').unwrap_or(bucket);
    if bucket.is_empty() || bucket.contains('/') {
        return Err(ERROR_MESSAGE_INVALID_BUCKET.to_string());
    }
    Ok(bucket.to_string())
}

/// `NAME` or `NAME:KEY=VALUE[;KEY=VALUE]...`. Values stay strings; the
/// catalog coerces them to the declared parameter kind.
fn parse_operation(s: &str) -> Result<OperationRequest, String> {
    let (name, params) = match s.split_once(':') {
        Some((name, params)) => (name.trim(), Some(params)),
        None => (s.trim(), None),
    };
    if name.is_empty() {
        return Err(ERROR_MESSAGE_INVALID_OPERATION.to_string());
    }

    let mut request = OperationRequest::new(name);
    for pair in params.into_iter().flat_map(|p| p.split(';')) {
        if pair.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("{ERROR_MESSAGE_INVALID_OPERATION} (got '{pair}')"));
        };
        if key.trim().is_empty() {
            return Err(format!("{ERROR_MESSAGE_INVALID_OPERATION} (got '{pair}')"));
        }
        request = request.with_param(key.trim(), value.trim());
    }
    Ok(request)
}

// ---------------------------------------------------------------------------
// CLIArgs (clap-derived argument struct)
// ---------------------------------------------------------------------------

/// s3conf - Amazon S3 bucket configuration tool.
///
/// Apply properties, management, metrics and permission settings to a bucket,
/// list bucket contents, and create buckets.
///
/// Example:
///   s3conf apply my-data-bucket --versioning --lifecycle-policy
///   s3conf apply my-data-bucket --interactive --dry-run
///   s3conf list my-data-bucket --extension .csv
///   s3conf create my-new-bucket --region eu-west-2
#[derive(Parser, Clone, Debug)]
#[command(name = "s3conf", version, about, long_about = None)]
pub struct CLIArgs {
    #[command(subcommand)]
    pub command: Option<CLICommand>,

    // -----------------------------------------------------------------------
    // Logging options
    // -----------------------------------------------------------------------
    /// Verbosity level. -q (quiet), default (normal), -v, -vv, -vvv.
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Output logs in JSON format.
    #[arg(long, env, global = true, default_value_t = DEFAULT_JSON_TRACING, help_heading = "Logging")]
    pub json_tracing: bool,

    /// Enable AWS SDK tracing.
    #[arg(long, env, global = true, default_value_t = DEFAULT_AWS_SDK_TRACING, help_heading = "Logging")]
    pub aws_sdk_tracing: bool,

    /// Enable tracing span events.
    #[arg(long, env, global = true, default_value_t = DEFAULT_SPAN_EVENTS_TRACING, help_heading = "Logging")]
    pub span_events_tracing: bool,

    /// Disable colored output in logs.
    #[arg(long, env, global = true, default_value_t = DEFAULT_DISABLE_COLOR_TRACING, help_heading = "Logging")]
    pub disable_color_tracing: bool,

    // -----------------------------------------------------------------------
    // Retry options
    // -----------------------------------------------------------------------
    /// Maximum retry attempts for AWS SDK operations. Default: 10.
    #[arg(long, env, global = true, default_value_t = DEFAULT_AWS_MAX_ATTEMPTS, help_heading = "Retry")]
    pub aws_max_attempts: u32,

    /// Initial backoff in milliseconds for retries. Default: 100.
    #[arg(long, env, global = true, default_value_t = DEFAULT_INITIAL_BACKOFF_MILLISECONDS, help_heading = "Retry")]
    pub initial_backoff_milliseconds: u64,

    // -----------------------------------------------------------------------
    // Timeout options
    // -----------------------------------------------------------------------
    /// Overall operation timeout in milliseconds.
    #[arg(long, env, global = true, help_heading = "Timeout")]
    pub operation_timeout_milliseconds: Option<u64>,

    /// Per-attempt operation timeout in milliseconds.
    #[arg(long, env, global = true, help_heading = "Timeout")]
    pub operation_attempt_timeout_milliseconds: Option<u64>,

    /// Connection timeout in milliseconds.
    #[arg(long, env, global = true, help_heading = "Timeout")]
    pub connect_timeout_milliseconds: Option<u64>,

    /// Read timeout in milliseconds.
    #[arg(long, env, global = true, help_heading = "Timeout")]
    pub read_timeout_milliseconds: Option<u64>,

    // -----------------------------------------------------------------------
    // AWS configuration
    // -----------------------------------------------------------------------
    /// AWS config file path.
    #[arg(long, env, global = true, value_parser = value_parser::file_exist::is_file_exist, help_heading = "AWS")]
    pub aws_config_file: Option<PathBuf>,

    /// AWS shared credentials file path.
    #[arg(long, env, global = true, value_parser = value_parser::file_exist::is_file_exist, help_heading = "AWS")]
    pub aws_shared_credentials_file: Option<PathBuf>,

    /// AWS profile. If not set, uses the default credential chain.
    #[arg(long, env, global = true, conflicts_with_all = ["access_key"], value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub profile: Option<String>,

    /// AWS access key ID.
    #[arg(long, env, global = true, requires = "secret_access_key", value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub access_key: Option<String>,

    /// AWS secret access key.
    #[arg(long, env, global = true, requires = "access_key", value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub secret_access_key: Option<String>,

    /// AWS session token.
    #[arg(long, env, global = true, requires = "access_key", value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub session_token: Option<String>,

    /// AWS region. Also the region new buckets are created in.
    #[arg(long, env, global = true, default_value = DEFAULT_REGION, value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub region: String,

    /// Custom S3-compatible endpoint URL (e.g. MinIO).
    #[arg(long, env, global = true, value_parser = value_parser::url::check_scheme, help_heading = "AWS")]
    pub endpoint_url: Option<String>,

    /// Force path-style access (required for some S3-compatible services).
    #[arg(long, env, global = true, default_value_t = DEFAULT_FORCE_PATH_STYLE, help_heading = "AWS")]
    pub force_path_style: bool,

    /// Send requests through the S3 Transfer Acceleration endpoint.
    #[arg(long, env, global = true, default_value_t = DEFAULT_ACCELERATE, help_heading = "AWS")]
    pub use_accelerate_endpoint: bool,

    /// Disable stalled stream protection.
    #[arg(long, env, global = true, default_value_t = DEFAULT_DISABLE_STALLED_STREAM_PROTECTION, help_heading = "AWS")]
    pub disable_stalled_stream_protection: bool,

    // -----------------------------------------------------------------------
    // Advanced options
    // -----------------------------------------------------------------------
    /// Generate shell completions.
    #[arg(long, env, help_heading = "Advanced")]
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum CLICommand {
    /// Apply configuration operations to a bucket.
    Apply(ApplyArgs),

    /// List directories and objects in a bucket.
    List(ListArgs),

    /// Create a bucket in --region.
    Create(CreateArgs),

    /// Print every available operation and its parameters.
    Operations,
}

#[derive(Args, Clone, Debug)]
pub struct ApplyArgs {
    /// Target bucket: <BUCKET_NAME> or s3://<BUCKET_NAME>
    #[arg(env = "S3CONF_BUCKET", value_parser = check_bucket)]
    pub bucket: String,

    /// Resolve and validate every operation without changing anything.
    #[arg(short = 'd', long, env, default_value_t = DEFAULT_DRY_RUN, help_heading = "General")]
    pub dry_run: bool,

    /// Ask which operations to apply on the terminal.
    #[arg(short = 'i', long, env, default_value_t = DEFAULT_INTERACTIVE, help_heading = "General")]
    pub interactive: bool,

    /// Any catalog operation: NAME or NAME:KEY=VALUE[;KEY=VALUE]...
    /// Applied after the operations selected by the dedicated flags.
    #[arg(long = "operation", env = "S3CONF_OPERATION", value_parser = parse_operation, help_heading = "General")]
    pub operations: Vec<OperationRequest>,

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------
    /// Enable versioning.
    #[arg(long, env, help_heading = "Properties")]
    pub versioning: bool,

    /// Enable default encryption (AES256 unless --encryption-algorithm).
    #[arg(long, env, help_heading = "Properties")]
    pub encryption: bool,

    /// AES256 or aws:kms.
    #[arg(long, env, requires = "encryption", value_parser = NonEmptyStringValueParser::new(), help_heading = "Properties")]
    pub encryption_algorithm: Option<String>,

    /// KMS key id or ARN for aws:kms.
    #[arg(long, env, requires = "encryption", value_parser = NonEmptyStringValueParser::new(), help_heading = "Properties")]
    pub kms_key_id: Option<String>,

    /// Enable transfer acceleration.
    #[arg(long, env, help_heading = "Properties")]
    pub transfer_acceleration: bool,

    /// Enable requester pays.
    #[arg(long, env, help_heading = "Properties")]
    pub requester_pays: bool,

    /// Enable access logging into this bucket.
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "Properties")]
    pub access_logging_target_bucket: Option<String>,

    /// Key prefix of access log objects. Default: logs/
    #[arg(long, env, requires = "access_logging_target_bucket", help_heading = "Properties")]
    pub access_logging_prefix: Option<String>,

    // -----------------------------------------------------------------------
    // Management
    // -----------------------------------------------------------------------
    /// Apply the lifecycle policy (30 days STANDARD_IA, 90 days GLACIER,
    /// expire after 365 days unless overridden).
    #[arg(long, env, help_heading = "Management")]
    pub lifecycle_policy: bool,

    /// Days before the STANDARD_IA transition. Default: 30
    #[arg(long, env, requires = "lifecycle_policy", help_heading = "Management")]
    pub lifecycle_infrequent_access_days: Option<i64>,

    /// Days before the GLACIER transition. Default: 90
    #[arg(long, env, requires = "lifecycle_policy", help_heading = "Management")]
    pub lifecycle_archive_days: Option<i64>,

    /// Days before objects expire. Default: 365
    #[arg(long, env, requires = "lifecycle_policy", help_heading = "Management")]
    pub lifecycle_expiration_days: Option<i64>,

    /// Replicate objects into this bucket. Both buckets must be versioned.
    #[arg(long, env, requires = "replication_account_id", value_parser = NonEmptyStringValueParser::new(), help_heading = "Management")]
    pub replication_destination: Option<String>,

    /// AWS account id owning the replication role.
    #[arg(long, env, requires = "replication_destination", value_parser = NonEmptyStringValueParser::new(), help_heading = "Management")]
    pub replication_account_id: Option<String>,

    /// IAM role name assumed by S3. Default: s3-replication-role
    #[arg(long, env, requires = "replication_destination", value_parser = NonEmptyStringValueParser::new(), help_heading = "Management")]
    pub replication_role_name: Option<String>,

    /// Also enable versioning on the target and the replication destination.
    #[arg(long, env, requires = "replication_destination", help_heading = "Management")]
    pub replication_enable_versioning: bool,

    /// Publish an inventory report.
    #[arg(long, env, help_heading = "Management")]
    pub inventory: bool,

    /// Bucket receiving the inventory report. Default: the target bucket.
    #[arg(long, env, requires = "inventory", value_parser = NonEmptyStringValueParser::new(), help_heading = "Management")]
    pub inventory_destination: Option<String>,

    /// Daily or Weekly.
    #[arg(long, env, requires = "inventory", value_parser = NonEmptyStringValueParser::new(), help_heading = "Management")]
    pub inventory_frequency: Option<String>,

    /// CSV, ORC or Parquet.
    #[arg(long, env, requires = "inventory", value_parser = NonEmptyStringValueParser::new(), help_heading = "Management")]
    pub inventory_format: Option<String>,

    // -----------------------------------------------------------------------
    // Metrics
    // -----------------------------------------------------------------------
    /// Enable storage class analysis, exporting into this bucket.
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "Metrics")]
    pub storage_class_analysis_destination: Option<String>,

    /// Only analyse keys under this prefix.
    #[arg(long, env, requires = "storage_class_analysis_destination", help_heading = "Metrics")]
    pub storage_class_analysis_prefix: Option<String>,

    // -----------------------------------------------------------------------
    // Permissions
    // -----------------------------------------------------------------------
    /// Block all public access.
    #[arg(long, env, help_heading = "Permissions")]
    pub block_public_access: bool,

    /// Deny requests not sent over TLS.
    #[arg(long, env, help_heading = "Permissions")]
    pub secure_transport_policy: bool,

    /// enforced, owner-preferred or writer-preferred.
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "Permissions")]
    pub object_ownership: Option<String>,

    /// Apply the private canned ACL.
    #[arg(long, env, help_heading = "Permissions")]
    pub private_acl: bool,

    /// Add a CORS rule.
    #[arg(long, env, help_heading = "Permissions")]
    pub cors: bool,

    /// Comma separated. Default: GET
    #[arg(long, env, requires = "cors", value_delimiter = ',', help_heading = "Permissions")]
    pub cors_allowed_methods: Vec<String>,

    /// Comma separated. Default: *
    #[arg(long, env, requires = "cors", value_delimiter = ',', help_heading = "Permissions")]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    /// Bucket to list: <BUCKET_NAME> or s3://<BUCKET_NAME>
    #[arg(env = "S3CONF_BUCKET", value_parser = check_bucket)]
    pub bucket: String,

    /// Only list keys ending with this suffix (e.g. .csv).
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new())]
    pub extension: Option<String>,

    /// Prefix removed from displayed names; repeatable, first match wins.
    /// Default: Home/users/ and Home/
    #[arg(long = "strip-prefix", env = "S3CONF_STRIP_PREFIXES", value_delimiter = ',', value_parser = NonEmptyStringValueParser::new())]
    pub strip_prefixes: Vec<String>,

    /// Do not ask for confirmation when the bucket is not in the account.
    #[arg(short = 'f', long, env, default_value_t = DEFAULT_FORCE)]
    pub force: bool,
}

#[derive(Args, Clone, Debug)]
pub struct CreateArgs {
    /// Bucket to create: <BUCKET_NAME> or s3://<BUCKET_NAME>
    #[arg(env = "S3CONF_BUCKET", value_parser = check_bucket)]
    pub bucket: String,
}

// ---------------------------------------------------------------------------
// parse_from_args (public API)
// ---------------------------------------------------------------------------

/// Parse command-line arguments into a `CLIArgs` struct.
///
/// # Example
///
/// ```
/// use s3conf_rs::config::args::{CLICommand, parse_from_args};
///
/// let args = vec!["s3conf", "apply", "my-data-bucket", "--versioning", "--dry-run"];
/// let cli_args = parse_from_args(args).unwrap();
/// assert!(matches!(cli_args.command, Some(CLICommand::Apply(ref apply)) if apply.dry_run));
/// ```
pub fn parse_from_args<I, T>(args: I) -> Result<CLIArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CLIArgs::try_parse_from(args)
}

/// Parse arguments and build a Config in one step.
pub fn build_config_from_args<I, T>(args: I) -> Result<Config, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli_args = CLIArgs::try_parse_from(args).map_err(|e| e.to_string())?;
    Config::try_from(cli_args)
}

// ---------------------------------------------------------------------------
// Validation and Config conversion
// ---------------------------------------------------------------------------

impl ApplyArgs {
    /// Operations chosen by flags, grouped as properties, management,
    /// metrics, permissions, then `--operation` entries.
    pub fn build_requests(&self) -> Vec<OperationRequest> {
        let mut requests = Vec::new();

        if self.versioning || self.replication_enable_versioning {
            requests.push(OperationRequest::new(VERSIONING_ENABLE));
        }
        if self.encryption {
            let mut request = OperationRequest::new(ENCRYPTION);
            if let Some(algorithm) = &self.encryption_algorithm {
                request = request.with_param("algorithm", algorithm.as_str());
            }
            if let Some(kms_key_id) = &self.kms_key_id {
                request = request.with_param("kms-key-id", kms_key_id.as_str());
            }
            requests.push(request);
        }
        if self.transfer_acceleration {
            requests.push(OperationRequest::new(TRANSFER_ACCELERATION));
        }
        if self.requester_pays {
            requests.push(OperationRequest::new(REQUESTER_PAYS));
        }
        if let Some(target_bucket) = &self.access_logging_target_bucket {
            let mut request =
                OperationRequest::new(ACCESS_LOGGING).with_param("target-bucket", target_bucket.as_str());
            if let Some(prefix) = &self.access_logging_prefix {
                request = request.with_param("prefix", prefix.as_str());
            }
            requests.push(request);
        }

        if self.lifecycle_policy {
            let mut request = OperationRequest::new(LIFECYCLE_POLICY);
            for (name, days) in [
                ("infrequent-access-days", self.lifecycle_infrequent_access_days),
                ("archive-days", self.lifecycle_archive_days),
                ("expiration-days", self.lifecycle_expiration_days),
            ] {
                if let Some(days) = days {
                    request = request.with_param(name, days);
                }
            }
            requests.push(request);
        }
        if let (Some(destination), Some(account_id)) =
            (&self.replication_destination, &self.replication_account_id)
        {
            if self.replication_enable_versioning {
                requests.push(
                    OperationRequest::new(VERSIONING_ENABLE).with_param("bucket", destination.as_str()),
                );
            }
            let mut request = OperationRequest::new(REPLICATION_RULE)
                .with_param("destination", destination.as_str())
                .with_param("account-id", account_id.as_str());
            if let Some(role_name) = &self.replication_role_name {
                request = request.with_param("role-name", role_name.as_str());
            }
            requests.push(request);
        }
        if self.inventory {
            let mut request = OperationRequest::new(INVENTORY_REPORT);
            for (name, value) in [
                ("destination", &self.inventory_destination),
                ("frequency", &self.inventory_frequency),
                ("format", &self.inventory_format),
            ] {
                if let Some(value) = value {
                    request = request.with_param(name, value.as_str());
                }
            }
            requests.push(request);
        }

        if let Some(destination) = &self.storage_class_analysis_destination {
            let mut request = OperationRequest::new(STORAGE_CLASS_ANALYSIS)
                .with_param("destination", destination.as_str());
            if let Some(prefix) = &self.storage_class_analysis_prefix {
                request = request.with_param("prefix", prefix.as_str());
            }
            requests.push(request);
        }

        if self.block_public_access {
            requests.push(OperationRequest::new(PUBLIC_ACCESS_BLOCK));
        }
        if self.secure_transport_policy {
            requests.push(OperationRequest::new(SECURE_TRANSPORT_POLICY));
        }
        if let Some(ownership) = &self.object_ownership {
            requests.push(OperationRequest::new(OBJECT_OWNERSHIP).with_param("ownership", ownership.as_str()));
        }
        if self.private_acl {
            requests.push(OperationRequest::new(PRIVATE_ACL));
        }
        if self.cors {
            let mut request = OperationRequest::new(CORS_RULE);
            if !self.cors_allowed_methods.is_empty() {
                request = request.with_param("allowed-methods", self.cors_allowed_methods.clone());
            }
            if !self.cors_allowed_origins.is_empty() {
                request = request.with_param("allowed-origins", self.cors_allowed_origins.clone());
            }
            requests.push(request);
        }

        requests.extend(self.operations.iter().cloned());
        requests
    }
}

impl CLIArgs {
    fn validate(&self) -> Result<(), String> {
        if self.aws_max_attempts == 0 {
            return Err(ERROR_MESSAGE_AWS_MAX_ATTEMPTS_ZERO.to_string());
        }
        Ok(())
    }

    fn build_client_config(&self) -> ClientConfig {
        let credential = if let Some(ref profile) = self.profile {
            S3Credentials::Profile(profile.clone())
        } else if let Some(ref access_key) = self.access_key {
            S3Credentials::Credentials {
                access_keys: AccessKeys {
                    access_key: access_key.clone(),
                    secret_access_key: self.secret_access_key.clone().unwrap_or_default(),
                    session_token: self.session_token.clone(),
                },
            }
        } else {
            S3Credentials::FromEnvironment
        };

        ClientConfig {
            client_config_location: ClientConfigLocation {
                aws_config_file: self.aws_config_file.clone(),
                aws_shared_credentials_file: self.aws_shared_credentials_file.clone(),
            },
            credential,
            region: Some(self.region.clone()),
            endpoint_url: self.endpoint_url.clone(),
            force_path_style: self.force_path_style,
            accelerate: self.use_accelerate_endpoint,
            retry_config: RetryConfig {
                aws_max_attempts: self.aws_max_attempts,
                initial_backoff_milliseconds: self.initial_backoff_milliseconds,
            },
            cli_timeout_config: CLITimeoutConfig {
                operation_timeout_milliseconds: self.operation_timeout_milliseconds,
                operation_attempt_timeout_milliseconds: self.operation_attempt_timeout_milliseconds,
                connect_timeout_milliseconds: self.connect_timeout_milliseconds,
                read_timeout_milliseconds: self.read_timeout_milliseconds,
            },
            disable_stalled_stream_protection: self.disable_stalled_stream_protection,
            request_checksum_calculation: RequestChecksumCalculation::WhenRequired,
        }
    }

    fn build_tracing_config(&self) -> Option<TracingConfig> {
        let log_level = self.verbosity.log_level()?;

        Some(TracingConfig {
            tracing_level: log_level,
            json_tracing: self.json_tracing,
            aws_sdk_tracing: self.aws_sdk_tracing,
            span_events_tracing: self.span_events_tracing,
            disable_color_tracing: self.disable_color_tracing,
        })
    }

    fn build_command(&self) -> Result<Command, String> {
        let target = |bucket: &str| ResourceRef::new(bucket, self.region.as_str());

        match &self.command {
            Some(CLICommand::Apply(apply)) => {
                let requests = apply.build_requests();
                if requests.is_empty() && !apply.interactive {
                    return Err(ERROR_MESSAGE_NO_OPERATION.to_string());
                }
                Ok(Command::Apply(ApplyConfig {
                    target: target(&apply.bucket),
                    requests,
                    interactive: apply.interactive,
                    dry_run: apply.dry_run,
                }))
            }
            Some(CLICommand::List(list)) => {
                let strip_prefixes = if list.strip_prefixes.is_empty() {
                    DEFAULT_STRIP_PREFIXES.iter().map(|p| p.to_string()).collect()
                } else {
                    list.strip_prefixes.clone()
                };
                Ok(Command::List(ListConfig {
                    target: target(&list.bucket),
                    options: ListingOptions {
                        extension: list.extension.clone(),
                        strip_prefixes,
                    },
                    force: list.force,
                }))
            }
            Some(CLICommand::Create(create)) => Ok(Command::Create {
                target: target(&create.bucket),
            }),
            Some(CLICommand::Operations) => Ok(Command::Operations),
            None => Err(ERROR_MESSAGE_COMMAND_REQUIRED.to_string()),
        }
    }
}

impl TryFrom<CLIArgs> for Config {
    type Error = String;

    fn try_from(args: CLIArgs) -> Result<Self, Self::Error> {
        args.validate()?;

        // Completion generation needs no command.
        let command = match (&args.command, args.auto_complete_shell) {
            (None, Some(_)) => Command::Operations,
            _ => args.build_command()?,
        };

        Ok(Config {
            command,
            client_config: args.build_client_config(),
            tracing_config: args.build_tracing_config(),
            auto_complete_shell: args.auto_complete_shell,
        })
    }
}
