pub mod args;

use aws_smithy_types::checksum_config::RequestChecksumCalculation;

use crate::catalog::OperationRequest;
use crate::lister::ListingOptions;
use crate::types::{ClientConfigLocation, ResourceRef, S3Credentials};

pub const DEFAULT_REGION: &str = "eu-west-2";

/// Everything one `s3conf` invocation needs.
///
/// Built from command-line arguments with
/// [`Config::try_from`](TryFrom::try_from) (see [`args`]), or directly when
/// s3conf is used as a library.
///
/// ```
/// use s3conf_rs::config::{Command, Config};
///
/// let config = Config::for_command(Command::Operations);
/// assert_eq!(config.client_config.region.as_deref(), Some("eu-west-2"));
/// assert!(config.tracing_config.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub command: Command,
    pub client_config: ClientConfig,
    pub tracing_config: Option<TracingConfig>,
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

impl Config {
    /// `command` with the default client configuration.
    pub fn for_command(command: Command) -> Self {
        Self {
            command,
            client_config: ClientConfig::default(),
            tracing_config: None,
            auto_complete_shell: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Apply(ApplyConfig),
    List(ListConfig),
    Create { target: ResourceRef },
    Operations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyConfig {
    pub target: ResourceRef,
    /// Requests given as flags, in flag group order.
    pub requests: Vec<OperationRequest>,
    /// Ask for further operations on the terminal before applying.
    pub interactive: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListConfig {
    pub target: ResourceRef,
    pub options: ListingOptions,
    /// Do not ask for confirmation when the bucket is not owned by the caller.
    pub force: bool,
}

/// AWS S3 client configuration.
///
/// Credential loading, region, endpoint, retry and timeout settings used to
/// build the `aws_sdk_s3::Client` behind the provider.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_config_location: ClientConfigLocation,
    pub credential: S3Credentials,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    /// Send requests through the Transfer Acceleration endpoint.
    pub accelerate: bool,
    pub retry_config: RetryConfig,
    pub cli_timeout_config: CLITimeoutConfig,
    pub disable_stalled_stream_protection: bool,
    pub request_checksum_calculation: RequestChecksumCalculation,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_config_location: ClientConfigLocation {
                aws_config_file: None,
                aws_shared_credentials_file: None,
            },
            credential: S3Credentials::FromEnvironment,
            region: Some(DEFAULT_REGION.to_string()),
            endpoint_url: None,
            force_path_style: false,
            accelerate: false,
            retry_config: RetryConfig::default(),
            cli_timeout_config: CLITimeoutConfig::default(),
            disable_stalled_stream_protection: false,
            request_checksum_calculation: RequestChecksumCalculation::WhenRequired,
        }
    }
}

/// Retry configuration for AWS SDK operations (standard mode, exponential
/// backoff).
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub aws_max_attempts: u32,
    pub initial_backoff_milliseconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            aws_max_attempts: 10,
            initial_backoff_milliseconds: 100,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CLITimeoutConfig {
    pub operation_timeout_milliseconds: Option<u64>,
    pub operation_attempt_timeout_milliseconds: Option<u64>,
    pub connect_timeout_milliseconds: Option<u64>,
    pub read_timeout_milliseconds: Option<u64>,
}

/// Tracing (logging) configuration: verbosity level, JSON format, colour
/// control and AWS SDK tracing.
#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub aws_sdk_tracing: bool,
    pub span_events_tracing: bool,
    pub disable_color_tracing: bool,
}
