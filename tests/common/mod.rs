//! Shared test infrastructure for s3conf-rs integration and E2E tests.
//!
//! `MemoryProvider` is an in-memory `ProviderClient` for the integration
//! tests. `TestHelper` manages real buckets for the E2E tests, using the
//! `s3conf-e2e-test` AWS profile.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use chrono::{TimeZone, Utc};
use s3conf_rs::catalog::ProviderRequest;
use s3conf_rs::config::Config;
use s3conf_rs::config::args::build_config_from_args;
use s3conf_rs::types::RemoteObject;
use s3conf_rs::{Provider, ProviderClient, ProviderError};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// In-memory provider
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Account {
    /// Bucket name to region.
    buckets: BTreeMap<String, String>,
    versioned: HashSet<String>,
    objects: BTreeMap<String, Vec<RemoteObject>>,
    sent: Vec<ProviderRequest>,
    created: Vec<String>,
}

/// A tiny S3 account held in memory. Clones share the account.
#[derive(Clone, Default)]
pub struct MemoryProvider {
    account: Arc<Mutex<Account>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, bucket: &str, region: &str) -> Self {
        self.account
            .lock()
            .unwrap()
            .buckets
            .insert(bucket.to_string(), region.to_string());
        self
    }

    /// Store an object modified `modified_secs` after the epoch.
    pub fn with_object(self, bucket: &str, key: &str, size: i64, modified_secs: i64) -> Self {
        self.account
            .lock()
            .unwrap()
            .objects
            .entry(bucket.to_string())
            .or_default()
            .push(RemoteObject {
                key: key.to_string(),
                size,
                last_modified: Utc.timestamp_opt(modified_secs, 0).unwrap(),
            });
        self
    }

    pub fn boxed(&self) -> Provider {
        Box::new(self.clone())
    }

    pub fn sent_api_names(&self) -> Vec<&'static str> {
        self.account
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(ProviderRequest::api_name)
            .collect()
    }

    pub fn sent_requests(&self) -> Vec<ProviderRequest> {
        self.account.lock().unwrap().sent.clone()
    }

    pub fn is_versioned(&self, bucket: &str) -> bool {
        self.account.lock().unwrap().versioned.contains(bucket)
    }

    pub fn bucket_region(&self, bucket: &str) -> Option<String> {
        self.account.lock().unwrap().buckets.get(bucket).cloned()
    }

    pub fn created_buckets(&self) -> Vec<String> {
        self.account.lock().unwrap().created.clone()
    }
}

#[async_trait]
impl ProviderClient for MemoryProvider {
    async fn head_bucket(&self, bucket: &str) -> Result<(), ProviderError> {
        if self.account.lock().unwrap().buckets.contains_key(bucket) {
            Ok(())
        } else {
            Err(ProviderError::NotFound {
                code: "NotFound".to_string(),
            })
        }
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), ProviderError> {
        let mut account = self.account.lock().unwrap();
        if account.buckets.contains_key(bucket) {
            return Err(ProviderError::Rejected {
                code: "BucketAlreadyOwnedByYou".to_string(),
                message: format!("{bucket} already exists"),
            });
        }
        account
            .buckets
            .insert(bucket.to_string(), region.to_string());
        account.created.push(bucket.to_string());
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.account.lock().unwrap().buckets.keys().cloned().collect())
    }

    async fn list_common_prefixes(&self, bucket: &str) -> Result<Vec<String>, ProviderError> {
        let account = self.account.lock().unwrap();
        let mut prefixes: Vec<String> = account
            .objects
            .get(bucket)
            .into_iter()
            .flatten()
            .filter_map(|object| object.key.split_once('/'))
            .map(|(directory, _)| format!("{directory}/"))
            .collect();
        prefixes.sort();
        prefixes.dedup();
        Ok(prefixes)
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<RemoteObject>, ProviderError> {
        let account = self.account.lock().unwrap();
        if !account.buckets.contains_key(bucket) {
            return Err(ProviderError::NotFound {
                code: "NoSuchBucket".to_string(),
            });
        }
        Ok(account.objects.get(bucket).cloned().unwrap_or_default())
    }

    async fn send(&self, request: &ProviderRequest) -> Result<(), ProviderError> {
        let mut account = self.account.lock().unwrap();
        if !account.buckets.contains_key(request.bucket()) {
            return Err(ProviderError::NotFound {
                code: "NoSuchBucket".to_string(),
            });
        }
        if let ProviderRequest::PutVersioning { bucket } = request {
            account.versioned.insert(bucket.clone());
        }
        account.sent.push(request.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// E2E helpers (real AWS)
// ---------------------------------------------------------------------------

/// AWS profile used for all E2E tests.
pub const AWS_PROFILE: &str = "s3conf-e2e-test";

/// RAII guard that empties and deletes a bucket when dropped, even if the
/// test panicked.
pub struct BucketGuard {
    helper: Arc<TestHelper>,
    bucket: String,
}

impl Drop for BucketGuard {
    fn drop(&mut self) {
        let helper = self.helper.clone();
        let bucket = self.bucket.clone();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tokio::runtime::Handle::current().block_on(async move {
                helper.delete_bucket_cascade(&bucket).await;
            });
        }));
    }
}

/// Wraps an S3 `Client` built from the E2E profile, for test setup and
/// verification. The code under test builds its own client from a `Config`.
pub struct TestHelper {
    client: Client,
    region: String,
}

impl TestHelper {
    pub async fn new() -> Arc<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(AWS_PROFILE)
            .load()
            .await;
        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "us-east-1".to_string());

        Arc::new(Self {
            client: Client::new(&sdk_config),
            region,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn bucket_guard(self: &Arc<Self>, bucket: &str) -> BucketGuard {
        BucketGuard {
            helper: Arc::clone(self),
            bucket: bucket.to_string(),
        }
    }

    /// A bucket name unique across parallel runs.
    pub fn generate_bucket_name(&self) -> String {
        format!("s3conf-e2e-{}", Uuid::new_v4())
    }

    /// Build a `Config` for `args` (everything after the program name),
    /// using the E2E profile and region.
    pub fn build_config(&self, args: Vec<&str>) -> Config {
        let mut full_args = vec![
            "s3conf",
            "--profile",
            AWS_PROFILE,
            "--region",
            self.region.as_str(),
        ];
        full_args.extend(args);
        build_config_from_args(full_args).unwrap()
    }

    pub async fn create_bucket(&self, bucket: &str) {
        let mut builder = self.client.create_bucket().bucket(bucket);

        if self.region != "us-east-1" {
            let config = CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                .build();
            builder = builder.create_bucket_configuration(config);
        }

        builder
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to create bucket {bucket}: {e}"));
    }

    pub async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to put {key} in {bucket}: {e}"));
    }

    pub async fn is_bucket_exists(&self, bucket: &str) -> bool {
        self.client.head_bucket().bucket(bucket).send().await.is_ok()
    }

    /// `Some("Enabled")`, `Some("Suspended")`, or `None` when never set.
    pub async fn versioning_status(&self, bucket: &str) -> Option<String> {
        self.client
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await
            .unwrap()
            .status()
            .map(|status| status.as_str().to_string())
    }

    pub async fn encryption_algorithm(&self, bucket: &str) -> Option<String> {
        let output = self
            .client
            .get_bucket_encryption()
            .bucket(bucket)
            .send()
            .await
            .ok()?;
        output
            .server_side_encryption_configuration()?
            .rules()
            .first()?
            .apply_server_side_encryption_by_default()
            .map(|default| default.sse_algorithm().as_str().to_string())
    }

    pub async fn is_public_access_blocked(&self, bucket: &str) -> bool {
        let Ok(output) = self
            .client
            .get_public_access_block()
            .bucket(bucket)
            .send()
            .await
        else {
            return false;
        };
        output
            .public_access_block_configuration()
            .is_some_and(|config| {
                config.block_public_acls() == Some(true)
                    && config.ignore_public_acls() == Some(true)
                    && config.block_public_policy() == Some(true)
                    && config.restrict_public_buckets() == Some(true)
            })
    }

    pub async fn object_ownership(&self, bucket: &str) -> Option<String> {
        let output = self
            .client
            .get_bucket_ownership_controls()
            .bucket(bucket)
            .send()
            .await
            .ok()?;
        output
            .ownership_controls()?
            .rules()
            .first()
            .map(|rule| rule.object_ownership().as_str().to_string())
    }

    /// Delete every object version, then the bucket. Errors are ignored.
    pub async fn delete_bucket_cascade(&self, bucket: &str) {
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;

        loop {
            let Ok(output) = self
                .client
                .list_object_versions()
                .bucket(bucket)
                .set_key_marker(key_marker.clone())
                .set_version_id_marker(version_id_marker.clone())
                .send()
                .await
            else {
                break;
            };

            let versions = output
                .versions()
                .iter()
                .map(|v| (v.key(), v.version_id()))
                .chain(
                    output
                        .delete_markers()
                        .iter()
                        .map(|m| (m.key(), m.version_id())),
                );
            for (key, version_id) in versions {
                let _ = self
                    .client
                    .delete_object()
                    .bucket(bucket)
                    .set_key(key.map(str::to_string))
                    .set_version_id(version_id.map(str::to_string))
                    .send()
                    .await;
            }

            if output.is_truncated() != Some(true) {
                break;
            }
            key_marker = output.next_key_marker().map(str::to_string);
            version_id_marker = output.next_version_id_marker().map(str::to_string);
        }

        let _ = self.client.delete_bucket().bucket(bucket).send().await;
    }
}

/// Default timeout for E2E tests.
pub const E2E_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(300);

/// Wraps an async E2E test body with a timeout.
#[macro_export]
macro_rules! e2e_timeout {
    ($body:expr) => {
        tokio::time::timeout(common::E2E_TIMEOUT, $body)
            .await
            .expect("E2E test timed out")
    };
}
