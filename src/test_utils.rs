//! Shared test utilities for the s3conf library crate.
//!
//! Provides the tracing helper and an in-memory [`MockProvider`] used by the
//! validator, applier, lister and provisioner tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::catalog::ProviderRequest;
use crate::provider::{ProviderClient, ProviderError};
use crate::types::RemoteObject;
use crate::types::token::RunCancellationToken;

/// Initialise a dummy tracing subscriber for tests.
///
/// Uses `try_init` so that only the first call in a process actually
/// installs the subscriber; subsequent calls are silently ignored.
pub(crate) fn init_dummy_tracing_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dummy=trace")
        .try_init();
}

/// Build a [`RemoteObject`] modified at the given unix timestamp.
pub(crate) fn make_remote_object(key: &str, size: i64, modified_secs: i64) -> RemoteObject {
    RemoteObject {
        key: key.to_string(),
        size,
        last_modified: timestamp(modified_secs),
    }
}

pub(crate) fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// A call recorded by [`MockProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProviderCall {
    HeadBucket(String),
    CreateBucket { bucket: String, region: String },
    ListBuckets,
    ListCommonPrefixes(String),
    ListObjects(String),
    Send(ProviderRequest),
}

impl ProviderCall {
    pub(crate) fn is_mutation(&self) -> bool {
        matches!(
            self,
            ProviderCall::Send(_) | ProviderCall::CreateBucket { .. }
        )
    }
}

#[derive(Default)]
struct MockState {
    buckets: HashSet<String>,
    head_failures: HashMap<String, ProviderError>,
    /// Failures for `send`, keyed by S3 API name.
    send_failures: HashMap<String, ProviderError>,
    objects: HashMap<String, Vec<RemoteObject>>,
    prefixes: HashMap<String, Vec<String>>,
    calls: Vec<ProviderCall>,
    cancel_on_send: Option<RunCancellationToken>,
    /// Buckets deleted once a request for them has been sent.
    delete_after_send: HashSet<String>,
}

/// In-memory provider. Clones share state, so a test can keep one handle
/// while the code under test owns another.
#[derive(Clone, Default)]
pub(crate) struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_buckets(self, buckets: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .buckets
            .extend(buckets.iter().map(|b| b.to_string()));
        self
    }

    pub(crate) fn with_head_failure(self, bucket: &str, error: ProviderError) -> Self {
        self.state
            .lock()
            .unwrap()
            .head_failures
            .insert(bucket.to_string(), error);
        self
    }

    pub(crate) fn with_send_failure(self, api_name: &str, error: ProviderError) -> Self {
        self.state
            .lock()
            .unwrap()
            .send_failures
            .insert(api_name.to_string(), error);
        self
    }

    pub(crate) fn with_objects(self, bucket: &str, objects: Vec<RemoteObject>) -> Self {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(bucket.to_string(), objects);
        self
    }

    pub(crate) fn with_prefixes(self, bucket: &str, prefixes: &[&str]) -> Self {
        self.state.lock().unwrap().prefixes.insert(
            bucket.to_string(),
            prefixes.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    /// Cancel `token` as soon as the first request is sent.
    pub(crate) fn with_cancel_on_send(self, token: RunCancellationToken) -> Self {
        self.state.lock().unwrap().cancel_on_send = Some(token);
        self
    }

    /// Delete `bucket` right after the first request for it succeeds.
    pub(crate) fn with_delete_after_send(self, bucket: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .delete_after_send
            .insert(bucket.to_string());
        self
    }

    pub(crate) fn remove_bucket(&self, bucket: &str) {
        self.state.lock().unwrap().buckets.remove(bucket);
    }

    pub(crate) fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn sent_requests(&self) -> Vec<ProviderRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Send(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ProviderCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    async fn head_bucket(&self, bucket: &str) -> Result<(), ProviderError> {
        self.record(ProviderCall::HeadBucket(bucket.to_string()));

        let state = self.state.lock().unwrap();
        if let Some(error) = state.head_failures.get(bucket) {
            return Err(error.clone());
        }
        if state.buckets.contains(bucket) {
            Ok(())
        } else {
            Err(ProviderError::NotFound {
                code: "NotFound".to_string(),
            })
        }
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), ProviderError> {
        self.record(ProviderCall::CreateBucket {
            bucket: bucket.to_string(),
            region: region.to_string(),
        });

        let mut state = self.state.lock().unwrap();
        if !state.buckets.insert(bucket.to_string()) {
            return Err(ProviderError::Rejected {
                code: "BucketAlreadyOwnedByYou".to_string(),
                message: "bucket already exists".to_string(),
            });
        }
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<String>, ProviderError> {
        self.record(ProviderCall::ListBuckets);

        let mut buckets: Vec<String> = self.state.lock().unwrap().buckets.iter().cloned().collect();
        buckets.sort();
        Ok(buckets)
    }

    async fn list_common_prefixes(&self, bucket: &str) -> Result<Vec<String>, ProviderError> {
        self.record(ProviderCall::ListCommonPrefixes(bucket.to_string()));

        Ok(self
            .state
            .lock()
            .unwrap()
            .prefixes
            .get(bucket)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<RemoteObject>, ProviderError> {
        self.record(ProviderCall::ListObjects(bucket.to_string()));

        Ok(self
            .state
            .lock()
            .unwrap()
            .objects
            .get(bucket)
            .cloned()
            .unwrap_or_default())
    }

    async fn send(&self, request: &ProviderRequest) -> Result<(), ProviderError> {
        self.record(ProviderCall::Send(request.clone()));

        let mut state = self.state.lock().unwrap();
        if let Some(token) = &state.cancel_on_send {
            token.cancel();
        }
        if let Some(error) = state.send_failures.get(request.api_name()) {
            return Err(error.clone());
        }
        if !state.buckets.contains(request.bucket()) {
            return Err(ProviderError::NotFound {
                code: "NoSuchBucket".to_string(),
            });
        }
        if state.delete_after_send.remove(request.bucket()) {
            state.buckets.remove(request.bucket());
        }
        Ok(())
    }
}
