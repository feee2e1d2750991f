use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::provider::Provider;
use crate::types::{ListedObject, ListingReport, RemoteObject, ResourceRef};

pub const DEFAULT_STRIP_PREFIXES: &[&str] = &["Home/users/", "Home/"];
pub const LAST_MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BYTES_PER_KB: f64 = 1024.0;

/// How objects are filtered and displayed by [`ContentLister::list`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListingOptions {
    /// Keep only keys ending with this suffix (e.g. `.csv`).
    pub extension: Option<String>,
    /// Tried in order; the first prefix a key starts with is removed.
    pub strip_prefixes: Vec<String>,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            extension: None,
            strip_prefixes: DEFAULT_STRIP_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Read-only listing of buckets and bucket contents.
///
/// The directory listing and the object listing of one bucket are
/// independent, so they are issued concurrently.
pub struct ContentLister {
    provider: Provider,
}

impl ContentLister {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }

    pub async fn list_bucket_names(&self) -> Result<Vec<String>> {
        let buckets = self
            .provider
            .list_buckets()
            .await
            .context("failed to list buckets")?;
        debug!(count = buckets.len(), "buckets listed.");
        Ok(buckets)
    }

    pub async fn list(
        &self,
        resource: &ResourceRef,
        options: &ListingOptions,
    ) -> Result<ListingReport> {
        let bucket = resource.name();
        debug!(bucket = bucket, "listing bucket contents has started.");

        let (prefixes, objects) = tokio::join!(
            self.provider.list_common_prefixes(bucket),
            self.provider.list_objects(bucket)
        );
        let prefixes =
            prefixes.with_context(|| format!("failed to list directories in {resource}"))?;
        let objects = objects.with_context(|| format!("failed to list objects in {resource}"))?;

        let report = ListingReport {
            directories: prefixes
                .into_iter()
                .map(|prefix| prefix.trim_end_matches('/').to_string())
                .collect(),
            objects: prepare_listing(objects, options),
        };

        debug!(
            bucket = bucket,
            directories = report.directories.len(),
            objects = report.objects.len(),
            "listing bucket contents has been completed."
        );
        Ok(report)
    }
}

/// Filter, sort (most recently modified first) and clean up raw objects.
///
/// Keys ending in `/` are folder placeholders and are dropped.
pub fn prepare_listing(objects: Vec<RemoteObject>, options: &ListingOptions) -> Vec<ListedObject> {
    let mut objects: Vec<RemoteObject> = objects
        .into_iter()
        .filter(|object| !object.key.ends_with('/'))
        .filter(|object| {
            options
                .extension
                .as_deref()
                .is_none_or(|extension| object.key.ends_with(extension))
        })
        .collect();
    objects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));

    objects
        .into_iter()
        .map(|object| ListedObject {
            name: strip_home_prefix(&object.key, &options.strip_prefixes).to_string(),
            size_kb: size_in_kb(object.size),
            last_modified: object.last_modified,
        })
        .collect()
}

fn strip_home_prefix<'a>(key: &'a str, prefixes: &[String]) -> &'a str {
    prefixes
        .iter()
        .find_map(|prefix| key.strip_prefix(prefix.as_str()))
        .unwrap_or(key)
}

fn size_in_kb(size: i64) -> f64 {
    (size as f64 / BYTES_PER_KB * 100.0).round() / 100.0
}

pub fn format_last_modified(last_modified: &DateTime<Utc>) -> String {
    last_modified.format(LAST_MODIFIED_FORMAT).to_string()
}
