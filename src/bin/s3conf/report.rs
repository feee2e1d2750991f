// Console rendering for the s3conf binary.
//
// Outcome reports, bucket listings and the operation catalog are written to
// stdout. Formatting is kept in pure functions so it can be tested without
// capturing output.

use s3conf_rs::catalog::params::ParamSpec;
use s3conf_rs::lister::format_last_modified;
use s3conf_rs::types::{ListedObject, ListingReport};
use s3conf_rs::{OperationOutcome, OperationSpec, OutcomeReport, SettingsCatalog};

pub fn print_outcomes(report: &OutcomeReport, duration_sec: &str) {
    for outcome in report.outcomes() {
        println!("{}", format_outcome(outcome));
    }
    println!("{}", format_summary(report, duration_sec));
}

pub fn print_bucket_names(buckets: &[String]) {
    if buckets.is_empty() {
        println!("No buckets found in this account.");
        return;
    }

    println!("Available buckets:");
    for bucket in buckets {
        println!("- {bucket}");
    }
}

pub fn print_listing(bucket: &str, listing: &ListingReport) {
    println!("Directories in s3://{bucket}/:");
    if listing.directories.is_empty() {
        println!("  (none)");
    }
    for directory in &listing.directories {
        println!("- {directory}");
    }

    println!("Objects in s3://{bucket}/:");
    if listing.objects.is_empty() {
        println!("  (none)");
    }
    for object in &listing.objects {
        println!("{}", format_object(object));
    }
}

pub fn print_catalog(catalog: &SettingsCatalog) {
    for spec in catalog.operations() {
        print!("{}", format_operation(spec));
    }
}

pub fn format_outcome(outcome: &OperationOutcome) -> String {
    format!(
        "s3://{} {}: {}",
        outcome.bucket, outcome.operation, outcome.status
    )
}

pub fn format_summary(report: &OutcomeReport, duration_sec: &str) -> String {
    format!(
        "{} applied, {} skipped, {} failed ({duration_sec} sec)",
        report.applied_count(),
        report.skipped_count(),
        report.failed_count()
    )
}

pub fn format_object(object: &ListedObject) -> String {
    format!(
        "- {} | {:.2} KB | Last Modified: {}",
        object.name,
        object.size_kb,
        format_last_modified(&object.last_modified)
    )
}

pub fn format_operation(spec: &OperationSpec) -> String {
    let mut text = format!("{}\n    {}\n", spec.name, spec.description);
    if spec.requires_versioning {
        text.push_str("    requires versioning on source and destination\n");
    }
    for param in spec.params {
        text.push_str(&format_param(param));
    }
    text
}

fn format_param(param: &ParamSpec) -> String {
    let required = if param.required { ", required" } else { "" };
    format!(
        "    {} ({}{required}): {}\n",
        param.name, param.kind, param.description
    )
}
