// Property-based tests for the s3conf-rs library API.
//
// Listing: filtered, folder-free, most recent first.
// Bucket names: generated valid names pass, any uppercase letter fails.
// Apply: one outcome per request, in submission order; dry-run never mutates.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::applier::ConfigurationApplier;
    use crate::catalog::OperationRequest;
    use crate::catalog::management::LIFECYCLE_POLICY;
    use crate::catalog::permissions::{PRIVATE_ACL, PUBLIC_ACCESS_BLOCK};
    use crate::catalog::properties::{ENCRYPTION, VERSIONING_ENABLE};
    use crate::lister::{ListingOptions, prepare_listing};
    use crate::test_utils::{MockProvider, ProviderCall, make_remote_object};
    use crate::types::token::create_run_cancellation_token;
    use crate::types::{OutcomeStatus, ResourceRef, SkipReason};
    use crate::validator::validate_bucket_name;

    const EXTENSIONS: &[&str] = &[".csv", ".jpg", ".log", ""];
    const OPERATIONS: &[&str] = &[
        VERSIONING_ENABLE,
        ENCRYPTION,
        LIFECYCLE_POLICY,
        PUBLIC_ACCESS_BLOCK,
        PRIVATE_ACL,
        "teleport",
    ];

    fn object_key() -> impl Strategy<Value = String> {
        (
            prop::sample::select(vec!["", "Home/", "Home/users/", "data/"]),
            "[a-z]{1,8}",
            prop::sample::select(EXTENSIONS.to_vec()),
            prop::bool::weighted(0.1),
        )
            .prop_map(|(prefix, stem, extension, folder)| {
                if folder {
                    format!("{prefix}{stem}/")
                } else {
                    format!("{prefix}{stem}{extension}")
                }
            })
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_listing_is_filtered_and_newest_first(
            entries in prop::collection::vec((object_key(), 0i64..10_000_000, 0i64..2_000_000_000), 0..40),
            extension in prop::option::of(prop::sample::select(vec![".csv", ".jpg"])),
        ) {
            let objects: Vec<_> = entries
                .iter()
                .map(|(key, size, secs)| make_remote_object(key, *size, *secs))
                .collect();
            let expected = entries
                .iter()
                .filter(|(key, _, _)| !key.ends_with('/'))
                .filter(|(key, _, _)| extension.is_none_or(|ext| key.ends_with(ext)))
                .count();
            let options = ListingOptions {
                extension: extension.map(str::to_string),
                ..ListingOptions::default()
            };

            let listed = prepare_listing(objects, &options);

            prop_assert_eq!(listed.len(), expected);
            for pair in listed.windows(2) {
                prop_assert!(pair[0].last_modified >= pair[1].last_modified);
            }
            for object in &listed {
                prop_assert!(!object.name.starts_with("Home/"));
                if let Some(ext) = extension {
                    prop_assert!(object.name.ends_with(ext));
                }
                prop_assert!(object.size_kb >= 0.0);
            }
        }

        #[test]
        fn prop_generated_bucket_names_are_valid(name in "[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]") {
            prop_assume!(!name.contains(".."));
            prop_assume!(!name.contains(".-") && !name.contains("-."));
            prop_assume!(name.parse::<std::net::Ipv4Addr>().is_err());
            prop_assume!(!["xn--", "sthree-", "amzn-s3-demo-"].iter().any(|p| name.starts_with(p)));
            prop_assume!(![ "-s3alias", "--ol-s3", ".mrap", "--x-s3", "--table-s3"].iter().any(|s| name.ends_with(s)));

            prop_assert!(validate_bucket_name(&name).is_ok());
        }

        #[test]
        fn prop_uppercase_bucket_names_are_invalid(
            head in "[a-z0-9]{1,20}",
            upper in "[A-Z]",
            tail in "[a-z0-9]{1,20}",
        ) {
            let name = format!("{head}{upper}{tail}");
            prop_assert!(validate_bucket_name(&name).is_err());
        }

        #[test]
        fn prop_one_outcome_per_request_in_order(
            picks in prop::collection::vec(prop::sample::select(OPERATIONS.to_vec()), 0..12),
            dry_run in any::<bool>(),
        ) {
            let provider = MockProvider::new().with_buckets(&["my-data-bucket"]);
            let applier = ConfigurationApplier::with_provider(Box::new(provider.clone()))
                .dry_run(dry_run);
            let requests: Vec<_> = picks.iter().map(|op| OperationRequest::new(*op)).collect();

            let report = runtime()
                .block_on(applier.apply(
                    &ResourceRef::new("my-data-bucket", "eu-west-2"),
                    requests,
                    &create_run_cancellation_token(),
                ))
                .unwrap();

            prop_assert_eq!(report.len(), picks.len());
            for (outcome, op) in report.outcomes().iter().zip(&picks) {
                prop_assert_eq!(outcome.operation.as_str(), *op);
                if *op == "teleport" {
                    prop_assert!(outcome.is_failed());
                } else if dry_run {
                    prop_assert_eq!(&outcome.status, &OutcomeStatus::Skipped(SkipReason::DryRun));
                } else {
                    prop_assert!(outcome.is_applied());
                }
            }
            if dry_run {
                prop_assert!(!provider.calls().iter().any(ProviderCall::is_mutation));
            }
        }
    }
}
