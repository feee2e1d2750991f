//! Property-based tests for operation request building.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use crate::catalog::params::{ParamKind, ParamValue};
    use crate::catalog::{BuildContext, OperationRequest, ProviderRequest, SettingsCatalog};
    use crate::types::ResourceRef;
    use crate::types::error::SpecError;

    const TARGET: &str = "my-data-bucket";

    fn bucket_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{2,20}[a-z0-9]".prop_filter("must differ from the target", |name| {
            name != TARGET
        })
    }

    /// A value of the declared kind that every builder accepts.
    fn valid_value(name: &str, kind: ParamKind, bucket: &str, account_id: &str) -> ParamValue {
        match kind {
            ParamKind::String if name == "account-id" => ParamValue::from(account_id),
            ParamKind::String => ParamValue::from(bucket),
            ParamKind::Integer => ParamValue::from(1),
            ParamKind::Boolean => ParamValue::from(true),
            ParamKind::Enum(allowed) => ParamValue::from(allowed[0]),
            ParamKind::StringList => ParamValue::from(vec!["GET"]),
        }
    }

    fn required_only_request(
        catalog: &SettingsCatalog,
        operation: &str,
        bucket: &str,
        account_id: &str,
    ) -> OperationRequest {
        let spec = catalog.lookup(operation).unwrap();
        spec.required_params()
            .fold(OperationRequest::new(operation), |request, param| {
                request.with_param(
                    param.name,
                    valid_value(param.name, param.kind, bucket, account_id),
                )
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn required_parameters_are_sufficient(
            index in 0usize..14,
            bucket in bucket_name(),
            account_id in "[0-9]{12}",
        ) {
            // Every operation builds once its required parameters are present
            // and every bucket involved is versioned.
            let catalog = SettingsCatalog::standard();
            let operation = catalog.operations().nth(index % catalog.len()).unwrap().name;
            let request = required_only_request(&catalog, operation, &bucket, &account_id);

            let target = ResourceRef::new(TARGET, "eu-west-2");
            let versioned: HashSet<String> = [TARGET.to_string(), bucket.clone()].into();
            let result = catalog.build(&BuildContext::new(&target, &versioned), &request);

            prop_assert!(result.is_ok(), "{operation} failed: {result:?}");
            let built = result.unwrap();
            prop_assert_eq!(built.bucket(), TARGET);

            // Required values reach the payload unmodified.
            match &built {
                ProviderRequest::PutLogging { target_bucket, .. } => {
                    prop_assert_eq!(target_bucket, &bucket);
                }
                ProviderRequest::PutReplication { role_arn, rule, .. } => {
                    prop_assert_eq!(&rule.destination_bucket, &bucket);
                    prop_assert_eq!(role_arn.split(':').nth(4), Some(account_id.as_str()));
                }
                ProviderRequest::PutAnalytics { analytics, .. } => {
                    prop_assert_eq!(&analytics.destination_bucket, &bucket);
                }
                other => {
                    let spec = catalog.lookup(operation).unwrap();
                    prop_assert!(
                        spec.required_params().next().is_none(),
                        "{operation} has required parameters but built {other:?}"
                    );
                }
            }
        }

        #[test]
        fn dropping_a_required_parameter_is_reported(
            index in 0usize..14,
            bucket in bucket_name(),
            account_id in "[0-9]{12}",
        ) {
            let catalog = SettingsCatalog::standard();
            let spec = *catalog.operations().nth(index % catalog.len()).unwrap();
            let Some(first_required) = spec.required_params().next() else {
                return Ok(());
            };

            let mut request = required_only_request(&catalog, spec.name, &bucket, &account_id);
            request.params.remove(first_required.name);

            let target = ResourceRef::new(TARGET, "eu-west-2");
            let versioned = HashSet::new();
            prop_assert_eq!(
                catalog.build(&BuildContext::new(&target, &versioned), &request),
                Err(SpecError::MissingParameter(first_required.name.to_string()))
            );
        }

        #[test]
        fn unregistered_names_are_unknown(name in "[a-z]{1,12}(-[a-z]{1,12})?") {
            let catalog = SettingsCatalog::standard();
            prop_assume!(catalog.lookup(&name).is_none());

            let target = ResourceRef::new(TARGET, "eu-west-2");
            let versioned = HashSet::new();
            prop_assert_eq!(
                catalog.build(&BuildContext::new(&target, &versioned), &OperationRequest::new(name.clone())),
                Err(SpecError::UnknownOperation(name))
            );
        }

        #[test]
        fn replication_needs_both_buckets_versioned(
            bucket in bucket_name(),
            source_versioned in proptest::bool::ANY,
            destination_versioned in proptest::bool::ANY,
        ) {
            let catalog = SettingsCatalog::standard();
            let request = OperationRequest::new("replication-rule")
                .with_param("destination", bucket.clone())
                .with_param("account-id", "123456789012");

            let mut versioned = HashSet::new();
            if source_versioned {
                versioned.insert(TARGET.to_string());
            }
            if destination_versioned {
                versioned.insert(bucket.clone());
            }

            let target = ResourceRef::new(TARGET, "eu-west-2");
            let result = catalog.build(&BuildContext::new(&target, &versioned), &request);
            if source_versioned && destination_versioned {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(matches!(result, Err(SpecError::PreconditionUnmet(_))));
            }
        }
    }
}
