//! Registry of the bucket configuration operations s3conf knows how to apply.
//!
//! Each operation is a static [`OperationSpec`]: its name, its declared
//! parameters and a pure builder that turns validated parameters into a
//! [`ProviderRequest`]. Operations are grouped the way the S3 console groups
//! them: properties, management, metrics and permissions.

use std::collections::HashSet;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;

use crate::types::ResourceRef;
use crate::types::error::SpecError;

#[cfg(test)]
mod catalog_properties;
pub mod management;
pub mod metrics;
pub mod params;
pub mod permissions;
pub mod properties;
pub mod request;

pub use params::{OperationRequest, ParamKind, ParamSpec, ParamValue, Params};
pub use request::ProviderRequest;

/// Builds a provider request from validated parameters. Must not perform I/O.
pub type RequestBuilder = fn(&BuildContext<'_>, &Params) -> Result<ProviderRequest, SpecError>;

static GLOBAL_CATALOG: Lazy<Arc<SettingsCatalog>> =
    Lazy::new(|| Arc::new(SettingsCatalog::standard()));

/// Static description of one configuration operation.
#[derive(Clone, Copy)]
pub struct OperationSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    /// Parameter naming another bucket the operation depends on. When it is
    /// supplied and differs from the target, that bucket must exist.
    pub secondary_resource: Option<&'static str>,
    /// Source and destination buckets must be versioned.
    pub requires_versioning: bool,
    pub builder: RequestBuilder,
}

impl Debug for OperationSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("secondary_resource", &self.secondary_resource)
            .field("requires_versioning", &self.requires_versioning)
            .finish()
    }
}

impl OperationSpec {
    pub fn required_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|param| param.required)
    }

    /// The secondary bucket named in `params`, if the operation has one and
    /// the caller supplied it.
    pub fn secondary_bucket<'a>(&self, params: &'a Params) -> Option<&'a str> {
        self.secondary_resource.and_then(|name| params.str(name))
    }
}

/// Per-run state the builders may consult.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub target: &'a ResourceRef,
    pub versioned_buckets: &'a HashSet<String>,
}

impl<'a> BuildContext<'a> {
    pub fn new(target: &'a ResourceRef, versioned_buckets: &'a HashSet<String>) -> Self {
        Self {
            target,
            versioned_buckets,
        }
    }

    pub fn is_versioned(&self, bucket: &str) -> bool {
        self.versioned_buckets.contains(bucket)
    }
}

/// A request that passed every catalog check.
#[derive(Debug, Clone)]
pub struct ResolvedOperation {
    pub spec: OperationSpec,
    pub params: Params,
    pub request: ProviderRequest,
}

impl ResolvedOperation {
    /// Secondary bucket to validate before sending, when it is not the target.
    pub fn secondary_bucket(&self, target: &ResourceRef) -> Option<&str> {
        self.spec
            .secondary_bucket(&self.params)
            .filter(|bucket| *bucket != target.name())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsCatalog {
    specs: Vec<OperationSpec>,
}

impl SettingsCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog with every built-in operation, in console order.
    pub fn standard() -> Self {
        let specs = properties::SPECS
            .iter()
            .chain(management::SPECS)
            .chain(metrics::SPECS)
            .chain(permissions::SPECS)
            .copied()
            .collect();
        Self { specs }
    }

    /// Process-wide standard catalog, created once.
    pub fn global() -> Arc<SettingsCatalog> {
        GLOBAL_CATALOG.clone()
    }

    pub fn register(&mut self, spec: OperationSpec) -> Result<()> {
        if self.lookup(spec.name).is_some() {
            return Err(anyhow!("operation '{}' is already registered", spec.name));
        }
        self.specs.push(spec);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&OperationSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &OperationSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn requires_versioning(&self, operation: &str) -> bool {
        self.lookup(operation)
            .is_some_and(|spec| spec.requires_versioning)
    }

    pub fn build(
        &self,
        ctx: &BuildContext<'_>,
        request: &OperationRequest,
    ) -> Result<ProviderRequest, SpecError> {
        self.resolve(ctx, request).map(|resolved| resolved.request)
    }

    /// Check `request` and build its provider request.
    ///
    /// Checks run in a fixed order: operation name, then for operations
    /// that need versioning the secondary bucket and the versioning
    /// precondition, then required parameters, parameter kinds and the
    /// builder itself.
    pub fn resolve(
        &self,
        ctx: &BuildContext<'_>,
        request: &OperationRequest,
    ) -> Result<ResolvedOperation, SpecError> {
        let spec = self
            .lookup(&request.operation)
            .ok_or_else(|| SpecError::UnknownOperation(request.operation.clone()))?;

        if spec.requires_versioning {
            let secondary =
                Params::validate_only(spec.params, request, spec.secondary_resource.as_slice())?;
            check_versioning(spec, ctx, &secondary)?;
        }

        let params = Params::validate(spec.params, request)?;

        let provider_request = (spec.builder)(ctx, &params)?;

        Ok(ResolvedOperation {
            spec: *spec,
            params,
            request: provider_request,
        })
    }
}

fn check_versioning(
    spec: &OperationSpec,
    ctx: &BuildContext<'_>,
    params: &Params,
) -> Result<(), SpecError> {
    let source = ctx.target.name();
    let destination = spec.secondary_bucket(params).unwrap_or(source);

    let mut unversioned: Vec<&str> = [source, destination]
        .into_iter()
        .filter(|bucket| !ctx.is_versioned(bucket))
        .collect();
    unversioned.dedup();
    if unversioned.is_empty() {
        return Ok(());
    }

    Err(SpecError::PreconditionUnmet(format!(
        "{} requires versioning enabled on {}",
        spec.name,
        unversioned
            .iter()
            .map(|bucket| format!("'{bucket}'"))
            .collect::<Vec<_>>()
            .join(" and ")
    )))
}

/// Parse a positive day count or similar small integer parameter.
pub(crate) fn positive_i32(params: &Params, name: &str, default: i32) -> Result<i32, SpecError> {
    let Some(value) = params.int(name) else {
        return Ok(default);
    };
    match i32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(SpecError::InvalidParameter {
            field: name.to_string(),
            reason: format!("must be a positive number, got {value}"),
        }),
    }
}
