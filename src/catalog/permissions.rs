//! Bucket permissions: public access block, bucket policy, object ownership,
//! ACL and CORS.

use serde_json::json;

use crate::catalog::params::{ParamKind, ParamSpec, Params};
use crate::catalog::request::{CorsRuleSettings, ProviderRequest, PublicAccessBlockFlags, bucket_arn};
use crate::catalog::{BuildContext, OperationSpec, positive_i32};
use crate::types::error::SpecError;

pub const PUBLIC_ACCESS_BLOCK: &str = "public-access-block";
pub const SECURE_TRANSPORT_POLICY: &str = "secure-transport-policy";
pub const OBJECT_OWNERSHIP: &str = "object-ownership";
pub const PRIVATE_ACL: &str = "private-acl";
pub const CORS_RULE: &str = "cors-rule";

const OWNERSHIP_MODES: &[&str] = &[
    "enforced",
    "owner-preferred",
    "writer-preferred",
    "BucketOwnerEnforced",
    "BucketOwnerPreferred",
    "ObjectWriter",
];

pub(super) const SPECS: &[OperationSpec] = &[
    OperationSpec {
        name: PUBLIC_ACCESS_BLOCK,
        description: "Block all public access",
        params: &[
            ParamSpec::optional("block-public-acls", ParamKind::Boolean, "default true"),
            ParamSpec::optional("ignore-public-acls", ParamKind::Boolean, "default true"),
            ParamSpec::optional("block-public-policy", ParamKind::Boolean, "default true"),
            ParamSpec::optional("restrict-public-buckets", ParamKind::Boolean, "default true"),
        ],
        secondary_resource: None,
        requires_versioning: false,
        builder: build_public_access_block,
    },
    OperationSpec {
        name: SECURE_TRANSPORT_POLICY,
        description: "Deny every request not made over TLS",
        params: &[],
        secondary_resource: None,
        requires_versioning: false,
        builder: build_secure_transport_policy,
    },
    OperationSpec {
        name: OBJECT_OWNERSHIP,
        description: "Set object ownership",
        params: &[ParamSpec::optional(
            "ownership",
            ParamKind::Enum(OWNERSHIP_MODES),
            "enforced, owner-preferred or writer-preferred (default enforced)",
        )],
        secondary_resource: None,
        requires_versioning: false,
        builder: build_object_ownership,
    },
    OperationSpec {
        name: PRIVATE_ACL,
        description: "Apply the private canned ACL",
        params: &[],
        secondary_resource: None,
        requires_versioning: false,
        builder: build_private_acl,
    },
    OperationSpec {
        name: CORS_RULE,
        description: "Allow cross-origin requests",
        params: &[
            ParamSpec::optional("allowed-methods", ParamKind::StringList, "default GET"),
            ParamSpec::optional("allowed-origins", ParamKind::StringList, "default *"),
            ParamSpec::optional("allowed-headers", ParamKind::StringList, "default *"),
            ParamSpec::optional(
                "max-age-seconds",
                ParamKind::Integer,
                "preflight cache duration",
            ),
        ],
        secondary_resource: None,
        requires_versioning: false,
        builder: build_cors,
    },
];

fn build_public_access_block(
    ctx: &BuildContext<'_>,
    params: &Params,
) -> Result<ProviderRequest, SpecError> {
    Ok(ProviderRequest::PutPublicAccessBlock {
        bucket: ctx.target.name().to_string(),
        flags: PublicAccessBlockFlags {
            block_public_acls: params.bool_or("block-public-acls", true),
            ignore_public_acls: params.bool_or("ignore-public-acls", true),
            block_public_policy: params.bool_or("block-public-policy", true),
            restrict_public_buckets: params.bool_or("restrict-public-buckets", true),
        },
    })
}

fn build_secure_transport_policy(
    ctx: &BuildContext<'_>,
    _params: &Params,
) -> Result<ProviderRequest, SpecError> {
    let arn = bucket_arn(ctx.target.name());
    let policy = json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Deny",
                "Principal": "*",
                "Action": "s3:*",
                "Resource": [arn, format!("{arn}/*")],
                "Condition": {
                    "Bool": { "aws:SecureTransport": "false" }
                }
            }
        ]
    });

    Ok(ProviderRequest::PutPolicy {
        bucket: ctx.target.name().to_string(),
        policy: policy.to_string(),
    })
}

fn build_object_ownership(
    ctx: &BuildContext<'_>,
    params: &Params,
) -> Result<ProviderRequest, SpecError> {
    let ownership = match params.str_or("ownership", "enforced") {
        "owner-preferred" | "BucketOwnerPreferred" => "BucketOwnerPreferred",
        "writer-preferred" | "ObjectWriter" => "ObjectWriter",
        _ => "BucketOwnerEnforced",
    };

    Ok(ProviderRequest::PutOwnershipControls {
        bucket: ctx.target.name().to_string(),
        ownership: ownership.to_string(),
    })
}

fn build_private_acl(ctx: &BuildContext<'_>, _params: &Params) -> Result<ProviderRequest, SpecError> {
    Ok(ProviderRequest::PutCannedAcl {
        bucket: ctx.target.name().to_string(),
        acl: "private".to_string(),
    })
}

fn build_cors(ctx: &BuildContext<'_>, params: &Params) -> Result<ProviderRequest, SpecError> {
    let max_age_seconds = if params.contains("max-age-seconds") {
        Some(positive_i32(params, "max-age-seconds", 0)?)
    } else {
        None
    };

    Ok(ProviderRequest::PutCors {
        bucket: ctx.target.name().to_string(),
        rule: CorsRuleSettings {
            allowed_headers: params.list_or("allowed-headers", &["*"]),
            allowed_methods: params
                .list_or("allowed-methods", &["GET"])
                .into_iter()
                .map(|method| method.to_ascii_uppercase())
                .collect(),
            allowed_origins: params.list_or("allowed-origins", &["*"]),
            max_age_seconds,
        },
    })
}
