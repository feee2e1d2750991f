/// Fully-formed, provider-ready configuration requests.
///
/// Builders in the catalog produce these from validated parameters. They carry
/// every value the provider needs so the provider layer never has to look at
/// operation parameters again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRequest {
    PutVersioning {
        bucket: String,
    },
    PutEncryption {
        bucket: String,
        encryption: EncryptionSettings,
    },
    PutLogging {
        bucket: String,
        target_bucket: String,
        target_prefix: String,
    },
    PutAccelerate {
        bucket: String,
        enabled: bool,
    },
    PutRequestPayment {
        bucket: String,
        requester_pays: bool,
    },
    PutLifecycle {
        bucket: String,
        rule: LifecycleRuleSettings,
    },
    PutReplication {
        bucket: String,
        role_arn: String,
        rule: ReplicationRuleSettings,
    },
    PutInventory {
        bucket: String,
        inventory: InventorySettings,
    },
    PutAnalytics {
        bucket: String,
        analytics: AnalyticsSettings,
    },
    PutPublicAccessBlock {
        bucket: String,
        flags: PublicAccessBlockFlags,
    },
    PutPolicy {
        bucket: String,
        policy: String,
    },
    PutOwnershipControls {
        bucket: String,
        ownership: String,
    },
    PutCannedAcl {
        bucket: String,
        acl: String,
    },
    PutCors {
        bucket: String,
        rule: CorsRuleSettings,
    },
}

impl ProviderRequest {
    /// Bucket the request is sent to.
    pub fn bucket(&self) -> &str {
        match self {
            ProviderRequest::PutVersioning { bucket }
            | ProviderRequest::PutEncryption { bucket, .. }
            | ProviderRequest::PutLogging { bucket, .. }
            | ProviderRequest::PutAccelerate { bucket, .. }
            | ProviderRequest::PutRequestPayment { bucket, .. }
            | ProviderRequest::PutLifecycle { bucket, .. }
            | ProviderRequest::PutReplication { bucket, .. }
            | ProviderRequest::PutInventory { bucket, .. }
            | ProviderRequest::PutAnalytics { bucket, .. }
            | ProviderRequest::PutPublicAccessBlock { bucket, .. }
            | ProviderRequest::PutPolicy { bucket, .. }
            | ProviderRequest::PutOwnershipControls { bucket, .. }
            | ProviderRequest::PutCannedAcl { bucket, .. }
            | ProviderRequest::PutCors { bucket, .. } => bucket,
        }
    }

    /// S3 API action this request maps to.
    pub fn api_name(&self) -> &'static str {
        match self {
            ProviderRequest::PutVersioning { .. } => "PutBucketVersioning",
            ProviderRequest::PutEncryption { .. } => "PutBucketEncryption",
            ProviderRequest::PutLogging { .. } => "PutBucketLogging",
            ProviderRequest::PutAccelerate { .. } => "PutBucketAccelerateConfiguration",
            ProviderRequest::PutRequestPayment { .. } => "PutBucketRequestPayment",
            ProviderRequest::PutLifecycle { .. } => "PutBucketLifecycleConfiguration",
            ProviderRequest::PutReplication { .. } => "PutBucketReplication",
            ProviderRequest::PutInventory { .. } => "PutBucketInventoryConfiguration",
            ProviderRequest::PutAnalytics { .. } => "PutBucketAnalyticsConfiguration",
            ProviderRequest::PutPublicAccessBlock { .. } => "PutPublicAccessBlock",
            ProviderRequest::PutPolicy { .. } => "PutBucketPolicy",
            ProviderRequest::PutOwnershipControls { .. } => "PutBucketOwnershipControls",
            ProviderRequest::PutCannedAcl { .. } => "PutBucketAcl",
            ProviderRequest::PutCors { .. } => "PutBucketCors",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionSettings {
    pub algorithm: String,
    pub kms_key_id: Option<String>,
    pub bucket_key_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleTransition {
    pub days: i32,
    pub storage_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRuleSettings {
    pub id: String,
    pub prefix: String,
    pub transitions: Vec<LifecycleTransition>,
    pub expiration_days: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationRuleSettings {
    pub id: String,
    pub priority: i32,
    pub destination_bucket: String,
    pub destination_arn: String,
    pub storage_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySettings {
    pub id: String,
    pub destination_bucket: String,
    pub destination_arn: String,
    pub frequency: String,
    pub format: String,
    pub included_versions: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsSettings {
    pub id: String,
    pub destination_bucket: String,
    pub destination_arn: String,
    pub export_prefix: String,
    pub filter_prefix: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicAccessBlockFlags {
    pub block_public_acls: bool,
    pub ignore_public_acls: bool,
    pub block_public_policy: bool,
    pub restrict_public_buckets: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsRuleSettings {
    pub allowed_headers: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub max_age_seconds: Option<i32>,
}

pub fn bucket_arn(bucket: &str) -> String {
    format!("arn:aws:s3:::{bucket}")
}
