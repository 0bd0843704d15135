//! Runtime settings document.
//!
//! The document is persisted as a flat JSON object with dotted keys
//! (`app.root_url`, `upload.s3.bucket`, ...). In memory the keys are grouped
//! into typed sections which are flattened back on encode.
//!
//! # Design Decisions
//! - Every field defaults, so partial documents decode
//! - Unknown keys are dropped on decode; encoding the typed value is what
//!   strips them before persistence
//! - Secret attributes are kept in storage and blanked on every read

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The complete runtime settings document.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    #[serde(flatten)]
    pub app: AppSettings,

    /// Messenger integrations, keyed by kind.
    pub messengers: Vec<Messenger>,

    #[serde(flatten)]
    pub privacy: PrivacySettings,

    /// Outbound SMTP transports, in priority order.
    pub smtp: Vec<SmtpServer>,

    #[serde(flatten)]
    pub upload: UploadSettings,
}

/// Application metadata and sending limits.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppSettings {
    #[serde(rename = "app.root_url")]
    pub root_url: String,

    #[serde(rename = "app.logo_url")]
    pub logo_url: String,

    #[serde(rename = "app.favicon_url")]
    pub favicon_url: String,

    #[serde(rename = "app.from_email")]
    pub from_email: String,

    #[serde(rename = "app.notify_emails")]
    pub notify_emails: Vec<String>,

    #[serde(rename = "app.batch_size")]
    pub batch_size: u32,

    #[serde(rename = "app.concurrency")]
    pub concurrency: u32,

    #[serde(rename = "app.max_send_errors")]
    pub max_send_errors: u32,

    /// Messages per second per worker.
    #[serde(rename = "app.message_rate")]
    pub message_rate: u32,
}

/// A messenger integration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Messenger {
    /// Forwards messages as JSON to an HTTP endpoint.
    Postback(PostbackMessenger),
}

impl Messenger {
    pub fn name(&self) -> &str {
        match self {
            Messenger::Postback(m) => &m.name,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Messenger::Postback(m) => m.enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PostbackMessenger {
    pub name: String,
    pub enabled: bool,
    pub root_url: String,
    pub username: String,
    pub password: String,
    pub max_conns: u32,
    pub retries: u32,
    pub timeout: String,
}

/// Subscriber privacy controls.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PrivacySettings {
    #[serde(rename = "privacy.allow_blacklist")]
    pub allow_blacklist: bool,

    #[serde(rename = "privacy.allow_export")]
    pub allow_export: bool,

    #[serde(rename = "privacy.allow_wipe")]
    pub allow_wipe: bool,

    /// Data sets a subscriber may export.
    #[serde(rename = "privacy.exportable")]
    pub exportable: Vec<String>,
}

/// SMTP authentication mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpAuthProtocol {
    #[default]
    Plain,
    Login,
    Cram,
    None,
}

/// One outbound SMTP transport.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SmtpServer {
    pub enabled: bool,
    pub host: String,
    pub hello_hostname: String,
    pub port: u16,
    pub auth_protocol: SmtpAuthProtocol,
    pub username: String,

    /// Secret. Persisted, never returned on read.
    pub password: String,

    /// Extra headers added to every message sent through this server.
    pub email_headers: Vec<BTreeMap<String, String>>,

    pub max_conns: u32,
    pub max_msg_retries: u32,

    /// Duration string such as `15s`.
    pub idle_timeout: String,
    pub wait_timeout: String,

    pub tls_enabled: bool,
    pub tls_skip_verify: bool,
}

/// Where media uploads are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadProvider {
    #[default]
    Filesystem,
    S3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketType {
    #[default]
    Public,
    Private,
}

/// Upload provider selection plus the settings of every provider.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadSettings {
    #[serde(rename = "upload.provider")]
    pub provider: UploadProvider,

    #[serde(flatten)]
    pub filesystem: FilesystemUpload,

    #[serde(flatten)]
    pub s3: S3Upload,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FilesystemUpload {
    #[serde(rename = "upload.filesystem.upload_path")]
    pub upload_path: String,

    #[serde(rename = "upload.filesystem.upload_uri")]
    pub upload_uri: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct S3Upload {
    #[serde(rename = "upload.s3.aws_access_key_id")]
    pub aws_access_key_id: String,

    #[serde(rename = "upload.s3.aws_default_region")]
    pub aws_default_region: String,

    /// Secret. Persisted, never returned on read.
    #[serde(rename = "upload.s3.aws_secret_access_key")]
    pub aws_secret_access_key: String,

    #[serde(rename = "upload.s3.bucket")]
    pub bucket: String,

    #[serde(rename = "upload.s3.bucket_domain")]
    pub bucket_domain: String,

    #[serde(rename = "upload.s3.bucket_path")]
    pub bucket_path: String,

    #[serde(rename = "upload.s3.bucket_type")]
    pub bucket_type: BucketType,

    /// Presigned URL lifetime in seconds for private buckets.
    #[serde(rename = "upload.s3.expiry")]
    pub expiry: u64,
}

impl Settings {
    /// Decode a raw document. Unknown keys are ignored.
    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// Encode into the canonical form that gets persisted.
    pub fn canonicalize(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Copy of the document with every secret attribute blanked.
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        for smtp in &mut out.smtp {
            smtp.password.clear();
        }
        out.upload.s3.aws_secret_access_key.clear();
        out
    }

    /// Whether any SMTP transport is switched on.
    pub fn has_enabled_smtp(&self) -> bool {
        self.smtp.iter().any(|s| s.enabled)
    }

    /// Document written on first start when the store is empty.
    pub fn bootstrap() -> Self {
        Self {
            app: AppSettings {
                root_url: "http://localhost:9000".to_string(),
                logo_url: "http://localhost:9000/public/static/logo.png".to_string(),
                favicon_url: "http://localhost:9000/public/static/favicon.png".to_string(),
                from_email: "campaigns <noreply@localhost>".to_string(),
                notify_emails: vec!["admin@localhost".to_string()],
                batch_size: 1000,
                concurrency: 10,
                max_send_errors: 1000,
                message_rate: 10,
            },
            messengers: Vec::new(),
            privacy: PrivacySettings {
                allow_blacklist: true,
                allow_export: true,
                allow_wipe: true,
                exportable: vec![
                    "profile".to_string(),
                    "subscriptions".to_string(),
                    "campaign_views".to_string(),
                    "link_clicks".to_string(),
                ],
            },
            smtp: vec![SmtpServer {
                enabled: true,
                host: "localhost".to_string(),
                port: 25,
                auth_protocol: SmtpAuthProtocol::Cram,
                max_conns: 10,
                max_msg_retries: 2,
                idle_timeout: "15s".to_string(),
                wait_timeout: "5s".to_string(),
                ..Default::default()
            }],
            upload: UploadSettings {
                provider: UploadProvider::Filesystem,
                filesystem: FilesystemUpload {
                    upload_path: "uploads".to_string(),
                    upload_uri: "/uploads".to_string(),
                },
                s3: S3Upload {
                    aws_default_region: "ap-south-1".to_string(),
                    bucket_type: BucketType::Public,
                    expiry: 14 * 24 * 3600,
                    ..Default::default()
                },
            },
        }
    }
}
