use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level API configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub scheduler: SchedulerConfig,
    pub links: LinksConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// `SurrealDB` connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<DatabaseCredentials>,
}

/// `SurrealDB` root credentials (optional when using unauthenticated engines like mem://).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

/// Attachment storage root and upload limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub max_upload_mb: u64,
}

/// Session and token security knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub session_cache_capacity: u64,
    pub jwt: JwtConfig,
    pub reset_cooldown_seconds: i64,
    pub invite_cooldown_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_seconds: i64,
    pub clock_skew_seconds: i64,
}

/// Outbound SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub implicit_tls: bool,
    /// Addresses notified about provider registration requests.
    pub admin_emails: Vec<String>,
}

/// Deadline notification sweep configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Shared secret the external cron presents on each run.
    pub token: String,
    /// Checkpoints, in minutes before the application deadline.
    pub deadline_minutes: Vec<i64>,
}

/// Public URL prefixes used in outbound emails.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub public_url: String,
}

impl LinksConfig {
    #[must_use]
    pub fn artist_invite(&self, invite_id: &str) -> String {
        format!("{}/artist/registration/{invite_id}", self.public_url)
    }

    #[must_use]
    pub fn user_invite(&self, invite_id: &str) -> String {
        format!("{}/user/registration/{invite_id}", self.public_url)
    }

    #[must_use]
    pub fn password_reset(&self, request_id: &str) -> String {
        format!("{}/user/reset-password/{request_id}", self.public_url)
    }

    #[must_use]
    pub fn email_change(&self, request_id: &str) -> String {
        format!("{}/user/email-verification/{request_id}", self.public_url)
    }

    #[must_use]
    pub fn artist_invites_page(&self) -> String {
        format!("{}/opportunities?invite=invites", self.public_url)
    }

    #[must_use]
    pub fn provider_applications(&self, opportunity_id: &str) -> String {
        format!("{}/provider/applications?opportunity={opportunity_id}", self.public_url)
    }
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4710, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_owned(),
            namespace: "atelier".to_owned(),
            database: "core".to_owned(),
            credentials: Some(DatabaseCredentials::default()),
        }
    }
}

impl Default for DatabaseCredentials {
    fn default() -> Self {
        Self { username: "root".to_owned(), password: "root".to_owned() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data"), max_upload_mb: 25 }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            session_cache_capacity: 10_000,
            jwt: JwtConfig::default(),
            reset_cooldown_seconds: 300,
            invite_cooldown_seconds: 300,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "dev-only-change-me".to_owned(),
            issuer: "atelier".to_owned(),
            ttl_seconds: 12 * 24 * 3600,
            clock_skew_seconds: 60,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 25,
            username: String::new(),
            password: String::new(),
            sender: "no-reply@atelier.local".to_owned(),
            implicit_tls: false,
            admin_emails: Vec::new(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        // Day and week before the deadline.
        Self { token: String::new(), deadline_minutes: vec![1440, 10080] }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self { public_url: "http://localhost:3000".to_owned() }
    }
}
