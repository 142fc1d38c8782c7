use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding uploaded media objects.
    pub media_dir: String,
    /// Hard cap on a single stored object, in bytes.
    pub max_upload_size: u64,
}

/// Outbound SMTP settings. With `enabled = false` no email is ever sent;
/// contact messages are still persisted.
#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_mail_host")]
    pub host: String,
    #[serde(default = "default_mail_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Use STARTTLS on the SMTP connection.
    #[serde(default = "default_true")]
    pub use_tls: bool,
    /// From header, e.g. "Portfolio <noreply@example.com>".
    #[serde(default)]
    pub from_address: String,
    /// Where owner notifications go. Empty disables them.
    #[serde(default)]
    pub owner_address: String,
    /// Acknowledge contact submissions to the visitor.
    #[serde(default = "default_true")]
    pub send_confirmation: bool,
    /// Notify the owner of new contact messages.
    #[serde(default = "default_true")]
    pub notify_owner: bool,
}

fn default_mail_host() -> String {
    "localhost".into()
}
fn default_mail_port() -> u16 {
    587
}
fn default_true() -> bool {
    true
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_mail_host(),
            port: default_mail_port(),
            username: String::new(),
            password: String::new(),
            use_tls: true,
            from_address: String::new(),
            owner_address: String::new(),
            send_confirmation: true,
            notify_owner: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    /// Pre-shared token for the management console.
    pub api_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub mail: MailConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.media_dir", "./media")?
            .set_default("storage.max_upload_size", 32 * 1024 * 1024)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., PORTFOLIO__ADMIN__API_TOKEN)
            .add_source(Environment::with_prefix("PORTFOLIO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
