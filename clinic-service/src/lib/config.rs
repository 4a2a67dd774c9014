use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub mail: MailConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Public base URL of this API; used as JWT issuer and to build
    /// canonical document download URLs.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    /// Dedicated JWT signing secret. Preferred.
    pub jwt_secret: Option<String>,
    /// General encryption key, used as signing secret when no dedicated
    /// one is configured. A `hex:` prefix marks a hex-encoded key.
    pub encryption_key: Option<String>,
    /// Server-side pepper appended before hashing opaque tokens.
    pub token_pepper: Option<String>,
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_secs: i64,
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_days: i64,
    #[serde(default = "default_reset_token_ttl")]
    pub reset_token_ttl_minutes: i64,
    /// Front-end page that receives the password-reset token.
    pub reset_link_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory for uploaded documents.
    pub root: String,
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_token_ttl() -> i64 {
    900
}

fn default_refresh_token_ttl() -> i64 {
    30
}

fn default_reset_token_ttl() -> i64 {
    60
}

impl SecurityConfig {
    /// Resolve the JWT signing secret.
    ///
    /// Order: dedicated `jwt_secret`, then `encryption_key` (decoding a
    /// `hex:`-prefixed value), then a last-resort constant. The service
    /// keeps working on the fallback but the misconfiguration is logged;
    /// an empty secret is never used.
    pub fn signing_secret(&self) -> Vec<u8> {
        if let Some(secret) = self.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
            return secret.as_bytes().to_vec();
        }

        if let Some(key) = self.encryption_key.as_deref().filter(|k| !k.is_empty()) {
            if let Some(hex_key) = key.strip_prefix("hex:") {
                match hex::decode(hex_key) {
                    Ok(bytes) if !bytes.is_empty() => return bytes,
                    _ => {
                        tracing::warn!("encryption_key has a hex: prefix but is not valid hex");
                    }
                }
            } else {
                return key.as_bytes().to_vec();
            }
        }

        tracing::warn!(
            "no jwt_secret or encryption_key configured; signing tokens with the built-in \
             fallback secret"
        );
        b"fallback-secret".to_vec()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}
