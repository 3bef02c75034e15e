//! Bot settings from `algebrach.toml`, `.env` files and the environment.

use algebrach_error::ConfigError;
use algebrach_storage::KekStorageConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Kind of deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeployEnvironment {
    /// Local development
    Dev,
    /// Test deployment
    Test,
    /// Production
    Prod,
}

/// Everything the bot is configured with.
///
/// Environment variables use the upper-cased field names, e.g.
/// `TELEGRAM_BOT_TOKEN`; `ADMIN_IDS` is a comma separated list.
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    /// App name used in logs
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Kind of deployment
    pub environment: DeployEnvironment,
    /// Bot token from BotFather
    pub telegram_bot_token: String,
    /// Airtable personal access token
    pub airtable_access_token: String,
    /// Airtable base holding the kek tables
    #[serde(default = "default_airtable_base_id")]
    pub airtable_base_id: String,
    /// Chat notified about handler failures
    #[serde(default)]
    pub events_chat_id: Option<i64>,
    /// Port of the health endpoint
    #[serde(default = "default_health_port")]
    pub health_port: u16,
    /// Users spared by the surprise kek
    #[serde(default = "default_admin_ids")]
    pub admin_ids: Vec<i64>,
    /// The main chat
    #[serde(default = "default_mechmath_chat_id")]
    pub mechmath_chat_id: i64,
    /// Owner allowed to push keks directly
    #[serde(default = "default_rmbk_id")]
    pub rmbk_id: i64,
    /// Animation sent with the surprise kek
    #[serde(default = "default_surprise_gif")]
    pub surprise_gif: String,
    /// Chance of a surprise kek in the main chat, in percent
    #[serde(default = "default_surprise_chance")]
    pub surprise_chance: f64,
    /// How long the kek list is cached
    #[serde(default = "default_kek_cache_ttl_seconds")]
    pub kek_cache_ttl_seconds: u64,
    /// Concurrent Airtable calls
    #[serde(default = "default_storage_max_workers")]
    pub storage_max_workers: usize,
    /// Limit on a single Airtable call
    #[serde(default = "default_storage_call_timeout_seconds")]
    pub storage_call_timeout_seconds: u64,
}

fn default_app_name() -> String {
    "algebrach".to_string()
}

fn default_airtable_base_id() -> String {
    "appG5koP3D8kWbLdl".to_string()
}

fn default_health_port() -> u16 {
    8080
}

fn default_admin_ids() -> Vec<i64> {
    vec![
        28006241, 207275675, 217917985, 126442350, 221439208, 147100358, 258145124,
    ]
}

fn default_mechmath_chat_id() -> i64 {
    -1001091546301
}

fn default_rmbk_id() -> i64 {
    28006241
}

fn default_surprise_gif() -> String {
    "https://t.me/mechmath/743455".to_string()
}

fn default_surprise_chance() -> f64 {
    33.0
}

fn default_kek_cache_ttl_seconds() -> u64 {
    300
}

fn default_storage_max_workers() -> usize {
    1
}

fn default_storage_call_timeout_seconds() -> u64 {
    180
}

impl Settings {
    /// Load settings for a running bot.
    ///
    /// Sources, later ones winning:
    /// 1. `algebrach.toml` in the working directory, if present
    /// 2. `.env`, then `.env.prod`
    /// 3. Process environment
    pub fn load() -> Result<Self, ConfigError> {
        // dotenvy never overrides a variable that is already set
        dotenvy::from_filename(".env.prod").ok();
        dotenvy::dotenv().ok();

        let builder = Config::builder()
            .add_source(File::with_name("algebrach").required(false))
            .add_source(
                Environment::default()
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("admin_ids"),
            );
        Self::build(builder)
    }

    /// Load settings from one TOML file, ignoring the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::from(path.as_ref())))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        settings.validate()?;
        debug!(settings = ?settings, "Settings loaded");
        Ok(settings)
    }

    /// Reject settings the bot cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_bot_token.trim().is_empty() {
            return Err(ConfigError::new("telegram_bot_token is empty"));
        }
        if self.airtable_access_token.trim().is_empty() {
            return Err(ConfigError::new("airtable_access_token is empty"));
        }
        if self.airtable_base_id.trim().is_empty() {
            return Err(ConfigError::new("airtable_base_id is empty"));
        }
        if self.storage_max_workers == 0 {
            return Err(ConfigError::new("storage_max_workers must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.surprise_chance) {
            return Err(ConfigError::new(format!(
                "surprise_chance should be between 0 and 100, not {}",
                self.surprise_chance
            )));
        }
        Ok(())
    }

    /// Whether this is the production deployment.
    pub fn is_prod(&self) -> bool {
        self.environment == DeployEnvironment::Prod
    }

    /// Address the health endpoint listens on.
    pub fn health_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.health_port))
    }

    /// Storage tuning derived from these settings.
    pub fn kek_storage_config(&self) -> KekStorageConfig {
        let call_timeout = match self.storage_call_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        KekStorageConfig::default()
            .with_cache_ttl(Duration::from_secs(self.kek_cache_ttl_seconds))
            .with_max_workers(self.storage_max_workers)
            .with_call_timeout(call_timeout)
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("environment", &self.environment)
            .field("airtable_base_id", &self.airtable_base_id)
            .field("events_chat_id", &self.events_chat_id)
            .field("health_port", &self.health_port)
            .field("admin_ids", &self.admin_ids)
            .field("mechmath_chat_id", &self.mechmath_chat_id)
            .field("rmbk_id", &self.rmbk_id)
            .field("surprise_chance", &self.surprise_chance)
            .field("kek_cache_ttl_seconds", &self.kek_cache_ttl_seconds)
            .field("storage_max_workers", &self.storage_max_workers)
            .field("storage_call_timeout_seconds", &self.storage_call_timeout_seconds)
            .finish_non_exhaustive()
    }
}
