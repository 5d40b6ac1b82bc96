use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub duties: DutiesConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_port: default_api_port(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Static operator token accepted alongside session tokens. Generated
    /// per process start unless pinned in the config file.
    #[serde(default = "default_admin_token")]
    pub admin_token: String,
    /// Bootstrap admin account, created when the users table is empty.
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_session_days")]
    pub session_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_token: default_admin_token(),
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
            session_days: default_session_days(),
        }
    }
}

fn default_admin_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_admin_email() -> String {
    "admin@rosterd.local".to_string()
}

fn default_admin_password() -> String {
    "changeme123".to_string()
}

fn default_session_days() -> i64 {
    7
}

#[derive(Debug, Clone, Deserialize)]
pub struct DutiesConfig {
    /// A duty cannot be dropped once its start time is within this many
    /// hours of the current time.
    #[serde(default = "default_drop_lead_hours")]
    pub drop_lead_hours: i64,
    /// How far ahead the background generator keeps duties materialized.
    #[serde(default = "default_generate_weeks_ahead")]
    pub generate_weeks_ahead: u32,
    /// Interval between background generation cycles in hours.
    #[serde(default = "default_generation_interval_hours")]
    pub generation_interval_hours: u64,
    /// Whether the background generation task runs at all.
    #[serde(default = "default_auto_generate")]
    pub auto_generate: bool,
    /// Seed demo places and timeslot templates on first startup.
    #[serde(default)]
    pub seed_demo: bool,
}

impl Default for DutiesConfig {
    fn default() -> Self {
        Self {
            drop_lead_hours: default_drop_lead_hours(),
            generate_weeks_ahead: default_generate_weeks_ahead(),
            generation_interval_hours: default_generation_interval_hours(),
            auto_generate: default_auto_generate(),
            seed_demo: false,
        }
    }
}

fn default_drop_lead_hours() -> i64 {
    2
}

fn default_generate_weeks_ahead() -> u32 {
    2
}

fn default_generation_interval_hours() -> u64 {
    24
}

fn default_auto_generate() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    #[serde(default = "default_smtp_tls")]
    pub smtp_tls: bool,
    pub from_address: Option<String>,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl EmailConfig {
    /// Email sending is enabled only when both a host and a sender are set.
    pub fn is_configured(&self) -> bool {
        self.smtp_host.is_some() && self.from_address.is_some()
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_tls() -> bool {
    true
}

fn default_from_name() -> String {
    "Rosterd".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
