use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub image_store: ImageStoreConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// External image-hosting service credentials
#[derive(Debug, Clone, Deserialize)]
pub struct ImageStoreConfig {
    #[serde(default = "default_image_store_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

/// SMTP relay settings for the contact form
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Address both messages are sent from
    #[serde(default)]
    pub sender: String,
    /// Address the operator notification is delivered to
    #[serde(default)]
    pub receiver: String,
}

/// Seed credential for the login endpoint (no signup flow exists)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9000
}

fn default_db_path() -> String {
    "data/folioserve.db".to_string()
}

fn default_image_store_url() -> String {
    "https://images.example.com/v1".to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for ImageStoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_image_store_url(),
            api_key: String::new(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            sender: String::new(),
            receiver: String::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            image_store: ImageStoreConfig::default(),
            mail: MailConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        Ok(config)
    }

    /// Load configuration from config.toml
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["config.toml", "data/config.toml"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: FS_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(val) = env::var("FS_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("FS_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = env::var("FS_CONF_SERVER_CORS_ORIGIN") {
            if !val.trim().is_empty() {
                self.server.cors_origin = Some(val);
            }
        }

        // Database overrides
        if let Ok(val) = env::var("FS_CONF_DATABASE_PATH") {
            self.database.path = val;
        }

        // Image store overrides
        if let Ok(val) = env::var("FS_CONF_IMAGE_STORE_BASE_URL") {
            self.image_store.base_url = val;
        }
        if let Ok(val) = env::var("FS_CONF_IMAGE_STORE_API_KEY") {
            self.image_store.api_key = val;
        }

        // Mail overrides
        if let Ok(val) = env::var("FS_CONF_MAIL_SMTP_HOST") {
            self.mail.smtp_host = val;
        }
        if let Ok(val) = env::var("FS_CONF_MAIL_SMTP_PORT") {
            if let Ok(port) = val.parse() {
                self.mail.smtp_port = port;
            }
        }
        if let Ok(val) = env::var("FS_CONF_MAIL_USERNAME") {
            self.mail.username = Some(val);
        }
        if let Ok(val) = env::var("FS_CONF_MAIL_PASSWORD") {
            self.mail.password = Some(val);
        }
        if let Ok(val) = env::var("FS_CONF_MAIL_SENDER") {
            self.mail.sender = val;
        }
        if let Ok(val) = env::var("FS_CONF_MAIL_RECEIVER") {
            self.mail.receiver = val;
        }

        // Admin seed overrides
        if let Ok(val) = env::var("FS_CONF_ADMIN_EMAIL") {
            if !val.trim().is_empty() {
                self.admin.email = Some(val);
            }
        }
        if let Ok(val) = env::var("FS_CONF_ADMIN_PASSWORD") {
            if !val.trim().is_empty() {
                self.admin.password = Some(val);
            }
        }
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(&self.database.path).parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
