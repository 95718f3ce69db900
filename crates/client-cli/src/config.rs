use anyhow::{bail, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use shared::{ImageSize, Language, DEFAULT_MODEL};
use std::path::PathBuf;
use std::time::Duration;

const AUTH_FUNCTION: &str = "https://functions.poehali.dev/d72c2702-d925-43c1-9343-c8c94ce97cf1";
const IMAGES_FUNCTION: &str = "https://functions.poehali.dev/d94b5564-3eda-4bec-a6fb-a93cd0de2407";
const ADMIN_FUNCTION: &str = "https://functions.poehali.dev/5025b042-4262-4d95-b9b5-769321f3eb1b";

pub const DEFAULT_SHARE_BASE_URL: &str = "https://photoset.ai";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Base URLs of the backend functions. An empty URL means "not deployed".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub auth: String,
    pub generate: String,
    pub save_image: String,
    pub images: String,
    pub admin: String,
    pub payment: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth: AUTH_FUNCTION.to_string(),
            generate: String::new(),
            save_image: String::new(),
            images: IMAGES_FUNCTION.to_string(),
            admin: ADMIN_FUNCTION.to_string(),
            payment: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-request timeout; generation calls can take close to a minute
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Upper bound for the startup session check
    #[serde(default = "default_verify_timeout")]
    pub verify_timeout_secs: u64,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default)]
    pub default_size: ImageSize,
    /// Link placed in share messages
    #[serde(default = "default_share_url")]
    pub share_base_url: String,
}

fn default_request_timeout() -> u64 {
    60
}

fn default_verify_timeout() -> u64 {
    10
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_share_url() -> String {
    DEFAULT_SHARE_BASE_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            verify_timeout_secs: default_verify_timeout(),
            language: Language::default(),
            default_model: default_model(),
            default_size: ImageSize::default(),
            share_base_url: default_share_url(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs.max(1))
    }
}

/// Keys accepted by `photoset config set/get`
pub const KEYS: &[&str] = &[
    "endpoints.auth",
    "endpoints.generate",
    "endpoints.save_image",
    "endpoints.images",
    "endpoints.admin",
    "endpoints.payment",
    "client.request_timeout_secs",
    "client.verify_timeout_secs",
    "client.language",
    "client.default_model",
    "client.default_size",
    "client.share_base_url",
];

impl Config {
    pub fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("ai", "photoset", "photoset")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("PHOTOSET_CONFIG") {
            return Ok(PathBuf::from(path));
        }

        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;

        Ok(config_dir.join("config.toml"))
    }

    /// Directory for the cached session and the TUI log file
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.to_path_buf())
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "endpoints.auth" => self.endpoints.auth.clone(),
            "endpoints.generate" => self.endpoints.generate.clone(),
            "endpoints.save_image" => self.endpoints.save_image.clone(),
            "endpoints.images" => self.endpoints.images.clone(),
            "endpoints.admin" => self.endpoints.admin.clone(),
            "endpoints.payment" => self.endpoints.payment.clone(),
            "client.request_timeout_secs" => self.client.request_timeout_secs.to_string(),
            "client.verify_timeout_secs" => self.client.verify_timeout_secs.to_string(),
            "client.language" => self.client.language.as_str().to_string(),
            "client.default_model" => self.client.default_model.clone(),
            "client.default_size" => self.client.default_size.to_string(),
            "client.share_base_url" => self.client.share_base_url.clone(),
            _ => bail!("Unknown config key: {}. Valid keys: {}", key, KEYS.join(", ")),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "endpoints.auth" => self.endpoints.auth = value.to_string(),
            "endpoints.generate" => self.endpoints.generate = value.to_string(),
            "endpoints.save_image" => self.endpoints.save_image = value.to_string(),
            "endpoints.images" => self.endpoints.images = value.to_string(),
            "endpoints.admin" => self.endpoints.admin = value.to_string(),
            "endpoints.payment" => self.endpoints.payment = value.to_string(),
            "client.request_timeout_secs" => self.client.request_timeout_secs = value.parse()?,
            "client.verify_timeout_secs" => self.client.verify_timeout_secs = value.parse()?,
            "client.language" => self.client.language = value.parse()?,
            "client.default_model" => self.client.default_model = value.to_string(),
            "client.default_size" => self.client.default_size = value.parse()?,
            "client.share_base_url" => self.client.share_base_url = value.to_string(),
            _ => bail!("Unknown config key: {}. Valid keys: {}", key, KEYS.join(", ")),
        }
        Ok(())
    }
}
