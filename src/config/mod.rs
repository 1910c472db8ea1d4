//! Configuration — `~/.verdant/config.toml` plus environment overrides.

use crate::session::types::{DetailLevel, Theme};
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized.
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Data directory (database lives here) - computed, not serialized.
    #[serde(skip)]
    pub data_dir: PathBuf,

    /// API key for the inference endpoint. There is no embedded fallback:
    /// chatting without a configured key fails with a setup hint.
    pub api_key: Option<String>,
    pub default_provider: Option<String>,
    pub default_model: Option<String>,

    #[serde(default)]
    pub detail_level: DetailLevel,
    #[serde(default)]
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            data_dir: PathBuf::new(),
            api_key: None,
            default_provider: None,
            default_model: None,
            detail_level: DetailLevel::Standard,
            theme: Theme::Light,
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let verdant_dir = home.join(".verdant");
        let config_path = verdant_dir.join("config.toml");

        if !verdant_dir.exists() {
            fs::create_dir_all(&verdant_dir).context("Failed to create .verdant directory")?;
        }

        let mut config = if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            Config::default()
        };
        config.config_path = config_path.clone();
        config.data_dir = verdant_dir;
        if !config_path.exists() {
            config.save()?;
        }
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to config.
    pub fn apply_env_overrides(&mut self) {
        // API key: VERDANT_API_KEY, or OPENROUTER_API_KEY as a fallback
        if let Ok(key) =
            std::env::var("VERDANT_API_KEY").or_else(|_| std::env::var("OPENROUTER_API_KEY"))
        {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }

        if let Ok(provider) = std::env::var("VERDANT_PROVIDER") {
            if !provider.is_empty() {
                self.default_provider = Some(provider);
            }
        }

        if let Ok(model) = std::env::var("VERDANT_MODEL") {
            if !model.is_empty() {
                self.default_model = Some(model);
            }
        }

        if let Ok(dir) = std::env::var("VERDANT_DATA_DIR") {
            if !dir.is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
    }

    pub fn provider_name(&self) -> &str {
        self.default_provider.as_deref().unwrap_or("openrouter")
    }

    pub fn model_name(&self) -> &str {
        self.default_model
            .as_deref()
            .unwrap_or("deepseek/deepseek-r1:free")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("verdant.db")
    }

    /// Write config atomically: serialize to a temp file in the same
    /// directory, then rename over the target.
    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        let parent_dir = self
            .config_path
            .parent()
            .context("Config path must have a parent directory")?;
        fs::create_dir_all(parent_dir)
            .with_context(|| format!("Failed to create config directory: {}", parent_dir.display()))?;

        let file_name = self
            .config_path
            .file_name()
            .and_then(|v| v.to_str())
            .unwrap_or("config.toml");
        let temp_path = parent_dir.join(format!(".{file_name}.tmp-{}", uuid::Uuid::new_v4()));

        fs::write(&temp_path, toml_str)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        if let Err(e) = fs::rename(&temp_path, &self.config_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e).with_context(|| {
                format!("Failed to move config into place: {}", self.config_path.display())
            });
        }
        Ok(())
    }
}
