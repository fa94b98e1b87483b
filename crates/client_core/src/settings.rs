use std::{collections::HashMap, fs, path::Path};

use anyhow::{anyhow, Context, Result};
use url::Url;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CONFIG_FILE: &str = "moodpaper.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

impl ProviderSettings {
    /// Defaults, then the config file (if present), then the process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let file_text = match fs::read_to_string(path) {
            Ok(raw) => Some(raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && config_path.is_none() => {
                None
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config file '{}'", path.display()))
            }
        };

        Self::from_sources(file_text.as_deref(), |name| std::env::var(name).ok())
    }

    pub fn from_sources(
        file_text: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(raw) = file_text {
            let file_cfg = toml::from_str::<HashMap<String, String>>(raw)
                .context("config file must be a flat table of string values")?;
            if let Some(v) = file_cfg.get("api_key") {
                settings.api_key = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("model") {
                settings.model = v.clone();
            }
            if let Some(v) = file_cfg.get("base_url") {
                settings.base_url = v.clone();
            }
        }

        for name in ["API_KEY", "GEMINI_API_KEY", "APP__API_KEY"] {
            if let Some(v) = env(name).filter(|v| !v.trim().is_empty()) {
                settings.api_key = Some(v);
            }
        }
        if let Some(v) = env("APP__MODEL").filter(|v| !v.trim().is_empty()) {
            settings.model = v;
        }
        if let Some(v) = env("APP__BASE_URL").filter(|v| !v.trim().is_empty()) {
            settings.base_url = v;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("model name must not be empty"));
        }
        Url::parse(&self.base_url)
            .with_context(|| format!("invalid provider base url '{}'", self.base_url))?;
        Ok(())
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("missing provider API key; set GEMINI_API_KEY or api_key in {DEFAULT_CONFIG_FILE}")
            })
    }

    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}
