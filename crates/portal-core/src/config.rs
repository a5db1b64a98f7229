//! Application configuration.
//!
//! [`AppConfig`] is built once from defaults plus optional overrides and
//! handed to consumers by reference. [`ConfigSlot`] is the single place
//! where it may be replaced; sealing consumes the slot, so nothing can
//! reconfigure once the app holds the sealed value.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PortalError, Result};
use crate::theme::{ThemeConfig, ThemeOverrides};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Features {
    pub dark_mode: bool,
    pub i18n: bool,
    pub analytics: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            dark_mode: true,
            i18n: true,
            analytics: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Api {
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentConfig {
    /// Base path for locale files, e.g. `/locales`.
    pub locales_path: String,
    pub supported_lngs: Vec<String>,
    pub fallback_lng: String,
    /// Seconds; `0` disables caching and cache-busts every fetch.
    pub cache_duration: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            locales_path: "/locales".to_string(),
            supported_lngs: vec!["en".to_string(), "de".to_string()],
            fallback_lng: "en".to_string(),
            cache_duration: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub mount_id: String,
    pub theme: ThemeConfig,
    pub features: Features,
    pub api: Api,
    pub content: ContentConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mount_id: "root".to_string(),
            theme: ThemeConfig::default(),
            features: Features::default(),
            api: Api::default(),
            content: ContentConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeatureOverrides {
    pub dark_mode: Option<bool>,
    pub i18n: Option<bool>,
    pub analytics: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiOverrides {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContentOverrides {
    pub locales_path: Option<String>,
    pub supported_lngs: Option<Vec<String>>,
    pub fallback_lng: Option<String>,
    pub cache_duration: Option<u64>,
}

/// Deep-partial configuration, as supplied by a host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigOverrides {
    pub mount_id: Option<String>,
    #[serde(default)]
    pub theme: ThemeOverrides,
    #[serde(default)]
    pub features: FeatureOverrides,
    #[serde(default)]
    pub api: ApiOverrides,
    #[serde(default)]
    pub content: ContentOverrides,
}

impl ConfigOverrides {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

impl AppConfig {
    /// Defaults deep-merged with `overrides`, then validated.
    pub fn merged(overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = Self::default();
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply `overrides` on top of the current values, section by section.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(mount_id) = &overrides.mount_id {
            self.mount_id.clone_from(mount_id);
        }
        self.theme.apply(&overrides.theme);

        let features = &overrides.features;
        if let Some(flag) = features.dark_mode {
            self.features.dark_mode = flag;
        }
        if let Some(flag) = features.i18n {
            self.features.i18n = flag;
        }
        if let Some(flag) = features.analytics {
            self.features.analytics = flag;
        }

        if let Some(base_url) = &overrides.api.base_url {
            self.api.base_url.clone_from(base_url);
        }

        let content = &overrides.content;
        if let Some(path) = &content.locales_path {
            self.content.locales_path.clone_from(path);
        }
        if let Some(lngs) = &content.supported_lngs {
            self.content.supported_lngs.clone_from(lngs);
        }
        if let Some(lng) = &content.fallback_lng {
            self.content.fallback_lng.clone_from(lng);
        }
        if let Some(seconds) = content.cache_duration {
            self.content.cache_duration = seconds;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.supported_lngs.is_empty() {
            return Err(PortalError::config("supportedLngs must not be empty"));
        }
        if !self
            .content
            .supported_lngs
            .contains(&self.content.fallback_lng)
        {
            return Err(PortalError::config(format!(
                "fallbackLng '{}' is not among supportedLngs {:?}",
                self.content.fallback_lng, self.content.supported_lngs
            )));
        }
        if self.theme.namespace.trim().is_empty() {
            return Err(PortalError::config("theme namespace must not be empty"));
        }
        Ok(())
    }
}

/// Owner of the process configuration.
#[derive(Debug)]
pub struct ConfigSlot {
    config: AppConfig,
}

impl ConfigSlot {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    /// Apply `overrides` on top of the current configuration.
    ///
    /// The previous configuration is kept when the new one does not
    /// validate.
    pub fn reconfigure(&mut self, overrides: &ConfigOverrides) -> Result<&AppConfig> {
        let mut next = self.config.clone();
        next.apply(overrides);
        next.validate()?;
        info!(mount_id = %next.mount_id, "configuration replaced");
        self.config = next;
        Ok(&self.config)
    }

    /// Freeze the configuration and hand it out for the rest of the run.
    #[must_use]
    pub fn seal(self) -> AppConfig {
        self.config
    }
}

impl Default for ConfigSlot {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
