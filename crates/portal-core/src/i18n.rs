//! Translation provider backed by `ftui-i18n`.
//!
//! Locale bundles are nested JSON documents flattened into dotted keys
//! (`outerSquares.1.label`). Bundled `en`/`de` bundles ship with the crate;
//! remote bundles are fetched over HTTP by a [`LocaleSource`] and replace
//! the bundled ones when they arrive. A failed fetch is never surfaced:
//! [`load_with_fallback`] logs it and answers with the bundled copy.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ftui_i18n::catalog::{LocaleStrings, StringCatalog};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ContentConfig;
use crate::error::{PortalError, Result};

const BUNDLED_EN: &str = include_str!("../assets/locales/en.json");
const BUNDLED_DE: &str = include_str!("../assets/locales/de.json");

const BUNDLED: [(&str, &str); 2] = [("en", BUNDLED_EN), ("de", BUNDLED_DE)];

/// Flattened `key -> text` map for one language.
pub type LocaleBundle = BTreeMap<String, String>;

/// Flatten a nested JSON object into dotted keys.
///
/// Strings are kept as-is, numbers and booleans are stringified, arrays use
/// their index as a key segment, and nulls are dropped.
#[must_use]
pub fn flatten(value: &Value) -> LocaleBundle {
    let mut out = LocaleBundle::new();
    flatten_into(value, String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, prefix: String, out: &mut LocaleBundle) {
    let join = |segment: &str| {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{prefix}.{segment}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(child, join(key), out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, join(&index.to_string()), out);
            }
        }
        Value::String(text) => {
            out.insert(prefix, text.clone());
        }
        Value::Number(number) => {
            out.insert(prefix, number.to_string());
        }
        Value::Bool(flag) => {
            out.insert(prefix, flag.to_string());
        }
        Value::Null => {}
    }
}

/// Parse a locale document into a bundle.
pub fn parse_bundle(raw: &str) -> Result<LocaleBundle> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(PortalError::config("locale document must be a JSON object"));
    }
    Ok(flatten(&value))
}

/// Languages that have a bundle compiled into the binary.
#[must_use]
pub fn bundled_languages() -> Vec<&'static str> {
    BUNDLED.iter().map(|(lng, _)| *lng).collect()
}

/// The bundled bundle for `lng`, or the English one when `lng` has none.
#[must_use]
pub fn bundled_bundle(lng: &str) -> LocaleBundle {
    let raw = BUNDLED
        .iter()
        .find(|(candidate, _)| *candidate == lng)
        .map_or(BUNDLED_EN, |(_, raw)| *raw);
    match parse_bundle(raw) {
        Ok(bundle) => bundle,
        Err(error) => {
            warn!(%error, lng, "bundled locale failed to parse");
            LocaleBundle::new()
        }
    }
}

/// A place locale bundles can be fetched from.
pub trait LocaleSource: Send + Sync {
    fn fetch(&self, lng: &str) -> Result<LocaleBundle>;
}

/// Fetches `<base_url><locales_path>/<lng>.json` with a blocking client.
#[derive(Debug, Clone)]
pub struct HttpLocaleSource {
    client: Client,
    base_url: String,
    locales_path: String,
    cache_duration: u64,
}

impl HttpLocaleSource {
    pub fn new(base_url: &str, content: &ContentConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            locales_path: content.locales_path.trim_end_matches('/').to_string(),
            cache_duration: content.cache_duration,
        })
    }

    /// Request URL for `lng`; cache-busted when caching is disabled.
    #[must_use]
    pub fn url_for(&self, lng: &str) -> String {
        let path = if self.locales_path.starts_with('/') || self.base_url.is_empty() {
            self.locales_path.clone()
        } else {
            format!("/{}", self.locales_path)
        };
        let url = format!("{}{}/{lng}.json", self.base_url, path);
        if self.cache_duration == 0 {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_millis())
                .unwrap_or_default();
            format!("{url}?t={millis}")
        } else {
            url
        }
    }
}

impl LocaleSource for HttpLocaleSource {
    fn fetch(&self, lng: &str) -> Result<LocaleBundle> {
        let url = self.url_for(lng);
        debug!(%url, "fetching locale bundle");
        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }
        let value: Value = response.json()?;
        if !value.is_object() {
            return Err(PortalError::config(format!(
                "locale document at {url} is not a JSON object"
            )));
        }
        Ok(flatten(&value))
    }
}

/// Fetch `lng` from `source`, answering with the bundled copy on any failure.
pub fn load_with_fallback(source: &dyn LocaleSource, lng: &str) -> LocaleBundle {
    match source.fetch(lng) {
        Ok(bundle) => {
            info!(lng, keys = bundle.len(), "loaded remote locale bundle");
            bundle
        }
        Err(error) => {
            warn!(%error, lng, "locale fetch failed, using bundled fallback");
            bundled_bundle(lng)
        }
    }
}

/// Pick the starting language from a POSIX locale value such as
/// `de_DE.UTF-8`; anything unsupported resolves to the fallback.
#[must_use]
pub fn detect_language(locale: Option<&str>, content: &ContentConfig) -> String {
    let prefix = locale
        .map(|raw| raw.split(['_', '.', '@', '-']).next().unwrap_or_default())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if content.supported_lngs.iter().any(|lng| *lng == prefix) {
        prefix
    } else {
        content.fallback_lng.clone()
    }
}

/// Key-lookup translation provider.
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: StringCatalog,
    language: String,
    fallback: String,
    supported: Vec<String>,
}

impl Translator {
    /// Create a translator preloaded with the bundled bundles of every
    /// supported language.
    pub fn new(content: &ContentConfig, language: &str) -> Self {
        let supported = content.supported_lngs.clone();
        let fallback = content.fallback_lng.clone();
        let language = if supported.iter().any(|lng| lng == language) {
            language.to_string()
        } else {
            fallback.clone()
        };

        let mut translator = Self {
            catalog: StringCatalog::new(),
            language,
            fallback,
            supported,
        };
        for lng in translator.supported.clone() {
            translator.install(&lng, bundled_bundle(&lng));
        }
        translator.refresh_chain();
        translator
    }

    /// Replace the strings of `lng` with `bundle`.
    pub fn install(&mut self, lng: &str, bundle: LocaleBundle) {
        let mut strings = LocaleStrings::new();
        for (key, value) in bundle {
            strings.insert(key, value);
        }
        self.catalog.add_locale(lng, strings);
    }

    fn refresh_chain(&mut self) {
        let mut chain = vec![self.language.clone()];
        if self.fallback != self.language {
            chain.push(self.fallback.clone());
        }
        self.catalog.set_fallback_chain(chain);
    }

    /// Switch the active language. Unsupported languages are refused.
    pub fn change_language(&mut self, lng: &str) -> bool {
        if !self.supported.iter().any(|candidate| candidate == lng) {
            debug!(lng, "ignoring unsupported language");
            return false;
        }
        if self.language != lng {
            info!(from = %self.language, to = lng, "language changed");
            self.language = lng.to_string();
            self.refresh_chain();
        }
        true
    }

    /// Like [`Self::change_language`], but unsupported languages are errors.
    pub fn require_language(&mut self, lng: &str) -> Result<()> {
        if self.change_language(lng) {
            Ok(())
        } else {
            Err(PortalError::UnsupportedLanguage {
                language: lng.to_string(),
            })
        }
    }

    /// The supported language after the active one, wrapping around.
    #[must_use]
    pub fn next_language(&self) -> &str {
        let index = self
            .supported
            .iter()
            .position(|lng| *lng == self.language)
            .unwrap_or(0);
        self.supported
            .get((index + 1) % self.supported.len().max(1))
            .map_or(self.language.as_str(), String::as_str)
    }

    #[must_use]
    pub fn resolved_language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn supported_languages(&self) -> &[String] {
        &self.supported
    }

    /// Look up `key`; the key itself is returned when no locale has it.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }

    /// Look up `key`, answering `default` when no locale has it.
    #[must_use]
    pub fn t_or(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or(default).to_string()
    }

    /// Look up `key` and substitute `{name}` tokens from `args`.
    #[must_use]
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.catalog
            .format(&self.language, key, args)
            .unwrap_or_else(|| key.to_string())
    }

    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.catalog.get(&self.language, key)
    }
}
