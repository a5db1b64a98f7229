//! Visual identity tokens and the persisted light/dark preference.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Default key the light/dark preference is stored under.
pub const THEME_PREFERENCE_KEY: &str = "landing-page-theme";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
    pub quaternary: String,
    pub quinary: String,
    pub senary: String,
    pub background: String,
    pub background_dark: String,
    pub text: String,
    pub text_dark: String,
    pub border: String,
    pub border_dark: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeFonts {
    pub primary: String,
    pub mono: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Spacing {
    pub xs: u32,
    pub sm: u32,
    pub md: u32,
    pub lg: u32,
    pub xl: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Radius {
    pub sm: u32,
    pub md: u32,
    pub lg: u32,
    pub full: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZIndex {
    pub base: i32,
    pub dropdown: i32,
    pub modal: i32,
    pub tooltip: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeConfig {
    /// Prefix for class names, storage keys and token names.
    pub namespace: String,
    pub colors: ThemeColors,
    pub fonts: ThemeFonts,
    pub spacing: Spacing,
    pub radius: Radius,
    pub z_index: ZIndex,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            namespace: "lp".to_string(),
            colors: ThemeColors {
                primary: "#1351af".to_string(),
                secondary: "#1351fa".to_string(),
                tertiary: "#af1703".to_string(),
                quaternary: "#118501".to_string(),
                quinary: "#ff8203".to_string(),
                senary: "#170319".to_string(),
                background: "#ffe0bf".to_string(),
                background_dark: "hsl(222.2 84% 4.9%)".to_string(),
                text: "#0f172a".to_string(),
                text_dark: "#e5e7eb".to_string(),
                border: "rgba(0, 0, 0, 0.14)".to_string(),
                border_dark: "rgba(255, 255, 255, 0.14)".to_string(),
            },
            fonts: ThemeFonts {
                primary: "system-ui, -apple-system, sans-serif".to_string(),
                mono: "ui-monospace, monospace".to_string(),
            },
            spacing: Spacing {
                xs: 4,
                sm: 8,
                md: 16,
                lg: 24,
                xl: 32,
            },
            radius: Radius {
                sm: 4,
                md: 8,
                lg: 16,
                full: 9999,
            },
            z_index: ZIndex {
                base: 1,
                dropdown: 10,
                modal: 100,
                tooltip: 50,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ColorOverrides {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub tertiary: Option<String>,
    pub quaternary: Option<String>,
    pub quinary: Option<String>,
    pub senary: Option<String>,
    pub background: Option<String>,
    pub background_dark: Option<String>,
    pub text: Option<String>,
    pub text_dark: Option<String>,
    pub border: Option<String>,
    pub border_dark: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontOverrides {
    pub primary: Option<String>,
    pub mono: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpacingOverrides {
    pub xs: Option<u32>,
    pub sm: Option<u32>,
    pub md: Option<u32>,
    pub lg: Option<u32>,
    pub xl: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RadiusOverrides {
    pub sm: Option<u32>,
    pub md: Option<u32>,
    pub lg: Option<u32>,
    pub full: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZIndexOverrides {
    pub base: Option<i32>,
    pub dropdown: Option<i32>,
    pub modal: Option<i32>,
    pub tooltip: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThemeOverrides {
    pub namespace: Option<String>,
    #[serde(default)]
    pub colors: ColorOverrides,
    #[serde(default)]
    pub fonts: FontOverrides,
    #[serde(default)]
    pub spacing: SpacingOverrides,
    #[serde(default)]
    pub radius: RadiusOverrides,
    #[serde(default)]
    pub z_index: ZIndexOverrides,
}

fn set<T: Clone>(target: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}

impl ThemeConfig {
    pub fn apply(&mut self, overrides: &ThemeOverrides) {
        set(&mut self.namespace, overrides.namespace.as_ref());

        let c = &overrides.colors;
        let colors = &mut self.colors;
        set(&mut colors.primary, c.primary.as_ref());
        set(&mut colors.secondary, c.secondary.as_ref());
        set(&mut colors.tertiary, c.tertiary.as_ref());
        set(&mut colors.quaternary, c.quaternary.as_ref());
        set(&mut colors.quinary, c.quinary.as_ref());
        set(&mut colors.senary, c.senary.as_ref());
        set(&mut colors.background, c.background.as_ref());
        set(&mut colors.background_dark, c.background_dark.as_ref());
        set(&mut colors.text, c.text.as_ref());
        set(&mut colors.text_dark, c.text_dark.as_ref());
        set(&mut colors.border, c.border.as_ref());
        set(&mut colors.border_dark, c.border_dark.as_ref());

        set(&mut self.fonts.primary, overrides.fonts.primary.as_ref());
        set(&mut self.fonts.mono, overrides.fonts.mono.as_ref());

        let s = &overrides.spacing;
        set(&mut self.spacing.xs, s.xs.as_ref());
        set(&mut self.spacing.sm, s.sm.as_ref());
        set(&mut self.spacing.md, s.md.as_ref());
        set(&mut self.spacing.lg, s.lg.as_ref());
        set(&mut self.spacing.xl, s.xl.as_ref());

        let r = &overrides.radius;
        set(&mut self.radius.sm, r.sm.as_ref());
        set(&mut self.radius.md, r.md.as_ref());
        set(&mut self.radius.lg, r.lg.as_ref());
        set(&mut self.radius.full, r.full.as_ref());

        let z = &overrides.z_index;
        set(&mut self.z_index.base, z.base.as_ref());
        set(&mut self.z_index.dropdown, z.dropdown.as_ref());
        set(&mut self.z_index.modal, z.modal.as_ref());
        set(&mut self.z_index.tooltip, z.tooltip.as_ref());
    }

    /// Namespaced design tokens, e.g. `("--lp-primary", "#1351af")`.
    #[must_use]
    pub fn variables(&self) -> Vec<(String, String)> {
        let ns = &self.namespace;
        let c = &self.colors;
        let px = |value: u32| format!("{value}px");
        let entries: Vec<(&str, String)> = vec![
            ("primary", c.primary.clone()),
            ("secondary", c.secondary.clone()),
            ("tertiary", c.tertiary.clone()),
            ("quaternary", c.quaternary.clone()),
            ("quinary", c.quinary.clone()),
            ("senary", c.senary.clone()),
            ("bg", c.background.clone()),
            ("bg-dark", c.background_dark.clone()),
            ("text", c.text.clone()),
            ("text-dark", c.text_dark.clone()),
            ("border", c.border.clone()),
            ("border-dark", c.border_dark.clone()),
            ("font-primary", self.fonts.primary.clone()),
            ("font-mono", self.fonts.mono.clone()),
            ("space-xs", px(self.spacing.xs)),
            ("space-sm", px(self.spacing.sm)),
            ("space-md", px(self.spacing.md)),
            ("space-lg", px(self.spacing.lg)),
            ("space-xl", px(self.spacing.xl)),
            ("radius-sm", px(self.radius.sm)),
            ("radius-md", px(self.radius.md)),
            ("radius-lg", px(self.radius.lg)),
            ("radius-full", px(self.radius.full)),
            ("z-base", self.z_index.base.to_string()),
            ("z-dropdown", self.z_index.dropdown.to_string()),
            ("z-modal", self.z_index.modal.to_string()),
            ("z-tooltip", self.z_index.tooltip.to_string()),
        ];
        entries
            .into_iter()
            .map(|(name, value)| (format!("--{ns}-{name}"), value))
            .collect()
    }

    /// Tokens rendered as declaration lines (`--lp-primary: #1351af;`).
    #[must_use]
    pub fn variables_block(&self) -> String {
        self.variables()
            .into_iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Small string key-value store used for the theme preference.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| io::Error::other("preference store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk; every write replaces the file atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(error) => {
                warn!(%error, path = %self.path.display(), "ignoring unreadable preference file");
                BTreeMap::new()
            }
        }
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all();
        values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(serde_json::to_string_pretty(&values)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Light/dark switch mirrored into a persistent store.
#[derive(Debug, Clone)]
pub struct ThemeToggle {
    mode: ThemeMode,
    key: String,
    enabled: bool,
}

impl ThemeToggle {
    /// Read the stored preference once; `system_default` applies when the
    /// store has nothing usable. A disabled toggle is always light.
    pub fn load(
        store: &dyn PreferenceStore,
        key: &str,
        system_default: ThemeMode,
        enabled: bool,
    ) -> Self {
        let mode = if enabled {
            store
                .get(key)
                .and_then(|raw| ThemeMode::parse(&raw))
                .unwrap_or(system_default)
        } else {
            ThemeMode::Light
        };
        debug!(mode = mode.as_str(), enabled, "theme preference loaded");
        Self {
            mode,
            key: key.to_string(),
            enabled,
        }
    }

    #[must_use]
    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.mode == ThemeMode::Dark
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the mode and persist it. A failed write is logged and the new
    /// mode is kept for this session.
    pub fn toggle(&mut self, store: &dyn PreferenceStore) -> ThemeMode {
        if !self.enabled {
            return self.mode;
        }
        self.mode = self.mode.flipped();
        if let Err(error) = store.set(&self.key, self.mode.as_str()) {
            warn!(%error, key = %self.key, "failed to persist theme preference");
        }
        self.mode
    }

    /// Label key describing what the toggle will switch to.
    #[must_use]
    pub fn action_key(&self) -> &'static str {
        if self.is_dark() {
            "theme.toLight"
        } else {
            "theme.toDark"
        }
    }
}

/// Guess the terminal's preferred scheme from `COLORFGBG` (`"15;0"` = light
/// text on dark background).
#[must_use]
pub fn detect_system_mode(colorfgbg: Option<&str>) -> ThemeMode {
    let background = colorfgbg
        .and_then(|raw| raw.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok());
    match background {
        Some(bg) if bg == 7 || bg == 15 => ThemeMode::Light,
        Some(_) => ThemeMode::Dark,
        None => ThemeMode::Light,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_are_namespaced() {
        let theme = ThemeConfig::default();
        let vars = theme.variables();
        assert_eq!(vars.len(), 27);
        assert_eq!(vars[0], ("--lp-primary".to_string(), "#1351af".to_string()));
        assert!(
            vars.contains(&("--lp-space-md".to_string(), "16px".to_string())),
            "{vars:?}"
        );
        assert!(theme.variables_block().contains("--lp-z-modal: 100;"));
    }

    #[test]
    fn namespace_override_renames_every_token() {
        let mut theme = ThemeConfig::default();
        theme.apply(&ThemeOverrides {
            namespace: Some("acme".to_string()),
            ..ThemeOverrides::default()
        });
        assert!(theme.variables().iter().all(|(name, _)| name.starts_with("--acme-")));
    }

    #[test]
    fn stored_preference_wins_over_system_default() {
        let store = MemoryStore::default();
        store.set(THEME_PREFERENCE_KEY, "dark").expect("memory");
        let toggle = ThemeToggle::load(&store, THEME_PREFERENCE_KEY, ThemeMode::Light, true);
        assert!(toggle.is_dark());
        assert_eq!(toggle.action_key(), "theme.toLight");
    }

    #[test]
    fn garbage_preference_uses_system_default() {
        let store = MemoryStore::default();
        store.set(THEME_PREFERENCE_KEY, "sepia").expect("memory");
        let toggle = ThemeToggle::load(&store, THEME_PREFERENCE_KEY, ThemeMode::Dark, true);
        assert_eq!(toggle.mode(), ThemeMode::Dark);
    }

    #[test]
    fn toggle_writes_every_time() {
        let store = MemoryStore::default();
        let mut toggle = ThemeToggle::load(&store, THEME_PREFERENCE_KEY, ThemeMode::Light, true);
        assert_eq!(toggle.toggle(&store), ThemeMode::Dark);
        assert_eq!(store.get(THEME_PREFERENCE_KEY).as_deref(), Some("dark"));
        assert_eq!(toggle.toggle(&store), ThemeMode::Light);
        assert_eq!(store.get(THEME_PREFERENCE_KEY).as_deref(), Some("light"));
        assert_eq!(toggle.action_key(), "theme.toDark");
    }

    #[test]
    fn poisoned_memory_store_reports_write_failure() {
        let store = std::sync::Arc::new(MemoryStore::default());
        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.values.lock().expect("lock");
            panic!("poison the store");
        })
        .join();
        assert!(store.values.is_poisoned());

        let error = store.set(THEME_PREFERENCE_KEY, "dark").unwrap_err();
        assert!(matches!(error, crate::error::PortalError::Io(_)), "{error}");

        // The toggle still flips for the session when the write fails.
        let mut toggle = ThemeToggle::load(&*store, THEME_PREFERENCE_KEY, ThemeMode::Light, true);
        assert_eq!(toggle.toggle(&*store), ThemeMode::Dark);
        assert_eq!(store.get(THEME_PREFERENCE_KEY), None);
    }

    #[test]
    fn disabled_toggle_is_pinned_light() {
        let store = MemoryStore::default();
        store.set(THEME_PREFERENCE_KEY, "dark").expect("memory");
        let mut toggle = ThemeToggle::load(&store, THEME_PREFERENCE_KEY, ThemeMode::Dark, false);
        assert_eq!(toggle.mode(), ThemeMode::Light);
        assert_eq!(toggle.toggle(&store), ThemeMode::Light);
        assert_eq!(store.get(THEME_PREFERENCE_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("nested").join("prefs.json"));
        assert_eq!(store.get("k"), None);
        store.set("k", "dark").expect("write");
        store.set("other", "1").expect("write");

        let reopened = FileStore::new(store.path().to_path_buf());
        assert_eq!(reopened.get("k").as_deref(), Some("dark"));
        assert_eq!(reopened.get("other").as_deref(), Some("1"));
    }

    #[test]
    fn corrupt_file_store_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{ not json").expect("write");
        let store = FileStore::new(path);
        assert_eq!(store.get("k"), None);
        store.set("k", "light").expect("overwrite");
        assert_eq!(store.get("k").as_deref(), Some("light"));
    }

    #[test]
    fn colorfgbg_detection() {
        assert_eq!(detect_system_mode(Some("15;0")), ThemeMode::Dark);
        assert_eq!(detect_system_mode(Some("0;15")), ThemeMode::Light);
        assert_eq!(detect_system_mode(None), ThemeMode::Light);
        assert_eq!(detect_system_mode(Some("garbage")), ThemeMode::Light);
    }
}
