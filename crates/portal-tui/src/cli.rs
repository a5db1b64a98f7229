use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use ftui_runtime::{Program, ProgramConfig, ScreenMode};
use portal_core::catalog::ContentSet;
use portal_core::cell::GridLayout;
use portal_core::config::{
    AppConfig, ApiOverrides, ConfigOverrides, ConfigSlot, ContentOverrides, FeatureOverrides,
};
use portal_core::docs::{DocCatalog, DocSegment};
use portal_core::error::{PortalError, Result};
use portal_core::i18n::{HttpLocaleSource, LocaleSource, Translator, detect_language};
use portal_core::route::Route;
use portal_core::theme::{FileStore, detect_system_mode};
use serde_json::json;
use tracing::info;

use crate::app::{AppOptions, PortalApp};
use crate::{diagram, logging};

const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// `--start` takes a view name (`main`, `wiki`) or a route path such as
/// `/wiki` or `#/wiki`.
fn parse_start(raw: &str) -> std::result::Result<Route, String> {
    if let Some(route) = Route::from_name(raw) {
        return Ok(route);
    }
    if raw.trim().trim_start_matches('#').starts_with('/') {
        return Ok(Route::from_path(raw));
    }
    Err(format!("expected main, wiki or a route path, got `{raw}`"))
}

#[derive(Debug, Parser)]
#[command(
    name = "portal",
    about = "Interactive 4x4 grid portal with docs, themes and translations",
    version
)]
pub struct Cli {
    /// JSON file with configuration overrides.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Start language; defaults to the one in LC_ALL / LANG.
    #[arg(long)]
    pub lang: Option<String>,

    /// Path of the locale files below the base URL.
    #[arg(long = "locales-path")]
    pub locales_path: Option<String>,

    /// Server to fetch locale files from; empty keeps the bundled strings.
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Where the theme preference is stored.
    #[arg(long)]
    pub prefs: Option<PathBuf>,

    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    #[arg(long = "no-mouse")]
    pub no_mouse: bool,

    /// Hide the theme toggle and stay in light mode.
    #[arg(long = "no-dark-mode")]
    pub no_dark_mode: bool,

    /// View to open first: a name or a route path.
    #[arg(long, value_parser = parse_start, default_value = "main")]
    pub start: Route,

    /// Documentation page shown first, by id.
    #[arg(long)]
    pub doc: Option<String>,

    /// Seed for the center picker, for reproducible sessions.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the resolved theme variables and exit.
    #[arg(long = "print-theme")]
    pub print_theme: bool,

    /// Validate configuration, content and docs, then exit.
    #[arg(long)]
    pub check: bool,

    /// Emit the check summary as JSON.
    #[arg(long, requires = "check")]
    pub json: bool,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    if cli.print_theme {
        print!("{}", config.theme.variables_block());
        return Ok(());
    }

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(logging::default_log_path);
    logging::init(&log_path)?;

    if cli.check {
        let summary = check(&config);
        print_check(&summary, cli.json);
        return if summary.is_ok() {
            Ok(())
        } else {
            Err(PortalError::config("content check failed"))
        };
    }

    let language = resolve_language(cli.lang.as_deref(), &config)?;
    let page = resolve_page(cli.doc.as_deref(), &DocCatalog::bundled())?;
    let prefs = cli.prefs.clone().unwrap_or_else(default_prefs_path);
    let system_theme = detect_system_mode(std::env::var("COLORFGBG").ok().as_deref());
    let locale_source = remote_source(&config)?;

    let app = PortalApp::new(
        config,
        AppOptions {
            language,
            start: cli.start,
            page,
            store: Box::new(FileStore::new(prefs)),
            system_theme,
            locale_source,
            seed: cli.seed,
        },
    )?;
    let program_config = ProgramConfig {
        screen_mode: ScreenMode::AltScreen,
        ..Default::default()
    }
    .with_mouse_enabled(!cli.no_mouse);
    let mut program = Program::with_config(app, program_config)?;
    program.run()?;
    info!("portal exited");
    Ok(())
}

/// Defaults, then the config file, then command-line flags.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut slot = ConfigSlot::default();
    if let Some(path) = &cli.config {
        slot.reconfigure(&ConfigOverrides::from_path(path)?)?;
    }
    let flags = ConfigOverrides {
        features: FeatureOverrides {
            dark_mode: cli.no_dark_mode.then_some(false),
            ..FeatureOverrides::default()
        },
        api: ApiOverrides {
            base_url: cli.base_url.clone(),
        },
        content: ContentOverrides {
            locales_path: cli.locales_path.clone(),
            ..ContentOverrides::default()
        },
        ..ConfigOverrides::default()
    };
    slot.reconfigure(&flags)?;
    Ok(slot.seal())
}

/// An explicit language must be supported; otherwise the environment's
/// locale is used when supported and the fallback language when not.
pub fn resolve_language(requested: Option<&str>, config: &AppConfig) -> Result<String> {
    match requested {
        Some(lng) => {
            Translator::new(&config.content, lng).require_language(lng)?;
            Ok(lng.to_string())
        }
        None => {
            let locale = LOCALE_VARS
                .iter()
                .find_map(|name| std::env::var(name).ok().filter(|value| !value.is_empty()));
            Ok(detect_language(locale.as_deref(), &config.content))
        }
    }
}

/// Index of the requested documentation page; unknown ids are rejected.
pub fn resolve_page(requested: Option<&str>, docs: &DocCatalog) -> Result<usize> {
    let Some(id) = requested else {
        return Ok(0);
    };
    docs.index_of(id).ok_or_else(|| {
        let known: Vec<&str> = docs.pages().iter().map(|page| page.id).collect();
        PortalError::config(format!(
            "unknown doc page `{id}` (known: {})",
            known.join(", ")
        ))
    })
}

#[must_use]
pub fn default_prefs_path() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(std::env::temp_dir)
        .join("portal")
        .join("prefs.json")
}

fn remote_source(config: &AppConfig) -> Result<Option<Arc<dyn LocaleSource>>> {
    if config.api.base_url.trim().is_empty() {
        return Ok(None);
    }
    let source = HttpLocaleSource::new(&config.api.base_url, &config.content)?;
    Ok(Some(Arc::new(source)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCheck {
    pub lng: String,
    pub content: std::result::Result<(), String>,
    /// `None` when no base URL is configured.
    pub remote: Option<std::result::Result<usize, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub mount_id: String,
    pub base_url: String,
    pub languages: Vec<LanguageCheck>,
    pub doc_pages: usize,
    pub diagrams: usize,
    pub diagram_errors: Vec<String>,
}

impl CheckSummary {
    /// Remote fetch failures are not fatal: the bundled strings cover them.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.languages.iter().all(|check| check.content.is_ok()) && self.diagram_errors.is_empty()
    }
}

#[must_use]
pub fn check(config: &AppConfig) -> CheckSummary {
    let layout = GridLayout::default();
    let remote = remote_source(config);

    let languages = config
        .content
        .supported_lngs
        .iter()
        .map(|lng| {
            let translator = Translator::new(&config.content, lng);
            let content = ContentSet::load(&layout, &translator)
                .map(|_| ())
                .map_err(|error| error.to_string());
            let remote = match &remote {
                Ok(None) => None,
                Ok(Some(source)) => Some(
                    source
                        .fetch(lng)
                        .map(|bundle| bundle.len())
                        .map_err(|error| error.to_string()),
                ),
                Err(error) => Some(Err(error.to_string())),
            };
            LanguageCheck {
                lng: lng.clone(),
                content,
                remote,
            }
        })
        .collect();

    let registry = diagram::registry();
    let docs = DocCatalog::bundled();
    let mut diagrams = 0;
    let mut diagram_errors = Vec::new();
    for page in docs.pages() {
        for segment in registry.split(page.content) {
            if let DocSegment::Diagram { lang, source } = segment {
                diagrams += 1;
                let rendered = registry.render(&lang, &source);
                if let Some(first) = rendered.first()
                    && first.starts_with("[diagram error")
                {
                    diagram_errors.push(format!("{}: {first}", page.id));
                }
            }
        }
    }

    CheckSummary {
        mount_id: config.mount_id.clone(),
        base_url: config.api.base_url.clone(),
        languages,
        doc_pages: docs.pages().len(),
        diagrams,
        diagram_errors,
    }
}

fn print_check(summary: &CheckSummary, as_json: bool) {
    if as_json {
        let languages: Vec<_> = summary
            .languages
            .iter()
            .map(|check| {
                json!({
                    "lng": check.lng,
                    "content": match &check.content {
                        Ok(()) => json!("ok"),
                        Err(error) => json!({ "error": error }),
                    },
                    "remote": match &check.remote {
                        None => json!(null),
                        Some(Ok(keys)) => json!({ "keys": keys }),
                        Some(Err(error)) => json!({ "error": error }),
                    },
                })
            })
            .collect();
        println!(
            "{}",
            json!({
                "status": if summary.is_ok() { "ok" } else { "error" },
                "mount_id": summary.mount_id,
                "base_url": summary.base_url,
                "languages": languages,
                "doc_pages": summary.doc_pages,
                "diagrams": summary.diagrams,
                "diagram_errors": summary.diagram_errors,
            })
        );
        return;
    }

    println!("mount id:   {}", summary.mount_id);
    if summary.base_url.is_empty() {
        println!("locales:    bundled only");
    } else {
        println!("locales:    {}", summary.base_url);
    }
    for check in &summary.languages {
        let content = match &check.content {
            Ok(()) => "content ok".to_string(),
            Err(error) => format!("content FAILED: {error}"),
        };
        let remote = match &check.remote {
            None => String::new(),
            Some(Ok(keys)) => format!(", remote {keys} keys"),
            Some(Err(error)) => format!(", remote unavailable ({error})"),
        };
        println!("  [{}] {content}{remote}", check.lng);
    }
    println!(
        "docs:       {} pages, {} diagrams",
        summary.doc_pages, summary.diagrams
    );
    for error in &summary.diagram_errors {
        println!("  {error}");
    }
}

/// Parse `args` the way the binary would; handy for callers embedding the CLI.
pub fn parse_from<I, T>(args: I) -> std::result::Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
