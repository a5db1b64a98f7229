//! Log file setup.
//!
//! The terminal belongs to the UI, so every `tracing` event goes to a file.
//! The filter comes from `PORTAL_LOG` (same syntax as `RUST_LOG`) and
//! defaults to `info`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use portal_core::error::{PortalError, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

pub const LOG_ENV: &str = "PORTAL_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

#[must_use]
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("portal.log")
}

/// Filter from `PORTAL_LOG`, or `info` when it is unset or unparsable.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber appending to `path`.
///
/// Fails when the file cannot be opened or a subscriber is already set.
pub fn init(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(layer)
        .try_init()
        .map_err(|error| PortalError::Io(std::io::Error::other(error)))
}
