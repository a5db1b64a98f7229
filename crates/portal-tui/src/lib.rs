#![forbid(unsafe_code)]

//! Terminal front end for the grid portal.
//!
//! [`app::PortalApp`] is an `ftui` model: it turns key and mouse input into
//! portal events, owns the theme, language and docs state, and draws the
//! landing grid or the documentation view each frame.

pub mod app;
pub mod cli;
pub mod diagram;
pub mod layout;
pub mod logging;
pub mod msg;
pub mod palette;
pub mod views;

pub use cli::run_from_env;
