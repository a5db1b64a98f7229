#![forbid(unsafe_code)]

//! Core state and content for the grid portal.
//!
//! A 4x4 grid whose four inner cells reveal groups of outer cells on hover
//! or click, a center control that picks a random state and shows it in a
//! modal, and the configuration, theme, translation and documentation
//! layers around them.
//!
//! # How it fits in the system
//! `portal-core` owns every state machine and all content loading. It has no
//! terminal dependency; `portal-tui` maps terminal input onto
//! [`portal::PortalEvent`]s and draws the derived state each frame.

pub mod catalog;
pub mod cell;
pub mod config;
pub mod docs;
pub mod error;
pub mod grid;
pub mod i18n;
pub mod modal;
pub mod picker;
pub mod portal;
pub mod route;
pub mod theme;

pub use catalog::{CenterCatalog, CenterKind, CenterState, ContentSet, OuterCatalog, OuterContent};
pub use cell::{CellId, GridLayout, Role};
pub use config::{AppConfig, ConfigOverrides, ConfigSlot};
pub use error::{PortalError, Result};
pub use grid::{CellTag, CellTags, GridEngine};
pub use i18n::{LocaleBundle, LocaleSource, Translator, detect_language};
pub use modal::{ModalHit, OuterDetail};
pub use picker::{CenterPicker, PickerPhase};
pub use portal::{OpenModal, Portal, PortalEvent, Target};
pub use route::{Navigator, Route};
pub use theme::{ThemeMode, ThemeToggle};
