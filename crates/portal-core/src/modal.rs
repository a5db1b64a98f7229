//! Detail modal for outer cells.

use tracing::debug;

use crate::catalog::{OuterCatalog, OuterContent};
use crate::cell::CellId;

/// Where a click landed relative to an open modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalHit {
    Body,
    CloseButton,
    Backdrop,
}

impl ModalHit {
    /// Whether this click dismisses the modal.
    #[must_use]
    pub const fn closes(self) -> bool {
        matches!(self, Self::CloseButton | Self::Backdrop)
    }
}

/// `Idle` while `open` is `None`, `Detailed` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OuterDetail {
    open: Option<CellId>,
}

impl OuterDetail {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the modal for `id`. Blurred cells and cells without content are
    /// ignored. Returns whether the modal opened.
    pub fn open(&mut self, id: CellId, visible: bool, catalog: &OuterCatalog) -> bool {
        if !visible {
            debug!(cell = id.get(), "click on blurred outer cell ignored");
            return false;
        }
        if catalog.get(id).is_none() {
            debug!(cell = id.get(), "outer cell has no content");
            return false;
        }
        debug!(cell = id.get(), "outer modal opened");
        self.open = Some(id);
        true
    }

    pub fn close(&mut self) {
        if let Some(id) = self.open.take() {
            debug!(cell = id.get(), "outer modal closed");
        }
    }

    /// Apply a click classified against the modal rectangle.
    pub fn click(&mut self, hit: ModalHit) {
        if hit.closes() {
            self.close();
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    #[must_use]
    pub fn open_id(&self) -> Option<CellId> {
        self.open
    }

    /// Content of the open cell in `catalog`.
    #[must_use]
    pub fn content<'a>(&self, catalog: &'a OuterCatalog) -> Option<&'a OuterContent> {
        self.open.and_then(|id| catalog.get(id))
    }
}
