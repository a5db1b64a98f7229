//! Random center-state picker and the center modal lifecycle.
//!
//! ```text
//!            hover                      click
//!   Idle ──────────▶ Previewing ──────────────▶ Detailed
//!    ▲  ◀──────────      │ hover (re-roll)        │
//!    │     leave         ▼                        │ close / backdrop
//!    └────────────────────────────────────────────┘
//! ```
//!
//! A click from `Idle` goes straight to `Detailed`. Closing the modal also
//! drops the held pick, so the next hover never flashes a stale tooltip.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::catalog::{CenterCatalog, CenterState};
use crate::error::{PortalError, Result};

/// Pick uniformly from `states`, excluding `previous` when more than one
/// state is available.
pub fn pick_from_slice<'a, R: Rng + ?Sized>(
    states: &'a [CenterState],
    previous: Option<&str>,
    rng: &mut R,
) -> Result<&'a CenterState> {
    if states.is_empty() {
        return Err(PortalError::EmptyCatalog {
            catalog: "center states",
        });
    }
    let pool: Vec<&CenterState> = match previous {
        Some(previous) if states.len() > 1 => states
            .iter()
            .filter(|state| state.id != previous)
            .collect(),
        _ => states.iter().collect(),
    };
    // `previous` may name an id the catalog no longer has.
    let pool = if pool.is_empty() {
        states.iter().collect()
    } else {
        pool
    };
    Ok(pool[rng.random_range(0..pool.len())])
}

/// [`pick_from_slice`] over a catalog, which is never empty.
pub fn pick_random_state<'a, R: Rng + ?Sized>(
    catalog: &'a CenterCatalog,
    previous: Option<&str>,
    rng: &mut R,
) -> Result<&'a CenterState> {
    pick_from_slice(catalog.states(), previous, rng)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerPhase {
    Idle,
    Previewing,
    Detailed,
}

#[derive(Debug, Clone)]
pub struct CenterPicker {
    catalog: CenterCatalog,
    current: Option<String>,
    modal_open: bool,
    rng: SmallRng,
}

impl CenterPicker {
    #[must_use]
    pub fn new(catalog: CenterCatalog) -> Self {
        Self::with_rng(catalog, SmallRng::from_os_rng())
    }

    #[must_use]
    pub fn with_rng(catalog: CenterCatalog, rng: SmallRng) -> Self {
        Self {
            catalog,
            current: None,
            modal_open: false,
            rng,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &CenterCatalog {
        &self.catalog
    }

    /// Swap in a catalog built for another language. The held pick survives
    /// when its id still exists.
    pub fn replace_catalog(&mut self, catalog: CenterCatalog) {
        if let Some(id) = &self.current
            && catalog.get(id).is_none()
        {
            self.current = None;
            self.modal_open = false;
        }
        self.catalog = catalog;
    }

    #[must_use]
    pub fn phase(&self) -> PickerPhase {
        match (&self.current, self.modal_open) {
            (Some(_), true) => PickerPhase::Detailed,
            (Some(_), false) => PickerPhase::Previewing,
            (None, _) => PickerPhase::Idle,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&CenterState> {
        self.current.as_deref().and_then(|id| self.catalog.get(id))
    }

    /// The held pick while previewing; hidden once the modal is open.
    #[must_use]
    pub fn tooltip(&self) -> Option<&CenterState> {
        if self.modal_open {
            None
        } else {
            self.current()
        }
    }

    /// The pick shown in the modal, if open.
    #[must_use]
    pub fn modal(&self) -> Option<&CenterState> {
        if self.modal_open {
            self.current()
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_modal_open(&self) -> bool {
        self.modal_open && self.current.is_some()
    }

    fn roll(&mut self, previous: Option<String>) {
        match pick_random_state(&self.catalog, previous.as_deref(), &mut self.rng) {
            Ok(state) => {
                debug!(state = %state.id, ?previous, "center pick");
                self.current = Some(state.id.clone());
            }
            Err(error) => debug!(%error, "center pick refused"),
        }
    }

    /// Enter the center control; re-rolls against the held pick.
    pub fn hover(&mut self) {
        if self.modal_open {
            return;
        }
        let previous = self.current.take();
        self.roll(previous);
    }

    /// Leave the center control while previewing.
    pub fn leave(&mut self) {
        if !self.modal_open && self.current.take().is_some() {
            debug!("center preview cleared");
        }
    }

    /// Open the modal, keeping the held pick or rolling a fresh one.
    pub fn click(&mut self) {
        if self.modal_open {
            return;
        }
        if self.current.is_none() {
            self.roll(None);
        }
        if self.current.is_some() {
            debug!("center modal opened");
            self.modal_open = true;
        }
    }

    /// Explicit close: drops both the modal and the held pick.
    pub fn close(&mut self) {
        if self.modal_open || self.current.is_some() {
            debug!("center modal closed");
        }
        self.modal_open = false;
        self.current = None;
    }

    pub fn backdrop_click(&mut self) {
        if self.modal_open {
            self.close();
        }
    }

    /// Pointer left the whole grid; clears the preview unless a modal is open.
    pub fn grid_leave(&mut self) {
        if !self.modal_open {
            self.current = None;
        }
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.modal_open = false;
    }
}
