//! Grid interaction engine.
//!
//! # Invariants
//!
//! 1. `hovered_inner`, when present, is always an inner-role id.
//! 2. `toggled_inner` only contains inner-role ids; membership is the only
//!    meaning (order is irrelevant).
//! 3. Outer visibility is never stored. [`GridEngine::is_outer_visible`]
//!    recomputes it from hover and toggle state on every call.
//!
//! # Failure Modes
//!
//! | Event | Cause | Behavior |
//! |-------|-------|----------|
//! | Hover/click on an outer cell | Outer cells are inert here | No-op, returns `false` |
//! | Leave for a cell that is not hovered | Late event after fast pointer movement | No-op |

use std::collections::BTreeSet;

use tracing::debug;

use crate::cell::{CellId, GridLayout, Role};

/// Decoration tag derived for a cell at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellTag {
    Outer,
    Inner,
    Visible,
    Blurred,
    Active,
}

impl CellTag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Outer => "outer",
            Self::Inner => "inner",
            Self::Visible => "visible",
            Self::Blurred => "blurred",
            Self::Active => "active",
        }
    }
}

/// The set of tags applied to one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellTags(BTreeSet<CellTag>);

impl CellTags {
    #[must_use]
    pub fn contains(&self, tag: CellTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = CellTag> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<CellTag> for CellTags {
    fn from_iter<I: IntoIterator<Item = CellTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone)]
pub struct GridEngine {
    layout: GridLayout,
    hovered_inner: Option<CellId>,
    toggled_inner: BTreeSet<CellId>,
}

impl GridEngine {
    #[must_use]
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            hovered_inner: None,
            toggled_inner: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    #[must_use]
    pub fn hovered_inner(&self) -> Option<CellId> {
        self.hovered_inner
    }

    #[must_use]
    pub fn toggled_inner(&self) -> &BTreeSet<CellId> {
        &self.toggled_inner
    }

    #[must_use]
    pub fn is_toggled(&self, id: CellId) -> bool {
        self.toggled_inner.contains(&id)
    }

    /// Returns whether the state changed.
    pub fn on_inner_hover_enter(&mut self, id: CellId) -> bool {
        if !self.layout.is_inner(id) || self.hovered_inner == Some(id) {
            return false;
        }
        debug!(cell = id.get(), "inner hover enter");
        self.hovered_inner = Some(id);
        true
    }

    /// Clears the hover only when `id` is the currently hovered cell.
    pub fn on_inner_hover_leave(&mut self, id: CellId) -> bool {
        if self.hovered_inner != Some(id) {
            return false;
        }
        debug!(cell = id.get(), "inner hover leave");
        self.hovered_inner = None;
        true
    }

    /// Toggles membership of `id` in the pinned set.
    pub fn on_inner_click(&mut self, id: CellId) -> bool {
        if !self.layout.is_inner(id) {
            return false;
        }
        let pinned = if self.toggled_inner.remove(&id) {
            false
        } else {
            self.toggled_inner.insert(id);
            true
        };
        debug!(cell = id.get(), pinned, "inner toggle");
        true
    }

    /// An outer cell is visible iff one of its owning inner cells is hovered
    /// or toggled. Inner cells are never "visible" in this sense.
    #[must_use]
    pub fn is_outer_visible(&self, outer: CellId) -> bool {
        if !self.layout.is_outer(outer) {
            return false;
        }
        self.layout
            .owners(outer)
            .any(|inner| self.hovered_inner == Some(inner) || self.toggled_inner.contains(&inner))
    }

    /// Outer cells currently visible, ascending.
    #[must_use]
    pub fn visible_outer(&self) -> Vec<CellId> {
        self.layout
            .outer_ids()
            .filter(|id| self.is_outer_visible(*id))
            .collect()
    }

    #[must_use]
    pub fn render_tags(&self, id: CellId) -> CellTags {
        match self.layout.role(id) {
            Role::Outer => {
                let decoration = if self.is_outer_visible(id) {
                    CellTag::Visible
                } else {
                    CellTag::Blurred
                };
                [CellTag::Outer, decoration].into_iter().collect()
            }
            Role::Inner => {
                let mut tags = vec![CellTag::Inner];
                if self.toggled_inner.contains(&id) {
                    tags.push(CellTag::Active);
                }
                tags.into_iter().collect()
            }
        }
    }

    /// Back to mount-time defaults.
    pub fn reset(&mut self) {
        self.hovered_inner = None;
        self.toggled_inner.clear();
    }
}

impl Default for GridEngine {
    fn default() -> Self {
        Self::new(GridLayout::default())
    }
}
