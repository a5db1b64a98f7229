//! The landing portal: grid engine, center picker and outer detail modal
//! behind one event entry point.

use rand::rngs::SmallRng;
use tracing::debug;

use crate::catalog::{CenterState, ContentSet, OuterCatalog, OuterContent, TopicCatalog};
use crate::cell::{CellId, GridLayout, Role};
use crate::grid::{CellTags, GridEngine};
use crate::modal::{ModalHit, OuterDetail};
use crate::picker::{CenterPicker, PickerPhase};

/// Something the pointer can be over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Cell(CellId),
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalEvent {
    Enter(Target),
    Leave(Target),
    Click(Target),
    GridLeave,
    ModalClick(ModalHit),
    CloseModal,
}

/// Which modal, if any, covers the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenModal {
    Center,
    Outer(CellId),
}

#[derive(Debug, Clone)]
pub struct Portal {
    grid: GridEngine,
    picker: CenterPicker,
    detail: OuterDetail,
    outer: OuterCatalog,
    topics: TopicCatalog,
    hovered_outer: Option<CellId>,
}

impl Portal {
    #[must_use]
    pub fn new(layout: GridLayout, content: ContentSet) -> Self {
        let ContentSet {
            center,
            outer,
            topics,
        } = content;
        Self::assemble(layout, CenterPicker::new(center), outer, topics)
    }

    /// Deterministic variant for tests and replays.
    #[must_use]
    pub fn with_rng(layout: GridLayout, content: ContentSet, rng: SmallRng) -> Self {
        let ContentSet {
            center,
            outer,
            topics,
        } = content;
        Self::assemble(layout, CenterPicker::with_rng(center, rng), outer, topics)
    }

    fn assemble(
        layout: GridLayout,
        picker: CenterPicker,
        outer: OuterCatalog,
        topics: TopicCatalog,
    ) -> Self {
        Self {
            grid: GridEngine::new(layout),
            picker,
            detail: OuterDetail::new(),
            outer,
            topics,
            hovered_outer: None,
        }
    }

    /// Swap the catalogs after a language change; interaction state is kept.
    pub fn set_content(&mut self, content: ContentSet) {
        self.picker.replace_catalog(content.center);
        self.outer = content.outer;
        self.topics = content.topics;
        if let Some(id) = self.detail.open_id()
            && self.outer.get(id).is_none()
        {
            self.detail.close();
        }
    }

    #[must_use]
    pub fn layout(&self) -> &GridLayout {
        self.grid.layout()
    }

    #[must_use]
    pub fn grid(&self) -> &GridEngine {
        &self.grid
    }

    #[must_use]
    pub fn picker(&self) -> &CenterPicker {
        &self.picker
    }

    #[must_use]
    pub fn outer_catalog(&self) -> &OuterCatalog {
        &self.outer
    }

    #[must_use]
    pub fn topic(&self, id: CellId) -> &str {
        self.topics.topic(id)
    }

    #[must_use]
    pub fn open_modal(&self) -> Option<OpenModal> {
        if self.picker.is_modal_open() {
            Some(OpenModal::Center)
        } else {
            self.detail.open_id().map(OpenModal::Outer)
        }
    }

    #[must_use]
    pub fn is_modal_open(&self) -> bool {
        self.open_modal().is_some()
    }

    #[must_use]
    pub fn center_phase(&self) -> PickerPhase {
        self.picker.phase()
    }

    #[must_use]
    pub fn center_tooltip(&self) -> Option<&CenterState> {
        self.picker.tooltip()
    }

    #[must_use]
    pub fn center_modal(&self) -> Option<&CenterState> {
        self.picker.modal()
    }

    #[must_use]
    pub fn outer_modal(&self) -> Option<&OuterContent> {
        self.detail.content(&self.outer)
    }

    #[must_use]
    pub fn hovered_outer(&self) -> Option<CellId> {
        self.hovered_outer
    }

    /// Tooltip record for the hovered outer cell, shown only while visible.
    #[must_use]
    pub fn outer_tooltip(&self) -> Option<&OuterContent> {
        self.hovered_outer
            .filter(|id| self.grid.is_outer_visible(*id))
            .and_then(|id| self.outer.get(id))
    }

    #[must_use]
    pub fn is_outer_visible(&self, id: CellId) -> bool {
        self.grid.is_outer_visible(id)
    }

    #[must_use]
    pub fn render_tags(&self, id: CellId) -> CellTags {
        self.grid.render_tags(id)
    }

    /// Feed one event through the state machines.
    pub fn handle(&mut self, event: PortalEvent) {
        if let Some(modal) = self.open_modal() {
            match event {
                PortalEvent::ModalClick(hit) => match modal {
                    OpenModal::Center => match hit {
                        // Clicks inside the modal body never close it.
                        ModalHit::Body => {}
                        ModalHit::CloseButton => self.picker.close(),
                        ModalHit::Backdrop => self.picker.backdrop_click(),
                    },
                    OpenModal::Outer(_) => self.detail.click(hit),
                },
                PortalEvent::CloseModal => match modal {
                    OpenModal::Center => self.picker.close(),
                    OpenModal::Outer(_) => self.detail.close(),
                },
                other => debug!(event = ?other, "grid event ignored under modal"),
            }
            return;
        }

        match event {
            PortalEvent::Enter(Target::Center) => self.picker.hover(),
            PortalEvent::Leave(Target::Center) => self.picker.leave(),
            PortalEvent::Click(Target::Center) => self.picker.click(),
            PortalEvent::Enter(Target::Cell(id)) => self.enter_cell(id),
            PortalEvent::Leave(Target::Cell(id)) => self.leave_cell(id),
            PortalEvent::Click(Target::Cell(id)) => self.click_cell(id),
            PortalEvent::GridLeave => {
                self.hovered_outer = None;
                self.picker.grid_leave();
            }
            PortalEvent::ModalClick(_) | PortalEvent::CloseModal => {}
        }
    }

    fn enter_cell(&mut self, id: CellId) {
        match self.grid.layout().role(id) {
            Role::Inner => {
                self.grid.on_inner_hover_enter(id);
            }
            Role::Outer => {
                if self.grid.is_outer_visible(id) {
                    self.hovered_outer = Some(id);
                }
            }
        }
    }

    fn leave_cell(&mut self, id: CellId) {
        match self.grid.layout().role(id) {
            Role::Inner => {
                self.grid.on_inner_hover_leave(id);
            }
            Role::Outer => {
                if self.hovered_outer == Some(id) {
                    self.hovered_outer = None;
                }
            }
        }
    }

    fn click_cell(&mut self, id: CellId) {
        match self.grid.layout().role(id) {
            Role::Inner => {
                self.grid.on_inner_click(id);
            }
            Role::Outer => {
                let visible = self.grid.is_outer_visible(id);
                if self.detail.open(id, visible, &self.outer) {
                    self.hovered_outer = None;
                }
            }
        }
    }

    /// Back to mount-time state; catalogs are kept.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.picker.reset();
        self.detail.close();
        self.hovered_outer = None;
    }
}
