//! Screen geometry and hit testing.
//!
//! Rendering and mouse handling share these rectangles, so a cell is
//! clickable exactly where it is drawn.

use ftui_core::geometry::Rect;
use ftui_layout::{Constraint, Flex};
use ftui_text::display_width;
use portal_core::cell::{CellId, GRID_SIDE};
use portal_core::modal::ModalHit;
use portal_core::portal::Target;

const CELL_MAX_WIDTH: u16 = 18;
const CELL_MAX_HEIGHT: u16 = 5;
const CELL_MIN_WIDTH: u16 = 3;
const TOOLTIP_HEIGHT: u16 = 3;
const MODAL_MAX_WIDTH: u16 = 64;
const MODAL_MAX_HEIGHT: u16 = 16;
const SIDEBAR_WIDTH: u16 = 28;
const BUTTON_GAP: u16 = 2;

/// Label drawn on the modal's top border; clicking it closes the modal.
pub const CLOSE_GLYPH: &str = "[x]";

/// Split the screen into header, body and status rows.
#[must_use]
pub fn frame_regions(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Flex::vertical()
        .constraints([
            Constraint::Fixed(1),
            Constraint::Min(1),
            Constraint::Fixed(1),
        ])
        .split(area);
    (rows[0], rows[1], rows[2])
}

/// Right-aligned header buttons, one rect per label, in label order.
#[must_use]
pub fn header_buttons(header: Rect, labels: &[&str]) -> Vec<Rect> {
    let widths: Vec<u16> = labels
        .iter()
        .map(|label| u16::try_from(display_width(label)).unwrap_or(u16::MAX))
        .collect();
    let gaps = BUTTON_GAP.saturating_mul(u16::try_from(labels.len()).unwrap_or(u16::MAX));
    let total = widths
        .iter()
        .fold(gaps, |sum, width| sum.saturating_add(*width));
    let mut x = header.right().saturating_sub(total);
    widths
        .into_iter()
        .map(|width| {
            let rect = Rect::new(x, header.y, width, header.height.min(1)).intersection(&header);
            x = x.saturating_add(width).saturating_add(BUTTON_GAP);
            rect
        })
        .collect()
}

/// Geometry of the landing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LandingLayout {
    pub header: Rect,
    pub body: Rect,
    pub status: Rect,
    pub grid: Rect,
    pub center: Rect,
    pub tooltip: Rect,
    cell_width: u16,
    cell_height: u16,
}

impl LandingLayout {
    #[must_use]
    pub fn compute(area: Rect) -> Self {
        let (header, body, status) = frame_regions(area);
        let side = u16::from(GRID_SIDE);
        let cell_width = (body.width / side).min(CELL_MAX_WIDTH);
        let cell_height = (body.height.saturating_sub(TOOLTIP_HEIGHT) / side).min(CELL_MAX_HEIGHT);

        if cell_width < CELL_MIN_WIDTH || cell_height == 0 {
            return Self {
                header,
                body,
                status,
                ..Self::default()
            };
        }

        let grid_width = cell_width * side;
        let grid_height = cell_height * side;
        let used_height = grid_height + TOOLTIP_HEIGHT;
        let grid = Rect::new(
            body.x + (body.width - grid_width) / 2,
            body.y + body.height.saturating_sub(used_height) / 2,
            grid_width,
            grid_height,
        );

        // No wider than one cell and shorter than two, so each inner cell
        // keeps a strip outside the center control.
        let center_width = cell_width;
        let center_height = cell_height.clamp(1, 3).min(2 * cell_height - 1);
        let center = Rect::new(
            grid.x + (grid_width - center_width) / 2,
            grid.y + (grid_height - center_height) / 2,
            center_width,
            center_height,
        );
        let tooltip =
            Rect::new(grid.x, grid.bottom(), grid_width, TOOLTIP_HEIGHT).intersection(&body);

        Self {
            header,
            body,
            status,
            grid,
            center,
            tooltip,
            cell_width,
            cell_height,
        }
    }

    /// Whether the body is too small to draw the grid.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.grid.is_empty()
    }

    #[must_use]
    pub fn cell_rect(&self, id: CellId) -> Rect {
        if self.is_degenerate() {
            return Rect::default();
        }
        let (row, col) = id.position();
        Rect::new(
            self.grid.x + u16::from(col) * self.cell_width,
            self.grid.y + u16::from(row) * self.cell_height,
            self.cell_width,
            self.cell_height,
        )
    }

    /// What the pointer at `(x, y)` is over. The center control sits on top
    /// of the four inner cells and wins where they overlap.
    #[must_use]
    pub fn target_at(&self, x: u16, y: u16) -> Option<Target> {
        if self.is_degenerate() || !self.grid.contains(x, y) {
            return None;
        }
        if self.center.contains(x, y) {
            return Some(Target::Center);
        }
        let col = u8::try_from((x - self.grid.x) / self.cell_width).ok()?;
        let row = u8::try_from((y - self.grid.y) / self.cell_height).ok()?;
        CellId::from_position(row, col).map(Target::Cell)
    }

    #[must_use]
    pub fn in_grid(&self, x: u16, y: u16) -> bool {
        !self.is_degenerate() && self.grid.contains(x, y)
    }
}

/// Centered modal box for a screen of size `area`.
#[must_use]
pub fn modal_rect(area: Rect) -> Rect {
    let width = MODAL_MAX_WIDTH.min(area.width.saturating_sub(4));
    let height = MODAL_MAX_HEIGHT.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

/// Where the close glyph is drawn on the modal's top border.
#[must_use]
pub fn close_button_rect(modal: Rect) -> Rect {
    let width = u16::try_from(CLOSE_GLYPH.len()).unwrap_or(3);
    if modal.width < width + 4 {
        return Rect::default();
    }
    Rect::new(modal.right() - width - 2, modal.y, width, 1)
}

/// Classify a click against an open modal.
#[must_use]
pub fn modal_hit(modal: Rect, x: u16, y: u16) -> ModalHit {
    if close_button_rect(modal).contains(x, y) {
        ModalHit::CloseButton
    } else if modal.contains(x, y) {
        ModalHit::Body
    } else {
        ModalHit::Backdrop
    }
}

/// Geometry of the documentation view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WikiLayout {
    pub header: Rect,
    pub sidebar: Rect,
    pub content: Rect,
    pub status: Rect,
}

impl WikiLayout {
    #[must_use]
    pub fn compute(area: Rect) -> Self {
        let (header, body, status) = frame_regions(area);
        let columns = Flex::horizontal()
            .constraints([Constraint::Fixed(SIDEBAR_WIDTH), Constraint::Min(1)])
            .split(body);
        Self {
            header,
            sidebar: columns[0],
            content: columns[1],
            status,
        }
    }

    /// Index of the page listed at row `y` of the sidebar, which draws one
    /// page per row inside a one-cell border.
    #[must_use]
    pub fn page_at(&self, x: u16, y: u16, page_count: usize) -> Option<usize> {
        if !self.sidebar.contains(x, y) || y <= self.sidebar.y {
            return None;
        }
        let index = usize::from(y - self.sidebar.y - 1);
        (index < page_count).then_some(index)
    }

    /// Rows of document text visible at once.
    #[must_use]
    pub fn viewport_height(&self) -> u16 {
        self.content.height.saturating_sub(2)
    }
}
