//! Drawing for the two routes. Views are pure functions of app state;
//! geometry comes from [`crate::layout`] so hit testing matches.

pub mod landing;
pub mod wiki;

use ftui_core::geometry::Rect;
use ftui_render::cell::Cell;
use ftui_render::frame::Frame;
use ftui_style::StyleFlags;
use ftui_widgets::Widget;
use ftui_widgets::paragraph::Paragraph;
use ftui_widgets::status_line::{StatusItem, StatusLine};

use crate::layout::header_buttons;
use crate::palette::Palette;

/// Something a header button does when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    Wiki,
    Language,
    Theme,
    Back,
}

/// A header button label and its action.
pub type HeaderButton = (HeaderAction, String);

/// Which header button, if any, sits at `(x, y)`.
#[must_use]
pub fn header_action_at(
    header: Rect,
    buttons: &[HeaderButton],
    x: u16,
    y: u16,
) -> Option<HeaderAction> {
    let labels: Vec<&str> = buttons.iter().map(|(_, label)| label.as_str()).collect();
    header_buttons(header, &labels)
        .into_iter()
        .zip(buttons)
        .find(|(rect, _)| rect.contains(x, y))
        .map(|(_, (action, _))| *action)
}

pub(crate) fn fill(frame: &mut Frame, area: Rect, palette: &Palette) {
    frame.buffer.fill(
        area,
        Cell::default().with_bg(palette.bg).with_fg(palette.text),
    );
}

pub(crate) fn render_header(
    frame: &mut Frame,
    header: Rect,
    title: &str,
    buttons: &[HeaderButton],
    palette: &Palette,
) {
    Paragraph::new(format!(" {title}"))
        .style(palette.header().attrs(StyleFlags::BOLD))
        .render(header, frame);

    let labels: Vec<&str> = buttons.iter().map(|(_, label)| label.as_str()).collect();
    for (rect, label) in header_buttons(header, &labels).into_iter().zip(labels) {
        Paragraph::new(label.to_string())
            .style(palette.header_button())
            .render(rect, frame);
    }
}

pub(crate) fn render_status(
    frame: &mut Frame,
    area: Rect,
    left: &str,
    hints: &[(&str, String)],
    palette: &Palette,
) {
    let mut status = StatusLine::new()
        .style(palette.status_bar())
        .separator("  ")
        .left(StatusItem::text(left));
    for (key, action) in hints {
        status = status.right(StatusItem::key_hint(key, action));
    }
    status.render(area, frame);
}

/// Darken everything already drawn in `area`, for modal backdrops.
pub(crate) fn dim(frame: &mut Frame, area: Rect, palette: &Palette) {
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            if let Some(cell) = frame.buffer.get_mut(x, y) {
                cell.fg = palette.muted;
                cell.bg = palette.backdrop();
            }
        }
    }
}
