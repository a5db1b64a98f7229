//! The grid, its center control, tooltips and the two modals.

use ftui_core::geometry::Rect;
use ftui_render::cell::Cell;
use ftui_render::frame::Frame;
use ftui_text::WrapMode;
use ftui_text::text::{Line, Span, Text};
use ftui_widgets::Widget;
use ftui_widgets::block::{Alignment, Block};
use ftui_widgets::borders::{BorderType, Borders};
use ftui_widgets::paragraph::Paragraph;
use portal_core::catalog::CenterState;
use portal_core::cell::CellId;
use portal_core::grid::CellTag;
use portal_core::i18n::Translator;
use portal_core::portal::{OpenModal, Portal, Target};
use portal_core::theme::ThemeToggle;

use super::{HeaderAction, HeaderButton, dim, fill, render_header, render_status};
use crate::layout::{CLOSE_GLYPH, LandingLayout, close_button_rect, modal_rect};
use crate::palette::Palette;

const BLUR_GLYPH: char = '░';
const CENTER_GLYPH: &str = "✦";

/// Everything the landing view reads.
pub struct LandingView<'a> {
    pub portal: &'a Portal,
    pub translator: &'a Translator,
    pub theme: &'a ThemeToggle,
    pub palette: &'a Palette,
    pub focus: Target,
}

/// Header buttons in display order. The theme button only exists while
/// dark mode is enabled.
#[must_use]
pub fn header_buttons(translator: &Translator, theme: &ThemeToggle) -> Vec<HeaderButton> {
    let mut buttons = vec![
        (HeaderAction::Wiki, translator.t("header.wiki")),
        (
            HeaderAction::Language,
            translator.t_with(
                "header.language",
                &[("lng", translator.resolved_language())],
            ),
        ),
    ];
    if theme.is_enabled() {
        buttons.push((HeaderAction::Theme, translator.t(theme.action_key())));
    }
    buttons
}

pub fn render(view: &LandingView<'_>, frame: &mut Frame, area: Rect) {
    let palette = view.palette;
    let layout = LandingLayout::compute(area);
    fill(frame, area, palette);

    render_header(
        frame,
        layout.header,
        &view.translator.t("header.title"),
        &header_buttons(view.translator, view.theme),
        palette,
    );

    if layout.is_degenerate() {
        Paragraph::new("Terminal too small")
            .style(palette.muted())
            .alignment(Alignment::Center)
            .render(layout.body, frame);
    } else {
        for id in CellId::all() {
            render_cell(view, &layout, frame, id);
        }
        render_center(view, &layout, frame);
        render_tooltip(view, &layout, frame);
    }

    render_landing_status(view, frame, layout.status);

    match view.portal.open_modal() {
        Some(OpenModal::Center) => {
            if let Some(state) = view.portal.center_modal() {
                dim(frame, area, palette);
                render_center_modal(view, frame, area, state);
            }
        }
        Some(OpenModal::Outer(_)) => {
            if let Some(content) = view.portal.outer_modal() {
                dim(frame, area, palette);
                let body = Text::raw(&content.modal_body);
                render_modal(view, frame, area, &content.tooltip_title, body);
            }
        }
        None => {}
    }
}

fn cell_block<'a>(palette: &Palette, focused: bool) -> Block<'a> {
    let block = Block::new().borders(Borders::ALL);
    if focused {
        block
            .border_type(BorderType::Double)
            .border_style(palette.focus())
    } else {
        block.border_type(BorderType::Rounded)
    }
}

fn render_cell(view: &LandingView<'_>, layout: &LandingLayout, frame: &mut Frame, id: CellId) {
    let palette = view.palette;
    let rect = layout.cell_rect(id);
    let tags = view.portal.render_tags(id);
    let focused = view.focus == Target::Cell(id);
    let block = cell_block(palette, focused);

    if tags.contains(CellTag::Outer) {
        if tags.contains(CellTag::Visible) {
            let hovered = view.portal.hovered_outer() == Some(id);
            let style = if hovered {
                palette.outer_visible().attrs(ftui_style::StyleFlags::BOLD)
            } else {
                palette.outer_visible()
            };
            let block = block.style(style);
            let inner = block.inner(rect);
            block.render(rect, frame);
            let label = view
                .portal
                .outer_catalog()
                .get(id)
                .map(|content| content.label.clone())
                .unwrap_or_default();
            Paragraph::new(label)
                .style(style)
                .alignment(Alignment::Center)
                .wrap(WrapMode::Word)
                .render(inner, frame);
        } else {
            let block = block.style(palette.outer_blurred());
            let inner = block.inner(rect);
            block.render(rect, frame);
            frame.buffer.fill(
                inner,
                Cell::from_char(BLUR_GLYPH)
                    .with_fg(palette.border)
                    .with_bg(palette.bg),
            );
        }
        return;
    }

    let style = if tags.contains(CellTag::Active) {
        palette.inner_active()
    } else {
        palette.inner()
    };
    let block = block.style(style);
    let inner = block.inner(rect);
    block.render(rect, frame);

    let mut topic = view.portal.topic(id).to_string();
    if view.portal.grid().hovered_inner() == Some(id) {
        topic = format!("› {topic} ‹");
    }
    // Keep the label in the top row so the center control does not hide it.
    Paragraph::new(topic)
        .style(style)
        .alignment(Alignment::Center)
        .render(Rect::new(inner.x, inner.y, inner.width, inner.height.min(1)), frame);
}

fn render_center(view: &LandingView<'_>, layout: &LandingLayout, frame: &mut Frame) {
    let palette = view.palette;
    let style = palette.center();
    let focused = view.focus == Target::Center;
    let block = cell_block(palette, focused).style(style);
    let inner = block.inner(layout.center);
    block.render(layout.center, frame);
    if !inner.is_empty() {
        Paragraph::new(CENTER_GLYPH)
            .style(style)
            .alignment(Alignment::Center)
            .render(inner, frame);
    }
}

fn render_tooltip(view: &LandingView<'_>, layout: &LandingLayout, frame: &mut Frame) {
    let text = match (view.portal.center_tooltip(), view.portal.outer_tooltip()) {
        (Some(state), _) => state.title.clone(),
        (None, Some(content)) => content.tooltip_title.clone(),
        (None, None) => return,
    };
    let palette = view.palette;
    let block = Block::new()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(palette.tooltip());
    let inner = block.inner(layout.tooltip);
    block.render(layout.tooltip, frame);
    Paragraph::new(text)
        .style(palette.tooltip())
        .alignment(Alignment::Center)
        .render(inner, frame);
}

fn render_landing_status(view: &LandingView<'_>, frame: &mut Frame, area: Rect) {
    let t = view.translator;
    let mut hints = if view.portal.is_modal_open() {
        vec![("Esc", t.t("status.close"))]
    } else {
        vec![
            ("←↑↓→", t.t("status.move")),
            ("Enter", t.t("status.pin")),
            ("c", t.t("status.preview")),
            ("o", t.t("status.open")),
            ("w", t.t("status.wiki")),
            ("l", t.t("status.language")),
        ]
    };
    if view.theme.is_enabled() {
        hints.push(("t", t.t("status.theme")));
    }
    hints.push(("q", t.t("status.quit")));
    let left = format!(" {}", view.translator.resolved_language());
    render_status(frame, area, &left, &hints, view.palette);
}

fn render_center_modal(view: &LandingView<'_>, frame: &mut Frame, area: Rect, state: &CenterState) {
    let palette = view.palette;
    let mut body = Text::new();
    if state.kind.shows_description()
        && let Some(description) = &state.description
    {
        for line in description.lines() {
            body.push_line(Line::raw(line));
        }
    }
    if !state.links.is_empty() {
        if !body.is_empty() {
            body.push_line(Line::raw(""));
        }
        for link in &state.links {
            body.push_line(Line::from_spans([
                Span::raw("→ "),
                Span::styled(link.label.clone(), palette.link()),
                Span::styled(format!("  {}", link.url), palette.muted()),
            ]));
        }
    }
    render_modal(view, frame, area, &state.title, body);
}

fn render_modal(view: &LandingView<'_>, frame: &mut Frame, area: Rect, title: &str, body: Text) {
    let palette = view.palette;
    let modal = modal_rect(area);
    if modal.is_empty() {
        return;
    }
    frame.buffer.fill(
        modal,
        Cell::default().with_bg(palette.surface).with_fg(palette.text),
    );
    let block = Block::new()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .title_alignment(Alignment::Left)
        .style(palette.modal())
        .border_style(palette.title());
    let inner = block.inner(modal);
    block.render(modal, frame);

    let close = close_button_rect(modal);
    if !close.is_empty() {
        Paragraph::new(CLOSE_GLYPH)
            .style(palette.error())
            .render(close, frame);
    }

    let body_area = Rect::new(
        inner.x + 1,
        inner.y + 1,
        inner.width.saturating_sub(2),
        inner.height.saturating_sub(1),
    );
    Paragraph::new(body)
        .style(palette.modal())
        .wrap(WrapMode::Word)
        .render(body_area, frame);
}
