//! Documentation route: page list on the left, rendered page on the right.

use ftui_core::geometry::Rect;
use ftui_extras::markdown::{MarkdownRenderer, MarkdownTheme};
use ftui_render::frame::Frame;
use ftui_style::StyleFlags;
use ftui_text::WrapMode;
use ftui_text::text::{Line, Span, Text};
use ftui_widgets::Widget;
use ftui_widgets::block::Block;
use ftui_widgets::borders::{BorderType, Borders};
use ftui_widgets::paragraph::Paragraph;
use portal_core::docs::{DiagramRegistry, DocPage, DocSegment};
use portal_core::i18n::Translator;
use portal_core::theme::ThemeToggle;

use super::{HeaderAction, HeaderButton, fill, render_header, render_status};
use crate::layout::WikiLayout;
use crate::palette::Palette;

/// Everything the wiki view reads.
pub struct WikiView<'a> {
    pub pages: &'a [DocPage],
    pub selected: usize,
    pub scroll: u16,
    pub document: &'a Text,
    pub translator: &'a Translator,
    pub theme: &'a ThemeToggle,
    pub palette: &'a Palette,
}

#[must_use]
pub fn header_buttons(translator: &Translator, theme: &ThemeToggle) -> Vec<HeaderButton> {
    let mut buttons = vec![
        (HeaderAction::Back, translator.t("wiki.back")),
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

fn markdown_theme(palette: &Palette) -> MarkdownTheme {
    MarkdownTheme {
        h1: palette.title().attrs(StyleFlags::BOLD | StyleFlags::UNDERLINE),
        h2: palette.title(),
        h3: palette.base().fg(palette.secondary).attrs(StyleFlags::BOLD),
        h4: palette.base().fg(palette.secondary),
        h5: palette.muted().attrs(StyleFlags::BOLD),
        h6: palette.muted(),
        code_inline: palette.base().fg(palette.highlight),
        code_block: palette.base().fg(palette.success),
        blockquote: palette.muted().attrs(StyleFlags::ITALIC),
        link: palette.link(),
        emphasis: palette.base().attrs(StyleFlags::ITALIC),
        strong: palette.base().attrs(StyleFlags::BOLD),
        strikethrough: palette.muted().attrs(StyleFlags::STRIKETHROUGH),
        list_bullet: palette.base().fg(palette.primary),
        horizontal_rule: palette.border(),
        ..MarkdownTheme::default()
    }
}

/// Render one page into styled text. Diagram fences go through the
/// registry; everything else through the markdown renderer.
#[must_use]
pub fn document_text(page: &DocPage, registry: &DiagramRegistry, palette: &Palette) -> Text {
    let renderer = MarkdownRenderer::new(markdown_theme(palette));
    let diagram_style = palette.base().fg(palette.success);
    let mut lines: Vec<Line> = Vec::new();
    for segment in registry.split(page.content) {
        match segment {
            DocSegment::Markdown(markdown) => {
                lines.extend(renderer.render(&markdown).lines().iter().cloned());
            }
            DocSegment::Diagram { lang, source } => {
                lines.push(Line::from_spans([Span::styled(
                    format!("┌ {lang}"),
                    palette.muted(),
                )]));
                for line in registry.render(&lang, &source) {
                    lines.push(Line::from_spans([
                        Span::styled("│ ", palette.muted()),
                        Span::styled(line, diagram_style),
                    ]));
                }
                lines.push(Line::styled("└", palette.muted()));
                lines.push(Line::raw(""));
            }
        }
    }
    Text::from_lines(lines)
}

/// Largest scroll offset that still fills the viewport.
#[must_use]
pub fn max_scroll(document: &Text, viewport: u16) -> u16 {
    u16::try_from(document.height())
        .unwrap_or(u16::MAX)
        .saturating_sub(viewport)
}

pub fn render(view: &WikiView<'_>, frame: &mut Frame, area: Rect) {
    let palette = view.palette;
    let layout = WikiLayout::compute(area);
    fill(frame, area, palette);

    render_header(
        frame,
        layout.header,
        &view.translator.t("wiki.title"),
        &header_buttons(view.translator, view.theme),
        palette,
    );

    let sidebar = Block::new()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border())
        .style(palette.base());
    let list_area = sidebar.inner(layout.sidebar);
    sidebar.render(layout.sidebar, frame);
    for (index, page) in view.pages.iter().enumerate() {
        let Ok(offset) = u16::try_from(index) else {
            break;
        };
        if offset >= list_area.height {
            break;
        }
        let (marker, style) = if index == view.selected {
            ("▸ ", palette.selected())
        } else {
            ("  ", palette.base())
        };
        Paragraph::new(format!("{marker}{}", page.title))
            .style(style)
            .render(
                Rect::new(list_area.x, list_area.y + offset, list_area.width, 1),
                frame,
            );
    }

    let title = view
        .pages
        .get(view.selected)
        .map_or("", |page| page.title);
    let content = Block::new()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border())
        .title(title)
        .style(palette.base());
    let text_area = content.inner(layout.content);
    content.render(layout.content, frame);
    let scroll = view
        .scroll
        .min(max_scroll(view.document, layout.viewport_height()));
    Paragraph::new(view.document.clone())
        .style(palette.base())
        .wrap(WrapMode::Word)
        .scroll((scroll, 0))
        .render(
            Rect::new(
                text_area.x + 1,
                text_area.y,
                text_area.width.saturating_sub(2),
                text_area.height,
            ),
            frame,
        );

    let t = view.translator;
    let mut hints = vec![
        ("Tab", t.t("status.page")),
        ("↑↓", t.t("status.scroll")),
        ("Esc", t.t("status.back")),
        ("l", t.t("status.language")),
    ];
    if view.theme.is_enabled() {
        hints.push(("t", t.t("status.theme")));
    }
    hints.push(("q", t.t("status.quit")));
    let position = format!(" {}/{}", view.selected + 1, view.pages.len());
    render_status(frame, layout.status, &position, &hints, palette);
}
