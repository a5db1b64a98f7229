//! Mermaid diagrams drawn with the `ftui-extras` pipeline.
//!
//! A fence is parsed, normalised to the diagram IR, laid out and rendered
//! into an off-screen buffer sized from the layout's bounding box. The
//! buffer is read back row by row so the wiki can scroll a diagram like any
//! other text.
//!
//! The parser reads one statement per line, so flowchart shorthand is
//! expanded first: `;` separators, `A -- text --> B` labels, `A --> B & C`
//! groups and `A --> B --> C` chains become one edge per line, and labelled
//! nodes are declared on lines of their own.

use ftui_core::geometry::Rect;
use ftui_extras::mermaid::{
    MermaidCompatibilityMatrix, MermaidConfig, MermaidFallbackPolicy, MermaidTier,
    normalize_ast_to_ir, parse_with_diagnostics,
};
use ftui_extras::mermaid_layout::layout_diagram;
use ftui_extras::mermaid_render::render_diagram;
use ftui_render::buffer::Buffer;
use portal_core::docs::{DiagramRegistry, DiagramRenderer};

const MAX_WIDTH: u16 = 68;
const MAX_HEIGHT: u16 = 48;
const MIN_SIDE: u16 = 8;
/// Cells the viewport fit keeps free around the diagram.
const MARGIN: u16 = 2;
/// Flowchart statements that never carry edges.
const PASS_THROUGH: [&str; 8] = [
    "subgraph",
    "end",
    "direction",
    "style",
    "classdef",
    "class",
    "click",
    "linkstyle",
];

/// Registry with every renderer the front end ships.
#[must_use]
pub fn registry() -> DiagramRegistry {
    let mut registry = DiagramRegistry::new();
    registry.register("mermaid", Box::new(MermaidDiagram::default()));
    registry
}

/// Renders mermaid sources no larger than `max_width` x `max_height` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MermaidDiagram {
    max_width: u16,
    max_height: u16,
}

impl Default for MermaidDiagram {
    fn default() -> Self {
        Self {
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
        }
    }
}

impl MermaidDiagram {
    #[must_use]
    pub fn with_limits(max_width: u16, max_height: u16) -> Self {
        Self {
            max_width: max_width.max(MIN_SIDE),
            max_height: max_height.max(MIN_SIDE),
        }
    }

    /// Buffer size for a layout of `width` x `height` world units. Layout
    /// units are roughly cells, so small diagrams render 1:1 and large ones
    /// shrink to the limits.
    fn canvas_size(&self, width: f64, height: f64) -> (u16, u16) {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let avail_w = f64::from(self.max_width - MARGIN);
        let avail_h = f64::from(self.max_height - MARGIN);
        let scale = (avail_w / width).min(avail_h / height).min(1.0);
        let cells = |units: f64, max: u16| {
            let max = max - MARGIN;
            // Clamped to 1..=max first, so the cast cannot truncate.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let cells = (units * scale).ceil().clamp(1.0, f64::from(max)) as u16;
            (cells + MARGIN).max(MIN_SIDE)
        };
        (cells(width, self.max_width), cells(height, self.max_height))
    }
}

/// Split `text` on `separator` outside brackets and quotes.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '[' | '(' | '{' if !quoted => depth += 1,
            ']' | ')' | '}' if !quoted => depth = depth.saturating_sub(1),
            c if c == separator && !quoted && depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn is_link(run: &str) -> bool {
    run.len() >= 2 && run.contains(['-', '='])
}

/// Byte range of the next link (`-->`, `---`, `==>`, `-.->`, `<-->`) at or
/// after `from`, outside node brackets.
fn next_link(text: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut quoted = false;
    let mut run: Option<usize> = None;
    for (idx, c) in text[from..].char_indices().map(|(i, c)| (i + from, c)) {
        if !quoted && depth == 0 && matches!(c, '-' | '=' | '.' | '<' | '>') {
            run.get_or_insert(idx);
            continue;
        }
        if let Some(start) = run.take()
            && is_link(&text[start..idx])
        {
            return Some((start, idx));
        }
        match c {
            '"' => quoted = !quoted,
            '[' | '(' | '{' if !quoted => depth += 1,
            ']' | ')' | '}' if !quoted => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    let start = run?;
    is_link(&text[start..]).then_some((start, text.len()))
}

struct Link<'a> {
    arrow: &'a str,
    label: Option<&'a str>,
}

/// `A & B` lists every node the link applies to.
fn node_group(text: &str) -> Vec<&str> {
    split_top_level(text, '&')
        .into_iter()
        .map(str::trim)
        .filter(|node| !node.is_empty())
        .collect()
}

/// Node groups and the links between them; `None` when a label pipe is
/// never closed.
fn split_links(statement: &str) -> Option<(Vec<Vec<&str>>, Vec<Link<'_>>)> {
    let mut groups = Vec::new();
    let mut links = Vec::new();
    let mut cursor = 0;
    while let Some((start, end)) = next_link(statement, cursor) {
        groups.push(node_group(&statement[cursor..start]));
        let mut link = Link {
            arrow: &statement[start..end],
            label: None,
        };
        cursor = end;
        if let Some(piped) = statement[end..].trim_start().strip_prefix('|') {
            let close = piped.find('|')?;
            link.label = Some(piped[..close].trim());
            cursor = statement.len() - piped.len() + close + 1;
        } else if matches!(link.arrow, "--" | "==" | "-.") {
            // `A -- text --> B`: the text runs up to the closing arrow.
            if let Some((close_start, close_end)) = next_link(statement, end) {
                link.label = Some(statement[end..close_start].trim());
                link.arrow = &statement[close_start..close_end];
                cursor = close_end;
            }
        }
        links.push(link);
    }
    groups.push(node_group(&statement[cursor..]));
    Some((groups, links))
}

fn node_id(spec: &str) -> &str {
    let end = spec
        .find(|c: char| matches!(c, '[' | '(' | '{' | '>') || c.is_whitespace())
        .unwrap_or(spec.len());
    &spec[..end]
}

fn expand_edges(statement: &str) -> Vec<String> {
    let keyword = statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if statement.starts_with("%%") || PASS_THROUGH.contains(&keyword.as_str()) {
        return vec![statement.to_string()];
    }
    let Some((groups, links)) = split_links(statement) else {
        return vec![statement.to_string()];
    };
    if links.is_empty() || groups.iter().any(Vec::is_empty) {
        return vec![statement.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for node in groups.iter().flatten() {
        let declared = node.contains(['[', '(', '{']);
        if declared && !lines.iter().any(|line| line == node) {
            lines.push((*node).to_string());
        }
    }
    for (pair, link) in groups.windows(2).zip(&links) {
        for from in &pair[0] {
            for to in &pair[1] {
                let (from, to, arrow) = (node_id(from), node_id(to), link.arrow);
                lines.push(match link.label {
                    Some(label) if !label.is_empty() => format!("{from} {arrow}|{label}| {to}"),
                    _ => format!("{from} {arrow} {to}"),
                });
            }
        }
    }
    lines
}

/// One statement per line, with flowchart shorthand expanded.
fn expand_shorthand(source: &str) -> String {
    let mut lines = Vec::new();
    let mut flowchart = None;
    for line in source.lines() {
        if line.trim_start().starts_with("%%") {
            lines.push(line.to_string());
            continue;
        }
        for statement in split_top_level(line, ';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            match flowchart {
                None => {
                    let header = statement.to_ascii_lowercase();
                    flowchart =
                        Some(header.starts_with("graph") || header.starts_with("flowchart"));
                    lines.push(statement.to_string());
                }
                Some(true) => lines.extend(expand_edges(statement)),
                Some(false) => lines.push(statement.to_string()),
            }
        }
    }
    lines.join("\n")
}

fn config() -> MermaidConfig {
    MermaidConfig {
        // Always draw node and edge labels.
        tier_override: MermaidTier::Normal,
        ..MermaidConfig::default()
    }
}

/// Read a buffer back as text, trimming blank rows and trailing spaces.
fn buffer_lines(buffer: &Buffer) -> Vec<String> {
    let mut lines: Vec<String> = (0..buffer.height())
        .map(|y| {
            let mut row = String::with_capacity(usize::from(buffer.width()));
            for x in 0..buffer.width() {
                match buffer.get(x, y) {
                    Some(cell) if cell.is_continuation() => {}
                    Some(cell) => row.push(cell.content.as_char().unwrap_or(' ')),
                    None => row.push(' '),
                }
            }
            row.trim_end().to_string()
        })
        .collect();
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|line| line.is_empty()).count();
    lines.drain(..leading);
    lines
}

impl DiagramRenderer for MermaidDiagram {
    fn render(&self, source: &str) -> Result<Vec<String>, String> {
        if source.trim().is_empty() {
            return Err("empty diagram".to_string());
        }
        let parsed = parse_with_diagnostics(&expand_shorthand(source));
        if let Some(error) = parsed.errors.first() {
            return Err(error.to_string());
        }

        let config = config();
        let normalized = normalize_ast_to_ir(
            &parsed.ast,
            &config,
            &MermaidCompatibilityMatrix::default(),
            &MermaidFallbackPolicy::default(),
        );
        if let Some(error) = normalized.errors.first() {
            return Err(error.to_string());
        }

        let layout = layout_diagram(&normalized.ir, &config);
        let (width, height) =
            self.canvas_size(layout.bounding_box.width, layout.bounding_box.height);
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::new(width, height);
        render_diagram(&layout, &normalized.ir, &config, area, &mut buffer);

        let lines = buffer_lines(&buffer);
        if lines.is_empty() {
            return Err("diagram rendered nothing".to_string());
        }
        Ok(lines)
    }
}
