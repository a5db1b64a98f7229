//! Bundled documentation pages and diagram extraction.
//!
//! A page is plain markdown. Fenced blocks whose language tag has a
//! registered [`DiagramRenderer`] are cut out as [`DocSegment::Diagram`] so
//! the front end can draw them; everything else stays prose.

use std::collections::BTreeMap;
use std::fmt;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use tracing::warn;

/// One bundled documentation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocPage {
    pub id: &'static str,
    pub title: &'static str,
    pub content: &'static str,
}

const PAGES: &[DocPage] = &[
    DocPage {
        id: "ui-overview",
        title: "UI Overview",
        content: include_str!("../assets/docs/ui-overview.md"),
    },
    DocPage {
        id: "tech-overview",
        title: "Technical Overview",
        content: include_str!("../assets/docs/tech-overview.md"),
    },
    DocPage {
        id: "content-customization",
        title: "Content Customization",
        content: include_str!("../assets/docs/content-customization.md"),
    },
    DocPage {
        id: "deployment",
        title: "Deployment Guide",
        content: include_str!("../assets/docs/deployment.md"),
    },
];

/// The ordered, non-empty list of documentation pages.
#[derive(Debug, Clone, Copy)]
pub struct DocCatalog {
    pages: &'static [DocPage],
}

impl DocCatalog {
    #[must_use]
    pub const fn bundled() -> Self {
        Self { pages: PAGES }
    }

    #[must_use]
    pub fn pages(&self) -> &'static [DocPage] {
        self.pages
    }

    #[must_use]
    pub fn default_page(&self) -> &'static DocPage {
        &self.pages[0]
    }

    /// Position of the page with `id` in the sidebar order.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.pages.iter().position(|page| page.id == id)
    }
}

impl Default for DocCatalog {
    fn default() -> Self {
        Self::bundled()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocSegment {
    Markdown(String),
    Diagram { lang: String, source: String },
}

/// Turns the source of one diagram block into display lines.
pub trait DiagramRenderer: Send + Sync {
    fn render(&self, source: &str) -> Result<Vec<String>, String>;
}

/// Diagram renderers keyed by fence language tag.
#[derive(Default)]
pub struct DiagramRegistry {
    renderers: BTreeMap<String, Box<dyn DiagramRenderer>>,
}

impl fmt::Debug for DiagramRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagramRegistry")
            .field("languages", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DiagramRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, lang: impl Into<String>, renderer: Box<dyn DiagramRenderer>) {
        self.renderers.insert(lang.into().to_ascii_lowercase(), renderer);
    }

    #[must_use]
    pub fn handles(&self, lang: &str) -> bool {
        self.renderers.contains_key(&lang.to_ascii_lowercase())
    }

    /// Render `source` with the renderer for `lang`.
    ///
    /// On failure the raw source is returned after an error line.
    #[must_use]
    pub fn render(&self, lang: &str, source: &str) -> Vec<String> {
        let result = match self.renderers.get(&lang.to_ascii_lowercase()) {
            Some(renderer) => renderer.render(source),
            None => Err(format!("no renderer for '{lang}'")),
        };
        match result {
            Ok(lines) => lines,
            Err(error) => {
                warn!(lang, %error, "diagram render failed");
                std::iter::once(format!("[diagram error: {error}]"))
                    .chain(source.lines().map(str::to_string))
                    .collect()
            }
        }
    }

    /// [`split_segments`] with the registered languages.
    #[must_use]
    pub fn split(&self, markdown: &str) -> Vec<DocSegment> {
        split_segments(markdown, |lang| self.handles(lang))
    }
}

/// Split `markdown` into prose and diagram segments. Fenced blocks for
/// which `is_diagram(lang)` is false are kept in the prose verbatim.
pub fn split_segments(markdown: &str, is_diagram: impl Fn(&str) -> bool) -> Vec<DocSegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    // (language, block start, accumulated source) of the diagram being read.
    let mut open: Option<(String, usize, String)> = None;

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) if open.is_none() => {
                let lang = info.split_whitespace().next().unwrap_or_default();
                if !lang.is_empty() && is_diagram(lang) {
                    open = Some((lang.to_string(), range.start, String::new()));
                }
            }
            Event::Text(text) => {
                if let Some((_, _, source)) = open.as_mut() {
                    source.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, start, source)) = open.take() {
                    push_prose(&mut segments, &markdown[cursor..start]);
                    segments.push(DocSegment::Diagram { lang, source });
                    cursor = range.end;
                }
            }
            _ => {}
        }
    }
    push_prose(&mut segments, &markdown[cursor..]);
    segments
}

fn push_prose(segments: &mut Vec<DocSegment>, prose: &str) {
    if !prose.trim().is_empty() {
        segments.push(DocSegment::Markdown(prose.to_string()));
    }
}
