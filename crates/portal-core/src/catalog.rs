//! Static content catalogs.
//!
//! Records are assembled once per language from the translation provider,
//! with built-in text as the default for every key. A catalog is immutable
//! after construction; switching language builds a new one.

use std::collections::BTreeMap;

use crate::cell::{CellId, GridLayout};
use crate::error::{PortalError, Result};
use crate::i18n::Translator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CenterKind {
    Poem,
    Tech,
    Projects,
    Random,
}

impl CenterKind {
    /// Whether the detail view shows the description text (otherwise links).
    #[must_use]
    pub const fn shows_description(self) -> bool {
        matches!(self, Self::Poem | Self::Tech)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub key: String,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CenterState {
    pub id: String,
    pub kind: CenterKind,
    pub title: String,
    pub description: Option<String>,
    pub links: Vec<Link>,
}

/// Non-empty list of center states with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CenterCatalog {
    states: Vec<CenterState>,
}

impl CenterCatalog {
    pub fn new(states: Vec<CenterState>) -> Result<Self> {
        if states.is_empty() {
            return Err(PortalError::EmptyCatalog {
                catalog: "center states",
            });
        }
        for (index, state) in states.iter().enumerate() {
            if states[..index].iter().any(|earlier| earlier.id == state.id) {
                return Err(PortalError::DuplicateId {
                    catalog: "center states",
                    id: state.id.clone(),
                });
            }
        }
        Ok(Self { states })
    }

    /// Built-in states, translated through `translator`.
    pub fn builtin(translator: &Translator) -> Result<Self> {
        let states = BUILTIN_STATES
            .iter()
            .map(|spec| spec.translate(translator))
            .collect();
        Self::new(states)
    }

    #[must_use]
    pub fn states(&self) -> &[CenterState] {
        &self.states
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CenterState> {
        self.states.iter().find(|state| state.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OuterContent {
    pub id: CellId,
    pub label: String,
    pub tooltip_title: String,
    pub modal_body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OuterCatalog {
    entries: BTreeMap<CellId, OuterContent>,
}

impl OuterCatalog {
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = OuterContent>) -> Self {
        Self {
            entries: entries.into_iter().map(|entry| (entry.id, entry)).collect(),
        }
    }

    /// One record per outer cell of `layout`, read from `outerSquares.<n>.*`.
    ///
    /// A cell without a translated label is a configuration error.
    pub fn from_translator(layout: &GridLayout, translator: &Translator) -> Result<Self> {
        let mut entries = Vec::new();
        for id in layout.outer_ids() {
            let base = format!("outerSquares.{id}");
            let label = translator
                .lookup(&format!("{base}.label"))
                .ok_or(PortalError::MissingContent { id })?
                .to_string();
            let tooltip_title = translator.t_or(&format!("{base}.tooltipTitle"), &label);
            let modal_body = translator.t_or(&format!("{base}.modalBody"), "");
            entries.push(OuterContent {
                id,
                label,
                tooltip_title,
                modal_body,
            });
        }
        let catalog = Self::new(entries);
        catalog.validate_against(layout)?;
        Ok(catalog)
    }

    #[must_use]
    pub fn get(&self, id: CellId) -> Option<&OuterContent> {
        self.entries.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every outer cell of `layout` must have a record.
    pub fn validate_against(&self, layout: &GridLayout) -> Result<()> {
        match layout.outer_ids().find(|id| !self.entries.contains_key(id)) {
            Some(id) => Err(PortalError::MissingContent { id }),
            None => Ok(()),
        }
    }
}

/// Topic labels of the inner cells; blank labels are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicCatalog {
    topics: BTreeMap<CellId, String>,
}

impl TopicCatalog {
    #[must_use]
    pub fn from_translator(layout: &GridLayout, translator: &Translator) -> Self {
        Self {
            topics: layout
                .inner_ids()
                .map(|id| (id, translator.t_or(&format!("innerSquares.{id}.topic"), "")))
                .collect(),
        }
    }

    /// Topic of `id`; empty for unknown ids.
    #[must_use]
    pub fn topic(&self, id: CellId) -> &str {
        self.topics.get(&id).map_or("", String::as_str)
    }
}

/// Every catalog the landing view needs, for one language.
#[derive(Debug, Clone)]
pub struct ContentSet {
    pub center: CenterCatalog,
    pub outer: OuterCatalog,
    pub topics: TopicCatalog,
}

impl ContentSet {
    pub fn load(layout: &GridLayout, translator: &Translator) -> Result<Self> {
        Ok(Self {
            center: CenterCatalog::builtin(translator)?,
            outer: OuterCatalog::from_translator(layout, translator)?,
            topics: TopicCatalog::from_translator(layout, translator),
        })
    }
}

struct LinkSpec {
    key: &'static str,
    label: &'static str,
    url: &'static str,
}

struct StateSpec {
    id: &'static str,
    kind: CenterKind,
    title: &'static str,
    description: Option<&'static str>,
    link_group: &'static str,
    links: &'static [LinkSpec],
}

impl StateSpec {
    fn translate(&self, translator: &Translator) -> CenterState {
        let base = format!("centerCircle.states.{}", self.id);
        let description = self
            .description
            .map(|text| translator.t_or(&format!("{base}.description"), text))
            .filter(|text| !text.is_empty());
        CenterState {
            id: self.id.to_string(),
            kind: self.kind,
            title: translator.t_or(&format!("{base}.title"), self.title),
            description,
            links: self
                .links
                .iter()
                .map(|link| Link {
                    key: link.key.to_string(),
                    label: translator.t_or(
                        &format!("centerCircle.{}.{}", self.link_group, link.key),
                        link.label,
                    ),
                    url: link.url.to_string(),
                })
                .collect(),
        }
    }
}

const PROJECT_LINKS: &[LinkSpec] = &[
    LinkSpec {
        key: "food-shop",
        label: "Food Shop Demo",
        url: "https://github.com/tulamia311/food-shop",
    },
    LinkSpec {
        key: "landing-page",
        label: "Landing Page Demo",
        url: "https://github.com/tulamia311/landing-page",
    },
];

const EXTERNAL_LINKS: &[LinkSpec] = &[
    LinkSpec {
        key: "github",
        label: "Open a random GitHub repo",
        url: "https://github.com/tulamia311",
    },
    LinkSpec {
        key: "tulamia",
        label: "Visit main Tulamia site",
        url: "https://tulamia.site",
    },
];

const BUILTIN_STATES: &[StateSpec] = &[
    StateSpec {
        id: "poem-intro",
        kind: CenterKind::Poem,
        title: "I am Tulamia D. Luffy.",
        description: Some(
            "Heya! I'm Luffy! Nice to meet ya, let's be friends right now!\n\
             This website? It's like my ship: full of adventures, surprises, and dreams.\n\
             Hop on and explore with me, 'cause I'm the guy who'll be the Pirate King!",
        ),
        link_group: "links",
        links: &[],
    },
    StateSpec {
        id: "tech-stack",
        kind: CenterKind::Tech,
        title: "Yohoho! I'm Luffy, captain of this crazy pirate crew AND this website!",
        description: Some(
            "Here's how my team sails the tech seas:\n\
             Thousand Sunny carries us, Chopper heals the bugs,\n\
             Franky powers the engine room and Zoro tries to find the way.",
        ),
        link_group: "links",
        links: &[],
    },
    StateSpec {
        id: "projects",
        kind: CenterKind::Projects,
        title: "Treasure Map of Projects",
        description: None,
        link_group: "projects",
        links: PROJECT_LINKS,
    },
    StateSpec {
        id: "random-page",
        kind: CenterKind::Random,
        title: "Where shall we sail next?",
        description: None,
        link_group: "links",
        links: EXTERNAL_LINKS,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::i18n::LocaleBundle;

    fn translator(lng: &str) -> Translator {
        Translator::new(&AppConfig::default().content, lng)
    }

    fn state(id: &str) -> CenterState {
        CenterState {
            id: id.to_string(),
            kind: CenterKind::Poem,
            title: id.to_uppercase(),
            description: None,
            links: Vec::new(),
        }
    }

    #[test]
    fn empty_center_catalog_is_rejected() {
        assert!(matches!(
            CenterCatalog::new(Vec::new()),
            Err(PortalError::EmptyCatalog { .. })
        ));
    }

    #[test]
    fn duplicate_center_ids_are_rejected() {
        let error = CenterCatalog::new(vec![state("a"), state("b"), state("a")])
            .expect_err("duplicate");
        assert!(matches!(error, PortalError::DuplicateId { id, .. } if id == "a"));
    }

    #[test]
    fn builtin_catalog_has_four_kinds() {
        let catalog = CenterCatalog::builtin(&translator("en")).expect("builtin");
        let ids: Vec<&str> = catalog.states().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["poem-intro", "tech-stack", "projects", "random-page"]);
        assert_eq!(catalog.get("projects").map(|s| s.links.len()), Some(2));
        assert!(catalog.get("poem-intro").and_then(|s| s.description.as_ref()).is_some());
        assert!(catalog.get("random-page").is_some_and(|s| !s.kind.shows_description()));
    }

    #[test]
    fn titles_follow_the_language() {
        let en = CenterCatalog::builtin(&translator("en")).expect("en");
        let de = CenterCatalog::builtin(&translator("de")).expect("de");
        assert_ne!(
            en.get("projects").map(|s| &s.title),
            de.get("projects").map(|s| &s.title)
        );
    }

    #[test]
    fn outer_catalog_covers_default_layout() {
        let layout = GridLayout::default();
        let outer = OuterCatalog::from_translator(&layout, &translator("en")).expect("outer");
        assert_eq!(outer.len(), 12);
        let first = outer.get(CellId::new(1).expect("id")).expect("record");
        assert!(!first.label.is_empty());
        assert!(outer.get(CellId::new(6).expect("id")).is_none());
    }

    #[test]
    fn missing_outer_label_is_a_configuration_error() {
        let layout = GridLayout::default();
        let mut translator = translator("en");
        let mut bundle: LocaleBundle = crate::i18n::bundled_bundle("en");
        bundle.remove("outerSquares.13.label");
        translator.install("en", bundle.clone());
        translator.install("de", bundle);

        let error = OuterCatalog::from_translator(&layout, &translator).expect_err("missing");
        match error {
            PortalError::MissingContent { id } => assert_eq!(id.get(), 13),
            other => panic!("expected MissingContent, got {other}"),
        }
    }

    #[test]
    fn validate_against_reports_first_gap() {
        let layout = GridLayout::default();
        let partial = OuterCatalog::new([OuterContent {
            id: CellId::new(1).expect("id"),
            label: "one".to_string(),
            tooltip_title: "one".to_string(),
            modal_body: String::new(),
        }]);
        let error = partial.validate_against(&layout).expect_err("gap");
        assert!(matches!(error, PortalError::MissingContent { id } if id.get() == 2));
    }

    #[test]
    fn topics_default_to_blank() {
        let layout = GridLayout::default();
        let topics = TopicCatalog::from_translator(&layout, &translator("en"));
        assert!(!topics.topic(CellId::new(6).expect("id")).is_empty());
        assert_eq!(topics.topic(CellId::new(1).expect("id")), "");
    }
}
