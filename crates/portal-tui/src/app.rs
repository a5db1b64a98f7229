//! The runtime model: routes terminal input to the portal state machines
//! and draws the active view.
//!
//! Terminals report pointer positions, not enter/leave pairs, so the app
//! remembers which target the pointer was last over and synthesises
//! `Leave`/`Enter`/`GridLeave` from each move.

use std::cell::RefCell;
use std::sync::Arc;

use ftui_core::event::{
    KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ftui_core::geometry::Rect;
use ftui_render::frame::Frame;
use ftui_runtime::{Cmd, Model};
use ftui_text::text::Text;
use portal_core::catalog::ContentSet;
use portal_core::cell::{CellId, GRID_SIDE, GridLayout};
use portal_core::config::AppConfig;
use portal_core::docs::{DiagramRegistry, DocCatalog};
use portal_core::error::Result;
use portal_core::i18n::{LocaleSource, Translator, load_with_fallback};
use portal_core::portal::{Portal, PortalEvent, Target};
use portal_core::route::{Navigator, Route};
use portal_core::theme::{PreferenceStore, THEME_PREFERENCE_KEY, ThemeMode, ThemeToggle};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::diagram;
use crate::layout::{LandingLayout, WikiLayout, modal_hit, modal_rect};
use crate::msg::Msg;
use crate::palette::Palette;
use crate::views::landing::{self, LandingView};
use crate::views::wiki::{self, WikiView};
use crate::views::{HeaderAction, header_action_at};

const WHEEL_STEP: u16 = 3;

/// Start-up choices made outside the config file.
pub struct AppOptions {
    pub language: String,
    pub start: Route,
    /// Documentation page shown when the wiki opens.
    pub page: usize,
    pub store: Box<dyn PreferenceStore>,
    pub system_theme: ThemeMode,
    /// Remote locale source; `None` keeps the bundled strings.
    pub locale_source: Option<Arc<dyn LocaleSource>>,
    /// Fixed seed for the center picker.
    pub seed: Option<u64>,
}

pub struct PortalApp {
    config: AppConfig,
    translator: Translator,
    layout: GridLayout,
    portal: Portal,
    route: Route,
    theme: ThemeToggle,
    store: Box<dyn PreferenceStore>,
    palette: Palette,
    focus: Target,
    pointer: Option<Target>,
    pointer_in_grid: bool,
    /// Last drawn screen size, for mouse hit testing.
    screen: RefCell<Rect>,
    docs: DocCatalog,
    diagrams: DiagramRegistry,
    page: usize,
    scroll: u16,
    document: Text,
    locale_source: Option<Arc<dyn LocaleSource>>,
}

impl PortalApp {
    pub fn new(config: AppConfig, options: AppOptions) -> Result<Self> {
        let AppOptions {
            language,
            start,
            page,
            store,
            system_theme,
            locale_source,
            seed,
        } = options;

        let translator = Translator::new(&config.content, &language);
        let layout = GridLayout::default();
        let content = ContentSet::load(&layout, &translator)?;
        let portal = match seed {
            Some(seed) => Portal::with_rng(layout.clone(), content, SmallRng::seed_from_u64(seed)),
            None => Portal::new(layout.clone(), content),
        };
        let theme = ThemeToggle::load(
            store.as_ref(),
            THEME_PREFERENCE_KEY,
            system_theme,
            config.features.dark_mode,
        );
        let palette = Palette::from_theme(&config.theme, theme.mode());
        let docs = DocCatalog::bundled();
        let diagrams = diagram::registry();
        let (page, current) = match docs.pages().get(page) {
            Some(current) => (page, current),
            None => (0, docs.default_page()),
        };
        let document = wiki::document_text(current, &diagrams, &palette);

        info!(
            language = translator.resolved_language(),
            route = %start,
            doc = current.id,
            theme = theme.mode().as_str(),
            remote_locales = locale_source.is_some(),
            "portal app created"
        );

        Ok(Self {
            config,
            translator,
            layout,
            portal,
            route: start,
            theme,
            store,
            palette,
            focus: Target::Center,
            pointer: None,
            pointer_in_grid: false,
            screen: RefCell::new(Rect::from_size(80, 24)),
            docs,
            diagrams,
            page,
            scroll: 0,
            document,
            locale_source,
        })
    }

    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }

    #[must_use]
    pub fn portal(&self) -> &Portal {
        &self.portal
    }

    #[must_use]
    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    #[must_use]
    pub fn focus(&self) -> Target {
        self.focus
    }

    #[must_use]
    pub fn theme_mode(&self) -> ThemeMode {
        self.theme.mode()
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    fn screen(&self) -> Rect {
        *self.screen.borrow()
    }

    // --- pointer bookkeeping ---

    /// Move the virtual pointer to `next`, emitting the transitions a
    /// browser would. Ignored while a modal covers the grid.
    fn point_at(&mut self, next: Option<Target>, in_grid: bool) {
        if self.portal.is_modal_open() {
            return;
        }
        if self.pointer != next {
            if let Some(previous) = self.pointer {
                self.portal.handle(PortalEvent::Leave(previous));
            }
            if let Some(target) = next {
                self.portal.handle(PortalEvent::Enter(target));
            }
            self.pointer = next;
        }
        if self.pointer_in_grid && !in_grid {
            self.portal.handle(PortalEvent::GridLeave);
        }
        self.pointer_in_grid = in_grid;
    }

    fn after_modal_closed(&mut self) {
        if let Some(previous) = self.pointer.take() {
            self.portal.handle(PortalEvent::Leave(previous));
        }
        self.pointer_in_grid = false;
    }

    fn close_modal(&mut self) {
        self.portal.handle(PortalEvent::CloseModal);
        if !self.portal.is_modal_open() {
            self.after_modal_closed();
        }
    }

    fn preview(&mut self, target: Target) {
        self.focus = target;
        self.point_at(Some(target), true);
    }

    fn activate(&mut self, target: Target) {
        self.preview(target);
        self.portal.handle(PortalEvent::Click(target));
    }

    fn move_focus(&mut self, rows: i8, cols: i8) {
        let (row, col) = match self.focus {
            Target::Cell(id) => id.position(),
            // The center control sits over the top-left inner cell's corner.
            Target::Center => (1, 1),
        };
        let step = |value: u8, delta: i8| value.saturating_add_signed(delta).min(GRID_SIDE - 1);
        if let Some(id) = CellId::from_position(step(row, rows), step(col, cols)) {
            self.preview(Target::Cell(id));
        }
    }

    // --- shared actions ---

    fn toggle_theme(&mut self) {
        if !self.theme.is_enabled() {
            return;
        }
        let mode = self.theme.toggle(self.store.as_ref());
        self.palette = Palette::from_theme(&self.config.theme, mode);
        self.rebuild_document();
    }

    fn cycle_language(&mut self) {
        let next = self.translator.next_language().to_string();
        if self.translator.change_language(&next) {
            self.reload_content();
        }
    }

    fn reload_content(&mut self) {
        match ContentSet::load(&self.layout, &self.translator) {
            Ok(content) => self.portal.set_content(content),
            Err(error) => warn!(%error, "content reload failed, keeping previous catalogs"),
        }
    }

    fn header_action(&mut self, action: HeaderAction) {
        debug!(?action, "header button");
        match action {
            HeaderAction::Wiki => self.navigate(Route::Wiki),
            HeaderAction::Back => self.navigate(Route::Main),
            HeaderAction::Language => self.cycle_language(),
            HeaderAction::Theme => self.toggle_theme(),
        }
    }

    // --- wiki ---

    fn rebuild_document(&mut self) {
        let pages = self.docs.pages();
        if let Some(page) = pages.get(self.page) {
            self.document = wiki::document_text(page, &self.diagrams, &self.palette);
        }
    }

    fn select_page(&mut self, index: usize) {
        let count = self.docs.pages().len();
        if count == 0 || index == self.page {
            return;
        }
        self.page = index.min(count - 1);
        self.scroll = 0;
        self.rebuild_document();
    }

    fn step_page(&mut self, forward: bool) {
        let count = self.docs.pages().len();
        if count == 0 {
            return;
        }
        let next = if forward {
            (self.page + 1) % count
        } else {
            (self.page + count - 1) % count
        };
        self.select_page(next);
    }

    fn scroll_by(&mut self, delta: i32) {
        let viewport = WikiLayout::compute(self.screen()).viewport_height();
        let max = i32::from(wiki::max_scroll(&self.document, viewport));
        let next = (i32::from(self.scroll) + delta).clamp(0, max);
        self.scroll = u16::try_from(next).unwrap_or(0);
    }

    // --- input ---

    fn handle_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        if key.kind != KeyEventKind::Press {
            return Cmd::None;
        }

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') if key.modifiers.contains(Modifiers::CTRL) => {
                return Cmd::Quit;
            }
            KeyCode::Char('q') => return Cmd::Quit,
            KeyCode::Char('t') => {
                self.toggle_theme();
                return Cmd::None;
            }
            KeyCode::Char('l') => {
                self.cycle_language();
                return Cmd::None;
            }
            _ => {}
        }

        match self.route {
            Route::Main => self.handle_landing_key(key),
            Route::Wiki => self.handle_wiki_key(key),
        }
        Cmd::None
    }

    fn handle_landing_key(&mut self, key: KeyEvent) {
        if self.portal.is_modal_open() {
            if matches!(key.code, KeyCode::Escape | KeyCode::Char('x')) {
                self.close_modal();
            }
            return;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_focus(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_focus(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_focus(0, -1),
            KeyCode::Right => self.move_focus(0, 1),
            KeyCode::Enter => self.activate(self.focus),
            KeyCode::Char(' ') => self.preview(self.focus),
            KeyCode::Char('c') => self.preview(Target::Center),
            KeyCode::Char('C') | KeyCode::Char('o') => self.activate(Target::Center),
            KeyCode::Escape => self.point_at(None, false),
            KeyCode::Char('w') => self.navigate(Route::Wiki),
            _ => {}
        }
    }

    fn handle_wiki_key(&mut self, key: KeyEvent) {
        let viewport = i32::from(WikiLayout::compute(self.screen()).viewport_height().max(1));
        match key.code {
            KeyCode::Tab | KeyCode::Right => self.step_page(true),
            KeyCode::BackTab | KeyCode::Left => self.step_page(false),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::PageDown => self.scroll_by(viewport),
            KeyCode::PageUp => self.scroll_by(-viewport),
            KeyCode::Home => self.scroll = 0,
            KeyCode::End => self.scroll_by(i32::from(u16::MAX)),
            KeyCode::Escape | KeyCode::Backspace | KeyCode::Char('b') => {
                self.navigate(Route::Main);
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Cmd<Msg> {
        let screen = self.screen();
        match self.route {
            Route::Main => self.handle_landing_mouse(mouse, screen),
            Route::Wiki => self.handle_wiki_mouse(mouse, screen),
        }
        Cmd::None
    }

    fn handle_landing_mouse(&mut self, mouse: MouseEvent, screen: Rect) {
        let layout = LandingLayout::compute(screen);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if self.portal.is_modal_open() {
                    return;
                }
                let target = layout.target_at(mouse.x, mouse.y);
                self.point_at(target, layout.in_grid(mouse.x, mouse.y));
                if let Some(target) = target {
                    self.focus = target;
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if self.portal.is_modal_open() {
                    let hit = modal_hit(modal_rect(screen), mouse.x, mouse.y);
                    self.portal.handle(PortalEvent::ModalClick(hit));
                    if !self.portal.is_modal_open() {
                        self.after_modal_closed();
                    }
                    return;
                }
                let buttons = landing::header_buttons(&self.translator, &self.theme);
                if let Some(action) = header_action_at(layout.header, &buttons, mouse.x, mouse.y)
                {
                    self.header_action(action);
                    return;
                }
                if let Some(target) = layout.target_at(mouse.x, mouse.y) {
                    self.activate(target);
                }
            }
            _ => {}
        }
    }

    fn handle_wiki_mouse(&mut self, mouse: MouseEvent, screen: Rect) {
        let layout = WikiLayout::compute(screen);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let buttons = wiki::header_buttons(&self.translator, &self.theme);
                if let Some(action) = header_action_at(layout.header, &buttons, mouse.x, mouse.y)
                {
                    self.header_action(action);
                } else if let Some(index) =
                    layout.page_at(mouse.x, mouse.y, self.docs.pages().len())
                {
                    self.select_page(index);
                }
            }
            MouseEventKind::ScrollDown => self.scroll_by(i32::from(WHEEL_STEP)),
            MouseEventKind::ScrollUp => self.scroll_by(-i32::from(WHEEL_STEP)),
            _ => {}
        }
    }

    fn locale_tasks(&self) -> Cmd<Msg> {
        let Some(source) = &self.locale_source else {
            return Cmd::None;
        };
        let tasks = self
            .translator
            .supported_languages()
            .iter()
            .map(|lng| {
                let source = Arc::clone(source);
                let lng = lng.clone();
                Cmd::Task(
                    Default::default(),
                    Box::new(move || {
                        let bundle = load_with_fallback(source.as_ref(), &lng);
                        Msg::LocaleLoaded { lng, bundle }
                    }),
                )
            })
            .collect();
        Cmd::batch(tasks)
    }
}

impl Navigator for PortalApp {
    fn navigate(&mut self, route: Route) {
        if self.route == route {
            return;
        }
        info!(from = %self.route, to = %route, "navigate");
        if self.route == Route::Main {
            // Leaving the landing view unmounts it.
            self.portal.reset();
            self.pointer = None;
            self.pointer_in_grid = false;
            self.focus = Target::Center;
        }
        self.route = route;
    }
}

impl Model for PortalApp {
    type Message = Msg;

    fn init(&mut self) -> Cmd<Self::Message> {
        self.locale_tasks()
    }

    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Mouse(mouse) => self.handle_mouse(mouse),
            Msg::Resize { width, height } => {
                *self.screen.borrow_mut() = Rect::from_size(width, height);
                Cmd::None
            }
            Msg::LocaleLoaded { lng, bundle } => {
                debug!(%lng, keys = bundle.len(), "installing locale bundle");
                self.translator.install(&lng, bundle);
                self.reload_content();
                Cmd::None
            }
            Msg::Noop => Cmd::None,
        }
    }

    fn view(&self, frame: &mut Frame) {
        let area = Rect::from_size(frame.buffer.width(), frame.buffer.height());
        *self.screen.borrow_mut() = area;
        match self.route {
            Route::Main => landing::render(
                &LandingView {
                    portal: &self.portal,
                    translator: &self.translator,
                    theme: &self.theme,
                    palette: &self.palette,
                    focus: self.focus,
                },
                frame,
                area,
            ),
            Route::Wiki => wiki::render(
                &WikiView {
                    pages: self.docs.pages(),
                    selected: self.page,
                    scroll: self.scroll,
                    document: &self.document,
                    translator: &self.translator,
                    theme: &self.theme,
                    palette: &self.palette,
                },
                frame,
                area,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ftui_render::grapheme_pool::GraphemePool;
    use portal_core::error::PortalError;
    use portal_core::i18n::LocaleBundle;
    use portal_core::picker::PickerPhase;
    use portal_core::portal::OpenModal;
    use portal_core::theme::{FileStore, MemoryStore};

    use super::*;
    use crate::layout::close_button_rect;

    const WIDTH: u16 = 100;
    const HEIGHT: u16 = 30;

    fn options() -> AppOptions {
        AppOptions {
            language: "en".to_string(),
            start: Route::Main,
            page: 0,
            store: Box::new(MemoryStore::default()),
            system_theme: ThemeMode::Light,
            locale_source: None,
            seed: Some(7),
        }
    }

    fn app() -> PortalApp {
        let mut app = PortalApp::new(AppConfig::default(), options()).expect("app");
        app.update(Msg::Resize {
            width: WIDTH,
            height: HEIGHT,
        });
        app
    }

    fn id(n: u8) -> CellId {
        CellId::new(n).expect("valid id")
    }

    fn press(app: &mut PortalApp, code: KeyCode) -> Cmd<Msg> {
        app.update(Msg::Key(KeyEvent::new(code)))
    }

    fn mouse(app: &mut PortalApp, kind: MouseEventKind, x: u16, y: u16) {
        app.update(Msg::Mouse(MouseEvent::new(kind, x, y)));
    }

    fn landing() -> LandingLayout {
        LandingLayout::compute(Rect::from_size(WIDTH, HEIGHT))
    }

    /// A point inside `id` that the center control does not cover.
    fn point_in(id: CellId) -> (u16, u16) {
        let rect = landing().cell_rect(id);
        let (row, col) = id.position();
        let x = if col < 2 { rect.x } else { rect.right() - 1 };
        let y = if row < 2 { rect.y } else { rect.bottom() - 1 };
        (x, y)
    }

    fn row_text(frame: &Frame, y: u16) -> String {
        (0..frame.buffer.width())
            .filter_map(|x| frame.buffer.get(x, y).and_then(|cell| cell.content.as_char()))
            .collect()
    }

    fn screen_text(app: &PortalApp) -> String {
        let mut pool = GraphemePool::new();
        let mut frame = Frame::new(WIDTH, HEIGHT, &mut pool);
        app.view(&mut frame);
        (0..HEIGHT)
            .map(|y| row_text(&frame, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(matches!(press(&mut app, KeyCode::Char('q')), Cmd::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
        assert!(matches!(app.update(Msg::Key(ctrl_c)), Cmd::Quit));
        let release = KeyEvent::new(KeyCode::Char('q')).with_kind(KeyEventKind::Release);
        assert!(matches!(app.update(Msg::Key(release)), Cmd::None));
    }

    #[test]
    fn arrows_hover_and_enter_pins() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        assert_eq!(app.focus(), Target::Cell(id(7)));
        assert_eq!(app.portal().grid().hovered_inner(), Some(id(7)));
        assert!(app.portal().is_outer_visible(id(3)));

        press(&mut app, KeyCode::Enter);
        assert!(app.portal().grid().is_toggled(id(7)));

        press(&mut app, KeyCode::Up);
        assert_eq!(app.focus(), Target::Cell(id(3)));
        assert_eq!(app.portal().grid().hovered_inner(), None);
        assert!(app.portal().is_outer_visible(id(3)), "pinned group stays visible");
        assert_eq!(app.portal().hovered_outer(), Some(id(3)));
    }

    #[test]
    fn focus_stops_at_the_edge() {
        let mut app = app();
        for _ in 0..6 {
            press(&mut app, KeyCode::Left);
        }
        assert_eq!(app.focus(), Target::Cell(id(5)));
    }

    #[test]
    fn mouse_moves_synthesise_enter_and_leave() {
        let mut app = app();
        let (x, y) = point_in(id(6));
        mouse(&mut app, MouseEventKind::Moved, x, y);
        assert_eq!(app.portal().grid().hovered_inner(), Some(id(6)));
        assert!(app.portal().is_outer_visible(id(1)));

        let (x, y) = point_in(id(10));
        mouse(&mut app, MouseEventKind::Moved, x, y);
        assert_eq!(app.portal().grid().hovered_inner(), Some(id(10)));
        assert!(!app.portal().is_outer_visible(id(1)));

        mouse(&mut app, MouseEventKind::Moved, 0, HEIGHT / 2);
        assert_eq!(app.portal().grid().hovered_inner(), None);
    }

    #[test]
    fn center_hover_previews_and_leaving_the_grid_clears_it() {
        let mut app = app();
        let center = landing().center;
        mouse(&mut app, MouseEventKind::Moved, center.x, center.y);
        assert_eq!(app.portal().center_phase(), PickerPhase::Previewing);
        assert!(app.portal().center_tooltip().is_some());

        mouse(&mut app, MouseEventKind::Moved, 0, 0);
        assert_eq!(app.portal().center_phase(), PickerPhase::Idle);
    }

    #[test]
    fn center_click_opens_modal_and_backdrop_closes_it() {
        let mut app = app();
        let center = landing().center;
        mouse(
            &mut app,
            MouseEventKind::Down(MouseButton::Left),
            center.x,
            center.y,
        );
        assert_eq!(app.portal().open_modal(), Some(OpenModal::Center));

        let modal = modal_rect(Rect::from_size(WIDTH, HEIGHT));
        mouse(
            &mut app,
            MouseEventKind::Down(MouseButton::Left),
            modal.x + 2,
            modal.y + 2,
        );
        assert!(app.portal().is_modal_open(), "body clicks keep it open");

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 0, 0);
        assert!(!app.portal().is_modal_open());
        assert_eq!(app.portal().center_phase(), PickerPhase::Idle);
    }

    #[test]
    fn grid_input_is_blocked_under_a_modal() {
        let mut app = app();
        press(&mut app, KeyCode::Char('o'));
        assert!(app.portal().is_modal_open());

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert!(app.portal().grid().toggled_inner().is_empty());

        press(&mut app, KeyCode::Escape);
        assert!(!app.portal().is_modal_open());
    }

    #[test]
    fn outer_modal_close_button() {
        let mut app = app();
        let (x, y) = point_in(id(11));
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), x, y);
        let (x, y) = point_in(id(16));
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), x, y);
        assert_eq!(app.portal().open_modal(), Some(OpenModal::Outer(id(16))));

        let close = close_button_rect(modal_rect(Rect::from_size(WIDTH, HEIGHT)));
        mouse(
            &mut app,
            MouseEventKind::Down(MouseButton::Left),
            close.x,
            close.y,
        );
        assert!(!app.portal().is_modal_open());
    }

    #[test]
    fn hidden_outer_cell_does_not_open() {
        let mut app = app();
        let (x, y) = point_in(id(1));
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), x, y);
        assert!(!app.portal().is_modal_open());
    }

    #[test]
    fn theme_toggle_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        let mut app = PortalApp::new(
            AppConfig::default(),
            AppOptions {
                store: Box::new(FileStore::new(&path)),
                ..options()
            },
        )
        .expect("app");
        assert_eq!(app.theme_mode(), ThemeMode::Light);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme_mode(), ThemeMode::Dark);
        assert_eq!(
            FileStore::new(&path).get(THEME_PREFERENCE_KEY).as_deref(),
            Some("dark")
        );
    }

    #[test]
    fn theme_toggle_is_inert_when_disabled() {
        let mut config = AppConfig::default();
        config.features.dark_mode = false;
        let mut app = PortalApp::new(config, options()).expect("app");
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme_mode(), ThemeMode::Light);
        assert!(!screen_text(&app).contains("dark mode"));
    }

    #[test]
    fn language_key_cycles_and_relabels() {
        let mut app = app();
        assert!(screen_text(&app).contains("Tulamia Portal"));
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.translator().resolved_language(), "de");
        assert!(screen_text(&app).contains("Tulamia-Portal"));
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.translator().resolved_language(), "en");
    }

    #[test]
    fn header_buttons_are_clickable() {
        let mut app = app();
        let header = Rect::new(0, 0, WIDTH, 1);
        let buttons = landing::header_buttons(app.translator(), &app.theme);
        let labels: Vec<&str> = buttons.iter().map(|(_, label)| label.as_str()).collect();
        let rects = crate::layout::header_buttons(header, &labels);
        let wiki = rects[0];
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), wiki.x, wiki.y);
        assert_eq!(app.route(), Route::Wiki);
    }

    #[test]
    fn leaving_main_resets_the_portal() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert!(!app.portal().grid().toggled_inner().is_empty());

        press(&mut app, KeyCode::Char('w'));
        assert_eq!(app.route(), Route::Wiki);
        assert!(app.portal().grid().toggled_inner().is_empty());
        assert_eq!(app.focus(), Target::Center);

        press(&mut app, KeyCode::Escape);
        assert_eq!(app.route(), Route::Main);
    }

    #[test]
    fn wiki_pages_and_scrolling() {
        let mut app = app();
        app.navigate(Route::Wiki);
        let pages = app.docs.pages().len();
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.page(), pages - 1);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.page(), 0);

        press(&mut app, KeyCode::Up);
        assert_eq!(app.scroll(), 0);
        press(&mut app, KeyCode::End);
        let viewport = WikiLayout::compute(Rect::from_size(WIDTH, HEIGHT)).viewport_height();
        assert_eq!(app.scroll(), wiki::max_scroll(&app.document, viewport));
        press(&mut app, KeyCode::Home);
        assert_eq!(app.scroll(), 0);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.page(), 1);
        assert_eq!(app.scroll(), 0);
    }

    #[test]
    fn wiki_sidebar_click_selects_page() {
        let mut app = app();
        app.navigate(Route::Wiki);
        let sidebar = WikiLayout::compute(Rect::from_size(WIDTH, HEIGHT)).sidebar;
        mouse(
            &mut app,
            MouseEventKind::Down(MouseButton::Left),
            sidebar.x + 2,
            sidebar.y + 3,
        );
        assert_eq!(app.page(), 2);
        assert!(screen_text(&app).contains(app.docs.pages()[2].title));
    }

    #[test]
    fn start_options_pick_route_and_page() {
        let app = PortalApp::new(
            AppConfig::default(),
            AppOptions {
                start: Route::Wiki,
                page: 3,
                ..options()
            },
        )
        .expect("app");
        assert_eq!(app.route(), Route::Wiki);
        assert_eq!(app.page(), 3);

        let app = PortalApp::new(
            AppConfig::default(),
            AppOptions {
                page: 99,
                ..options()
            },
        )
        .expect("app");
        assert_eq!(app.page(), 0);
    }

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl LocaleSource for CountingSource {
        fn fetch(&self, lng: &str) -> portal_core::error::Result<LocaleBundle> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if lng == "de" {
                return Err(PortalError::HttpStatus {
                    status: 404,
                    url: format!("/locales/{lng}.json"),
                });
            }
            let mut bundle = portal_core::i18n::bundled_bundle(lng);
            bundle.insert("header.title".to_string(), "Remote Portal".to_string());
            Ok(bundle)
        }
    }

    #[test]
    fn init_fetches_every_language_in_the_background() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let mut app = PortalApp::new(
            AppConfig::default(),
            AppOptions {
                locale_source: Some(source.clone() as Arc<dyn LocaleSource>),
                ..options()
            },
        )
        .expect("app");

        let Cmd::Batch(tasks) = app.init() else {
            panic!("expected a batch of locale tasks");
        };
        assert_eq!(tasks.len(), 2);
        for task in tasks {
            let Cmd::Task(_, run) = task else {
                panic!("expected a task");
            };
            app.update(run());
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(app.translator().t("header.title"), "Remote Portal");

        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.translator().t("header.title"), "Tulamia-Portal");
    }

    #[test]
    fn init_without_remote_source_does_nothing() {
        let mut app = app();
        assert!(matches!(app.init(), Cmd::None));
    }

    #[test]
    fn landing_render_smoke() {
        let mut app = app();
        let text = screen_text(&app);
        assert!(text.contains("Tulamia Portal"));
        assert!(text.contains("░"), "hidden outer cells are blurred");

        press(&mut app, KeyCode::Char('o'));
        let mut pool = GraphemePool::new();
        let mut frame = Frame::new(WIDTH, HEIGHT, &mut pool);
        app.view(&mut frame);
        let close = close_button_rect(modal_rect(Rect::from_size(WIDTH, HEIGHT)));
        assert_eq!(
            frame
                .buffer
                .get(close.x, close.y)
                .and_then(|cell| cell.content.as_char()),
            Some('[')
        );
    }

    #[test]
    fn tiny_screen_renders_without_grid() {
        let app = app();
        let mut pool = GraphemePool::new();
        let mut frame = Frame::new(10, 5, &mut pool);
        app.view(&mut frame);
        assert!(app.screen().width == 10);
    }
}
