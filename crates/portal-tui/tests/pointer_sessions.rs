use ftui_core::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ftui_core::geometry::Rect;
use ftui_runtime::Model;
use portal_core::cell::CellId;
use portal_core::config::AppConfig;
use portal_core::picker::PickerPhase;
use portal_core::portal::Target;
use portal_core::route::Route;
use portal_core::theme::{MemoryStore, ThemeMode};
use portal_tui::app::{AppOptions, PortalApp};
use portal_tui::layout::LandingLayout;
use portal_tui::msg::Msg;
use proptest::prelude::*;

const WIDTH: u16 = 90;
const HEIGHT: u16 = 32;

fn app() -> PortalApp {
    let mut app = PortalApp::new(
        AppConfig::default(),
        AppOptions {
            language: "en".to_string(),
            start: Route::Main,
            page: 0,
            store: Box::new(MemoryStore::default()),
            system_theme: ThemeMode::Light,
            locale_source: None,
            seed: Some(3),
        },
    )
    .expect("app");
    app.update(Msg::Resize {
        width: WIDTH,
        height: HEIGHT,
    });
    app
}

fn moved(app: &mut PortalApp, x: u16, y: u16) {
    app.update(Msg::Mouse(MouseEvent::new(MouseEventKind::Moved, x, y)));
}

fn click(app: &mut PortalApp, x: u16, y: u16) {
    app.update(Msg::Mouse(MouseEvent::new(
        MouseEventKind::Down(MouseButton::Left),
        x,
        y,
    )));
}

fn key(app: &mut PortalApp, code: KeyCode) {
    app.update(Msg::Key(KeyEvent::new(code)));
}

#[derive(Debug, Clone, Copy)]
enum Input {
    Move(u16, u16),
    Click(u16, u16),
    Escape,
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        4 => (0..WIDTH, 0..HEIGHT).prop_map(|(x, y)| Input::Move(x, y)),
        1 => (0..WIDTH, 1..HEIGHT - 1).prop_map(|(x, y)| Input::Click(x, y)),
        1 => Just(Input::Escape),
    ]
}

proptest! {
    /// Whatever happened before, the hover state always matches what the
    /// pointer is over once no modal is open.
    #[test]
    fn hover_state_follows_the_pointer(inputs in prop::collection::vec(input(), 0..40), x in 0..WIDTH, y in 0..HEIGHT) {
        let mut app = app();
        for input in inputs {
            match input {
                Input::Move(x, y) => moved(&mut app, x, y),
                Input::Click(x, y) => click(&mut app, x, y),
                Input::Escape => key(&mut app, KeyCode::Escape),
            }
        }
        if app.portal().is_modal_open() {
            key(&mut app, KeyCode::Escape);
        }
        prop_assert!(!app.portal().is_modal_open());

        moved(&mut app, x, y);
        let layout = LandingLayout::compute(Rect::from_size(WIDTH, HEIGHT));
        let target = layout.target_at(x, y);
        let portal = app.portal();
        let inner = portal.grid().hovered_inner();
        match target {
            Some(Target::Cell(id)) if portal.layout().inner_ids().any(|inner| inner == id) => {
                prop_assert_eq!(inner, Some(id));
            }
            _ => prop_assert_eq!(inner, None),
        }
        if target == Some(Target::Center) {
            prop_assert_eq!(portal.center_phase(), PickerPhase::Previewing);
        } else {
            prop_assert_eq!(portal.center_phase(), PickerPhase::Idle);
        }
        if let Some(hovered) = portal.hovered_outer() {
            prop_assert_eq!(target, Some(Target::Cell(hovered)));
            prop_assert!(portal.is_outer_visible(hovered));
        }
    }
}

#[test]
fn pin_then_open_outer_detail_then_visit_docs() {
    let mut app = app();
    let layout = LandingLayout::compute(Rect::from_size(WIDTH, HEIGHT));

    let inner = layout.cell_rect(CellId::new(10).expect("id"));
    click(&mut app, inner.x, inner.bottom() - 1);
    assert!(app.portal().grid().toggled_inner().iter().any(|id| id.get() == 10));

    let outer = layout.cell_rect(CellId::new(13).expect("id"));
    moved(&mut app, outer.x + 1, outer.y + 1);
    assert_eq!(app.portal().hovered_outer().map(|id| id.get()), Some(13));
    click(&mut app, outer.x + 1, outer.y + 1);
    assert!(app.portal().is_modal_open());

    key(&mut app, KeyCode::Char('w'));
    assert_eq!(app.route(), Route::Main, "navigation keys are inert under a modal");
    key(&mut app, KeyCode::Escape);
    key(&mut app, KeyCode::Char('w'));
    assert_eq!(app.route(), Route::Wiki);
    assert!(app.portal().grid().toggled_inner().is_empty());

    key(&mut app, KeyCode::Char('b'));
    assert_eq!(app.route(), Route::Main);
    assert!(!app.portal().is_outer_visible(CellId::new(13).expect("id")));
}
