use ftui_core::event::{Event, KeyEvent, MouseEvent};
use portal_core::i18n::LocaleBundle;

#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize {
        width: u16,
        height: u16,
    },
    /// A locale bundle arrived from the background fetch (remote or the
    /// bundled fallback).
    LocaleLoaded {
        lng: String,
        bundle: LocaleBundle,
    },
    Noop,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => Msg::Key(key),
            Event::Mouse(mouse) => Msg::Mouse(mouse),
            Event::Resize { width, height } => Msg::Resize { width, height },
            _ => Msg::Noop,
        }
    }
}
