//! The two top-level views and the navigation seam.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Main,
    Wiki,
}

impl Route {
    pub const ALL: [Route; 2] = [Route::Main, Route::Wiki];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Wiki => "wiki",
        }
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Main => "/",
            Self::Wiki => "/wiki",
        }
    }

    /// Resolve a path or hash fragment; anything unrecognised is `Main`.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.trim().trim_start_matches('#');
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.trim_end_matches('/') {
            "/wiki" | "wiki" => Self::Wiki,
            _ => Self::Main,
        }
    }

    /// Route by its name, as accepted on the command line.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|route| route.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can switch the active view.
pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), route);
            assert_eq!(Route::from_name(route.name()), Some(route));
        }
    }

    #[test]
    fn hash_router_paths() {
        assert_eq!(Route::from_path("#/wiki"), Route::Wiki);
        assert_eq!(Route::from_path("/wiki/"), Route::Wiki);
        assert_eq!(Route::from_path("/wiki?doc=deployment"), Route::Wiki);
        assert_eq!(Route::from_path("#/"), Route::Main);
        assert_eq!(Route::from_path("/nowhere"), Route::Main);
        assert_eq!(Route::from_path(""), Route::Main);
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Route::from_name("WIKI"), Some(Route::Wiki));
        assert_eq!(Route::from_name("docs"), None);
    }
}
