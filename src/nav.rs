//! Routes and in-memory navigation history.

use std::fmt;

use once_cell::sync::Lazy;
use url::Url;

use crate::types::UserRole;

static BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("onboard://app/").expect("Valid base URL"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Wizard { role: UserRole },
    /// Raw `page` value; resolved against the loaded list by the view
    Employees { page: Option<String> },
}

impl Route {
    /// Parse a path such as `/wizard?role=admin`. Unknown paths resolve to home.
    pub fn parse(path: &str) -> Route {
        let Ok(url) = BASE.join(path) else {
            tracing::debug!(path, "unparsable route, showing home");
            return Route::Home;
        };
        let query = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        match url.path().trim_end_matches('/') {
            "" => Route::Home,
            "/wizard" => Route::Wizard {
                role: UserRole::from_query(query("role").as_deref()),
            },
            "/employees" => Route::Employees {
                page: query("page"),
            },
            other => {
                tracing::debug!(path = other, "unknown route, showing home");
                Route::Home
            }
        }
    }

    pub fn employees_page(page: usize) -> Route {
        Route::Employees {
            page: Some(page.to_string()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Wizard { role } => write!(f, "/wizard?role={}", role),
            Route::Employees { page: Some(page) } => write!(f, "/employees?page={}", page),
            Route::Employees { page: None } => write!(f, "/employees"),
        }
    }
}

/// Back-stack of visited routes. `replace` rewrites the current entry in place.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Route>,
}

impl History {
    pub fn new(start: Route) -> Self {
        Self {
            entries: vec![start],
        }
    }

    pub fn current(&self) -> &Route {
        // Never empty: `back` keeps the first entry
        &self.entries[self.entries.len() - 1]
    }

    pub fn push(&mut self, route: Route) {
        tracing::debug!(route = %route, "navigate");
        self.entries.push(route);
    }

    pub fn replace(&mut self, route: Route) {
        tracing::debug!(route = %route, "navigate (replace)");
        if let Some(current) = self.entries.last_mut() {
            *current = route;
        }
    }

    /// Pop to the previous entry. Returns false at the first entry.
    pub fn back(&mut self) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        self.entries.pop();
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::resolve_page;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(
            Route::parse("/wizard?role=admin"),
            Route::Wizard {
                role: UserRole::Admin
            }
        );
        assert_eq!(
            Route::parse("/employees?page=2"),
            Route::Employees {
                page: Some("2".to_string())
            }
        );
        assert_eq!(Route::parse("/employees"), Route::Employees { page: None });
        assert_eq!(Route::parse("/nowhere"), Route::Home);
    }

    #[test]
    fn test_role_defaults_to_ops() {
        for path in ["/wizard", "/wizard?role=", "/wizard?role=root", "/wizard?role=ADMIN"] {
            assert_eq!(
                Route::parse(path),
                Route::Wizard {
                    role: UserRole::Ops
                },
                "{}",
                path
            );
        }
    }

    #[test]
    fn test_display_round_trips() {
        for path in ["/", "/wizard?role=admin", "/wizard?role=ops", "/employees?page=3"] {
            assert_eq!(Route::parse(path).to_string(), path);
        }
    }

    #[test]
    fn test_back_stops_at_first_entry() {
        let mut history = History::new(Route::Home);
        history.push(Route::employees_page(1));
        assert!(history.back());
        assert!(!history.back());
        assert_eq!(history.current(), &Route::Home);
    }

    #[test]
    fn test_out_of_range_page_is_replaced_not_pushed() {
        let mut history = History::new(Route::Home);
        history.push(Route::parse("/employees?page=99"));

        let Route::Employees { page } = history.current().clone() else {
            panic!("expected employees route");
        };
        let info = resolve_page(page.as_deref(), 30, 10);
        assert!(info.corrected);
        history.replace(Route::employees_page(info.page));

        assert_eq!(history.len(), 2);
        assert_eq!(history.current().to_string(), "/employees?page=3");
        assert!(history.back());
        assert_eq!(history.current(), &Route::Home);
    }
}
