//! Ordered path matching shared by the server dispatcher and the client router.
//!
//! A [`RouteTable`] is a plain list of `(pattern, target)` pairs. Lookups scan the
//! list in registration order and the **first** matching entry wins. There is no
//! "most specific" scoring: a wildcard registered early shadows everything after it.
//! Both dispatch levels rely on this, and the tests pin it down.
//!
//! # Pattern syntax
//!
//! - `/contacts` - literal segments
//! - `/contacts/:id` - named segment, captured into [`Params`]
//! - `*` or `/static/*` - wildcard, matches the remaining segments (possibly none)

pub mod pattern;

pub use pattern::{Params, PathPattern, Segment};

use thiserror::Error;

/// Errors raised while building or walking a route table.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RouteError {
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The fallback path of a client table does not match any of its routes.
    #[error("default path `{0}` does not match any registered route")]
    DefaultUnmatched(String),
}

#[derive(Debug, Clone)]
struct Route<T> {
    pattern: PathPattern,
    target: T,
}

/// An ordered list of routes with first-match-wins lookup.
#[derive(Debug, Clone)]
pub struct RouteTable<T> {
    routes: Vec<Route<T>>,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<T> RouteTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route. Later routes only see paths no earlier route claimed.
    pub fn push(&mut self, pattern: &str, target: T) -> Result<&mut Self, RouteError> {
        let pattern = PathPattern::parse(pattern)?;
        self.routes.push(Route { pattern, target });
        Ok(self)
    }

    /// Every route whose pattern matches `path`, in registration order.
    pub fn matching<'a>(&'a self, path: &'a str) -> impl Iterator<Item = (&'a T, Params)> + 'a {
        self.routes
            .iter()
            .filter_map(move |route| route.pattern.matches(path).map(|params| (&route.target, params)))
    }

    /// The first route matching `path`.
    pub fn first_match(&self, path: &str) -> Option<(&T, Params)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (&route.target, params)))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
