//! # Client Route Table
//!
//! Client-side paths map to a (template, controller) pair. Matching is
//! first-match-wins in registration order, so `/contacts/new` must be registered
//! before `/contacts/:id` or it is captured as an id.
//!
//! A path nothing matches is not a view: it produces a [`Dispatch::Redirect`] to
//! the default path, which is then dispatched like any other navigation.

use tracing::{debug, info};

use crate::routing::{Params, RouteError, RouteTable};
use crate::server::Partial;

/// Which controller drives a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    List,
    Show,
    New,
    Edit,
}

/// Target of a client route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientRoute {
    pub template: Partial,
    pub controller: Controller,
}

/// A resolved navigation ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub path: String,
    pub template: Partial,
    pub controller: Controller,
    pub params: Params,
}

/// One step of client-level dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Render(View),
    Redirect { to: String },
}

#[derive(Debug, Clone)]
pub struct ClientRouter {
    table: RouteTable<ClientRoute>,
    default_path: String,
}

impl ClientRouter {
    pub fn builder() -> ClientRouterBuilder {
        ClientRouterBuilder::default()
    }

    /// `/contacts`, `/contacts/new`, `/contacts/:id`, `/contacts/:id/edit`, default `/contacts`.
    pub fn contacts() -> Result<Self, RouteError> {
        Self::builder()
            .when("/contacts", Partial::List, Controller::List)
            .when("/contacts/new", Partial::New, Controller::New)
            .when("/contacts/:id", Partial::Show, Controller::Show)
            .when("/contacts/:id/edit", Partial::Edit, Controller::Edit)
            .otherwise("/contacts")
            .build()
    }

    pub fn default_path(&self) -> &str {
        &self.default_path
    }

    /// A single dispatch step, without following redirects.
    pub fn resolve(&self, path: &str) -> Dispatch {
        match self.table.first_match(path) {
            Some((route, params)) => Dispatch::Render(View {
                path: path.to_string(),
                template: route.template,
                controller: route.controller,
                params,
            }),
            None => Dispatch::Redirect {
                to: self.default_path.clone(),
            },
        }
    }

    /// Resolves a path to a view, following the fallback redirect once.
    pub fn navigate(&self, path: &str) -> Result<View, RouteError> {
        match self.resolve(path) {
            Dispatch::Render(view) => Ok(view),
            Dispatch::Redirect { to } => {
                info!(from = %path, %to, "Redirecting");
                match self.resolve(&to) {
                    Dispatch::Render(view) => Ok(view),
                    Dispatch::Redirect { .. } => Err(RouteError::DefaultUnmatched(to)),
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ClientRouterBuilder {
    routes: Vec<(String, ClientRoute)>,
    default_path: Option<String>,
}

impl ClientRouterBuilder {
    pub fn when(mut self, pattern: &str, template: Partial, controller: Controller) -> Self {
        self.routes.push((pattern.to_string(), ClientRoute { template, controller }));
        self
    }

    pub fn otherwise(mut self, path: &str) -> Self {
        self.default_path = Some(path.to_string());
        self
    }

    /// Fails if a pattern is invalid or the default path would itself redirect.
    pub fn build(self) -> Result<ClientRouter, RouteError> {
        let mut table = RouteTable::new();
        for (pattern, route) in self.routes {
            table.push(&pattern, route)?;
        }
        let default_path = self.default_path.unwrap_or_else(|| "/".to_string());
        if table.first_match(&default_path).is_none() {
            return Err(RouteError::DefaultUnmatched(default_path));
        }
        debug!(routes = table.len(), %default_path, "Client routes ready");
        Ok(ClientRouter { table, default_path })
    }
}

/// Location state of a client session: the current view plus history.
///
/// Redirects replace the entry being navigated to rather than adding one.
#[derive(Debug, Clone)]
pub struct Navigator {
    router: ClientRouter,
    history: Vec<String>,
}

impl Navigator {
    pub fn new(router: ClientRouter) -> Self {
        Self {
            router,
            history: Vec::new(),
        }
    }

    pub fn router(&self) -> &ClientRouter {
        &self.router
    }

    pub fn navigate(&mut self, path: &str) -> Result<View, RouteError> {
        let view = self.router.navigate(path)?;
        self.history.push(view.path.clone());
        Ok(view)
    }

    /// The path currently displayed.
    pub fn location(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    /// Goes back one entry, returning the view to re-render.
    pub fn back(&mut self) -> Option<Result<View, RouteError>> {
        if self.history.len() < 2 {
            return None;
        }
        self.history.pop();
        let previous = self.history.last()?.clone();
        Some(self.router.navigate(&previous))
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contacts_table() {
        let router = ClientRouter::contacts().unwrap();

        let view = router.navigate("/contacts").unwrap();
        assert_eq!((view.template, view.controller), (Partial::List, Controller::List));

        let view = router.navigate("/contacts/new").unwrap();
        assert_eq!(view.controller, Controller::New);

        let view = router.navigate("/contacts/abc123").unwrap();
        assert_eq!(view.controller, Controller::Show);
        assert_eq!(view.params.get("id"), Some("abc123"));

        let view = router.navigate("/contacts/abc123/edit").unwrap();
        assert_eq!((view.template, view.controller), (Partial::Edit, Controller::Edit));
    }

    #[test]
    fn test_unknown_path_redirects_to_list() {
        let router = ClientRouter::contacts().unwrap();

        assert_eq!(
            router.resolve("/unknown"),
            Dispatch::Redirect { to: "/contacts".into() }
        );

        let view = router.navigate("/unknown").unwrap();
        assert_eq!(view.path, "/contacts");
        assert_eq!(view.controller, Controller::List);
    }

    #[test]
    fn test_first_match_wins_over_specificity() {
        let router = ClientRouter::builder()
            .when("/contacts/:id", Partial::Show, Controller::Show)
            .when("/contacts/new", Partial::New, Controller::New)
            .otherwise("/contacts/new")
            .build()
            .unwrap();

        let view = router.navigate("/contacts/new").unwrap();
        assert_eq!(view.controller, Controller::Show);
        assert_eq!(view.params.get("id"), Some("new"));
    }

    #[test]
    fn test_default_must_match_a_route() {
        let err = ClientRouter::builder()
            .when("/contacts", Partial::List, Controller::List)
            .otherwise("/nowhere")
            .build()
            .unwrap_err();
        assert_eq!(err, RouteError::DefaultUnmatched("/nowhere".into()));
    }

    #[test]
    fn test_navigator_history() {
        let mut nav = Navigator::new(ClientRouter::contacts().unwrap());
        assert_eq!(nav.location(), None);

        nav.navigate("/contacts/1").unwrap();
        nav.navigate("/bogus").unwrap();
        assert_eq!(nav.location(), Some("/contacts"));
        assert_eq!(nav.history(), &["/contacts/1".to_string(), "/contacts".to_string()]);

        let view = nav.back().unwrap().unwrap();
        assert_eq!(view.controller, Controller::Show);
        assert_eq!(nav.location(), Some("/contacts/1"));
        assert!(nav.back().is_none());
    }
}
