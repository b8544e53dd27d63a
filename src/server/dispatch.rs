//! # Server-Level Dispatch
//!
//! The server partitions its URL space into three kinds of targets, tried in
//! registration order:
//!
//! 1. **API** routes for the resource (`/api/contacts`, `/api/contacts/:id`)
//! 2. **Partial** fragments (`/partials/:name`)
//! 3. The **Shell** catch-all (`GET /` and `GET *`)
//!
//! The first entry whose path pattern *and* method match wins. Register the shell
//! last: a catch-all registered earlier silently swallows partial requests (see
//! the tests below).

use axum::http::Method;

use super::api::ApiAction;
use super::ApiError;
use crate::routing::{Params, RouteError, RouteTable};

/// What a matched server route hands the request to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerTarget {
    Api(ApiAction),
    Partial,
    Shell,
}

#[derive(Debug, Clone)]
struct Endpoint {
    method: Method,
    target: ServerTarget,
}

/// Ordered server route table.
#[derive(Debug, Clone, Default)]
pub struct ServerRoutes {
    table: RouteTable<Endpoint>,
}

impl ServerRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// API routes, then partials, then the shell: the only order that reaches every target.
    pub fn standard(collection: &str) -> Result<Self, RouteError> {
        let mut routes = Self::new();
        routes.api(&format!("/api/{collection}"))?.partials()?.shell()?;
        Ok(routes)
    }

    pub fn route(&mut self, method: Method, pattern: &str, target: ServerTarget) -> Result<&mut Self, RouteError> {
        self.table.push(pattern, Endpoint { method, target })?;
        Ok(self)
    }

    /// Registers the five resource routes under `base`.
    pub fn api(&mut self, base: &str) -> Result<&mut Self, RouteError> {
        let item = format!("{base}/:id");
        self.route(Method::GET, base, ServerTarget::Api(ApiAction::List))?
            .route(Method::POST, base, ServerTarget::Api(ApiAction::Create))?
            .route(Method::GET, &item, ServerTarget::Api(ApiAction::Show))?
            .route(Method::PUT, &item, ServerTarget::Api(ApiAction::Update))?
            .route(Method::DELETE, &item, ServerTarget::Api(ApiAction::Destroy))
    }

    pub fn partials(&mut self) -> Result<&mut Self, RouteError> {
        self.route(Method::GET, "/partials/:name", ServerTarget::Partial)
    }

    pub fn shell(&mut self) -> Result<&mut Self, RouteError> {
        self.route(Method::GET, "/", ServerTarget::Shell)?
            .route(Method::GET, "*", ServerTarget::Shell)
    }

    /// Finds the target for a request.
    ///
    /// A path that some route matches under a different method yields
    /// [`ApiError::MethodNotAllowed`]; a path nothing matches yields [`ApiError::NoRoute`].
    /// A matched parameter that does not decode to UTF-8 yields [`ApiError::BadRequest`].
    pub fn resolve(&self, method: &Method, path: &str) -> Result<(ServerTarget, Params), ApiError> {
        let mut allow: Vec<Method> = Vec::new();
        for (endpoint, params) in self.table.matching(path) {
            if endpoint.method == *method {
                if let Some((name, raw)) = params.undecodable() {
                    return Err(ApiError::BadRequest(format!(
                        "path parameter `{name}` is not valid UTF-8: {raw}"
                    )));
                }
                return Ok((endpoint.target, params));
            }
            if !allow.contains(&endpoint.method) {
                allow.push(endpoint.method.clone());
            }
        }

        if allow.is_empty() {
            Err(ApiError::NoRoute(path.to_string()))
        } else {
            Err(ApiError::MethodNotAllowed {
                method: method.clone(),
                path: path.to_string(),
                allow,
            })
        }
    }
}
