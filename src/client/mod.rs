//! The client half: a resource binding over HTTP, the client route table, and the
//! controllers that turn a navigation into a renderable view state.

pub mod controllers;
pub mod resource;
pub mod routes;
pub mod templates;

pub use controllers::{ContactsApp, Screen, ViewState};
pub use resource::{ActionSpec, Cardinality, IdentityAlias, Outcome, ResourceBinding, ResourceDescriptor};
pub use routes::{ClientRoute, ClientRouter, Controller, Dispatch, Navigator, View};
pub use templates::TemplateCache;

use thiserror::Error;

use crate::routing::RouteError;

/// Errors that can occur while talking to the server.
///
/// "No data" is not an error: singular lookups return `Ok(None)` on a 404.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),

    /// The request never produced an HTTP response, or the body was unreadable.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server responded {status} ({code}): {message}")]
    Server { status: u16, code: String, message: String },

    #[error("record not found: {0}")]
    NotFound(String),

    /// A non-trailing URL parameter had no value.
    #[error("missing value for url parameter `{0}`")]
    MissingParam(String),

    /// The value cannot survive URL normalization as a path segment (`.` or `..`).
    #[error("value `{value}` cannot address url parameter `{name}`")]
    UnaddressableParam { name: String, value: String },

    #[error("action `{0}` returned the wrong cardinality")]
    Cardinality(&'static str),

    #[error(transparent)]
    Route(#[from] RouteError),
}
