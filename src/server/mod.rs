//! HTTP surface: the API, partial and shell routers behind one ordered dispatcher.
//!
//! axum handles the connection plumbing. Every request lands in a single fallback
//! handler that consults [`ServerRoutes`] so that route order stays an explicit,
//! testable property instead of an artifact of the framework's matcher.

pub mod api;
pub mod dispatch;
pub mod error;
pub mod partials;
pub mod shell;

pub use api::ApiAction;
pub use dispatch::{ServerRoutes, ServerTarget};
pub use error::ApiError;
pub use partials::Partial;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tokio::time::timeout;
use tracing::{error, info, info_span, warn, Instrument};

use crate::model::{Contact, Resource};
use crate::routing::RouteError;
use crate::store::DocumentStore;

/// Shared, immutable per-server state. Cloned into every request.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn DocumentStore>,
    routes: Arc<ServerRoutes>,
    request_timeout: Duration,
}

impl AppState {
    /// State with the standard route table for [`Contact`].
    pub fn new(store: Arc<dyn DocumentStore>, request_timeout: Duration) -> Result<Self, RouteError> {
        let routes = ServerRoutes::standard(Contact::COLLECTION)?;
        Ok(Self::with_routes(store, routes, request_timeout))
    }

    pub fn with_routes(store: Arc<dyn DocumentStore>, routes: ServerRoutes, request_timeout: Duration) -> Self {
        Self {
            store,
            routes: Arc::new(routes),
            request_timeout,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(middleware::from_fn(trace_requests))
        .with_state(state)
}

async fn handle_request(State(state): State<AppState>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri.path();
    match timeout(state.request_timeout, dispatch(&state, &method, path, &body)).await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            if err.status().is_server_error() {
                error!(error = %err, code = err.code(), "Request failed");
            } else {
                warn!(error = %err, code = err.code(), "Request rejected");
            }
            err.into_response()
        }
        Err(_) => {
            error!(timeout = ?state.request_timeout, "Request timed out");
            ApiError::Timeout(state.request_timeout).into_response()
        }
    }
}

/// Resolves the request against the route table and runs the matched target.
pub async fn dispatch(state: &AppState, method: &Method, path: &str, body: &[u8]) -> Result<Response, ApiError> {
    let (target, params) = state.routes.resolve(method, path)?;
    let store = state.store.as_ref();
    let id = params
        .get("id")
        .ok_or_else(|| ApiError::NoRoute(path.to_string()));

    let response = match target {
        ServerTarget::Api(ApiAction::List) => Json(api::list::<Contact>(store).await?).into_response(),
        ServerTarget::Api(ApiAction::Show) => Json(api::show::<Contact>(store, id?).await?).into_response(),
        ServerTarget::Api(ApiAction::Create) => {
            (StatusCode::CREATED, Json(api::create::<Contact>(store, body).await?)).into_response()
        }
        ServerTarget::Api(ApiAction::Update) => {
            Json(api::update::<Contact>(store, id?, body).await?).into_response()
        }
        ServerTarget::Api(ApiAction::Destroy) => Json(api::destroy::<Contact>(store, id?).await?).into_response(),
        ServerTarget::Partial => partials::render(params.get("name").unwrap_or_default())?.into_response(),
        ServerTarget::Shell => shell::render(path).into_response(),
    };
    Ok(response)
}

async fn trace_requests(request: Request, next: Next) -> Response {
    let span = info_span!(
        "http.request",
        method = %request.method(),
        path = %request.uri().path(),
    );
    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| {
        info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Handled"
        )
    });
    response
}
