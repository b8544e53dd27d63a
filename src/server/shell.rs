use axum::response::Html;
use tracing::debug;

/// Root layout of the single-page application.
pub const LAYOUT: &str = include_str!("../../templates/index.html");

/// Renders the application shell. The path is only logged: every path gets the
/// same layout and the client router takes over from there.
pub fn render(path: &str) -> Html<&'static str> {
    debug!(%path, "Rendering shell");
    Html(LAYOUT)
}
