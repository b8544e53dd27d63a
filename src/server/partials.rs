//! Template fragments served under `/partials/:name`.
//!
//! The set of partials is closed. A name from the URL is looked up in
//! [`Partial::from_name`] and never touches the filesystem; unknown names are a 404.

use axum::response::Html;
use tracing::debug;

use super::ApiError;

/// Every fragment the client router can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partial {
    List,
    Show,
    New,
    Edit,
}

impl Partial {
    pub const ALL: [Partial; 4] = [Partial::List, Partial::Show, Partial::New, Partial::Edit];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Partial::List => "list",
            Partial::Show => "show",
            Partial::New => "new",
            Partial::Edit => "edit",
        }
    }

    /// URL the client fetches this fragment from.
    pub fn path(self) -> String {
        format!("/partials/{}", self.name())
    }

    pub fn template(self) -> &'static str {
        match self {
            Partial::List => include_str!("../../templates/partials/list.html"),
            Partial::Show => include_str!("../../templates/partials/show.html"),
            Partial::New => include_str!("../../templates/partials/new.html"),
            Partial::Edit => include_str!("../../templates/partials/edit.html"),
        }
    }
}

pub fn render(name: &str) -> Result<Html<&'static str>, ApiError> {
    let partial = Partial::from_name(name).ok_or_else(|| ApiError::NotFound {
        resource: "Partial",
        id: name.to_string(),
    })?;
    debug!(partial = partial.name(), "Rendering partial");
    Ok(Html(partial.template()))
}
