//! Controllers: what each client view loads and what the user can do from it.
//!
//! A controller never fails the navigation because the API did. Load failures
//! become [`ViewState::Failed`], and a missing record becomes [`ViewState::Missing`],
//! so a view can tell "no data" apart from "request failed".

use std::time::Duration;

use tracing::{info, instrument, warn};
use url::Url;

use super::{ClientError, ClientRouter, Controller, Navigator, ResourceBinding, ResourceDescriptor, TemplateCache, View};
use crate::model::Document;

/// Data a view renders.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    List(Vec<Document>),
    Detail(Document),
    /// A form, blank for new records or pre-filled for edits.
    Form(Document),
    Missing { id: String },
    Failed { message: String },
}

/// A fully rendered navigation.
#[derive(Debug, Clone)]
pub struct Screen {
    pub view: View,
    pub template: String,
    pub state: ViewState,
}

/// A client session against one server.
pub struct ContactsApp {
    binding: ResourceBinding,
    navigator: Navigator,
    templates: TemplateCache,
}

impl ContactsApp {
    /// Connects to `base` with the standard contacts descriptor and route table.
    pub fn connect(base: Url, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let binding = ResourceBinding::new(http.clone(), base.clone(), ResourceDescriptor::contacts()?);
        Ok(Self::new(binding, ClientRouter::contacts()?, TemplateCache::new(http, base)))
    }

    pub fn new(binding: ResourceBinding, router: ClientRouter, templates: TemplateCache) -> Self {
        Self {
            binding,
            navigator: Navigator::new(router),
            templates,
        }
    }

    pub fn binding(&self) -> &ResourceBinding {
        &self.binding
    }

    pub fn location(&self) -> Option<&str> {
        self.navigator.location()
    }

    /// Navigates to `path` and runs the matched controller.
    #[instrument(skip(self))]
    pub async fn visit(&mut self, path: &str) -> Result<Screen, ClientError> {
        let view = self.navigator.navigate(path)?;
        let template = self.templates.load(view.template).await?.to_string();
        let state = self.load(&view).await;
        info!(path = %view.path, controller = ?view.controller, "Rendered");
        Ok(Screen { view, template, state })
    }

    /// Saves a new contact, then returns to the list.
    pub async fn create(&mut self, form: &Document) -> Result<Screen, ClientError> {
        let saved = self.binding.create(form).await?;
        info!(id = saved.id().unwrap_or_default(), "Contact created");
        self.visit_default().await
    }

    /// Saves an edited contact, then shows it.
    pub async fn save(&mut self, form: &Document) -> Result<Screen, ClientError> {
        let saved = self.binding.update(form).await?;
        let id = saved.id().unwrap_or_default();
        self.visit(&format!("/contacts/{id}")).await
    }

    /// Deletes a contact, then returns to the list.
    pub async fn destroy(&mut self, id: &str) -> Result<Screen, ClientError> {
        self.binding.destroy(id).await?;
        self.visit_default().await
    }

    async fn visit_default(&mut self) -> Result<Screen, ClientError> {
        let to = self.navigator.router().default_path().to_string();
        self.visit(&to).await
    }

    async fn load(&self, view: &View) -> ViewState {
        let id = view.params.get("id");
        let loaded = match (view.controller, id) {
            (Controller::List, _) => self.binding.list().await.map(ViewState::List),
            (Controller::New, _) => Ok(ViewState::Form(Document::new())),
            (Controller::Show, Some(id)) => self.record(id, ViewState::Detail).await,
            (Controller::Edit, Some(id)) => self.record(id, ViewState::Form).await,
            (controller, None) => Ok(ViewState::Failed {
                message: format!("{controller:?} view needs an id"),
            }),
        };
        loaded.unwrap_or_else(|e| {
            warn!(error = %e, path = %view.path, "View failed to load");
            ViewState::Failed { message: e.to_string() }
        })
    }

    async fn record(&self, id: &str, state: fn(Document) -> ViewState) -> Result<ViewState, ClientError> {
        Ok(match self.binding.show(id).await? {
            Some(record) => state(record),
            None => ViewState::Missing { id: id.to_string() },
        })
    }
}
