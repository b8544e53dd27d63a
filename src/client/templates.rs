use std::collections::HashMap;

use tracing::debug;
use url::Url;

use super::ClientError;
use crate::server::Partial;

/// Fetches partials from the server on first use and keeps them for the session.
#[derive(Debug, Clone)]
pub struct TemplateCache {
    http: reqwest::Client,
    base: Url,
    loaded: HashMap<Partial, String>,
}

impl TemplateCache {
    pub fn new(http: reqwest::Client, base: Url) -> Self {
        Self {
            http,
            base,
            loaded: HashMap::new(),
        }
    }

    pub async fn load(&mut self, partial: Partial) -> Result<&str, ClientError> {
        if !self.loaded.contains_key(&partial) {
            let url = self.base.join(&partial.path())?;
            debug!(%url, "Fetching partial");
            let response = self.http.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ClientError::Server {
                    status: status.as_u16(),
                    code: "partial_unavailable".to_string(),
                    message: format!("partial `{}` could not be fetched", partial.name()),
                });
            }
            let body = response.text().await?;
            self.loaded.insert(partial, body);
        }
        Ok(self.loaded.get(&partial).map(String::as_str).unwrap_or_default())
    }

    pub fn is_loaded(&self, partial: Partial) -> bool {
        self.loaded.contains_key(&partial)
    }
}
