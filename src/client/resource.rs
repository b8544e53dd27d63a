//! # Client Resource Binding
//!
//! A [`ResourceDescriptor`] is plain data: a URL template, an identity alias and a
//! table of actions (`name -> (verb, cardinality)`). [`ResourceBinding`] consumes
//! that table with one generic request builder, [`ResourceBinding::call`].
//!
//! ## Identity aliasing
//!
//! URLs use a conventional `:id` parameter while stored records carry their identity
//! in `_id`. When a record is passed to an action, the alias reads `_id` from the
//! record and writes it into the `id` slot of the URL, so store vocabulary never
//! appears in the client's URL scheme.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::ClientError;
use crate::model::{Document, ID_FIELD};
use crate::routing::{PathPattern, RouteError, Segment};

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Whether an action yields one record or a list of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// One row of the action table.
#[derive(Debug, Clone)]
pub struct ActionSpec {
    pub name: &'static str,
    pub verb: Method,
    pub cardinality: Cardinality,
}

impl ActionSpec {
    pub const fn new(name: &'static str, verb: Method, cardinality: Cardinality) -> Self {
        Self { name, verb, cardinality }
    }

    fn sends_body(&self) -> bool {
        self.verb == Method::POST || self.verb == Method::PUT
    }

    /// Singular actions other than create address one existing record by its path.
    fn addresses_record(&self) -> bool {
        self.cardinality == Cardinality::One && self.verb != Method::POST
    }
}

/// Maps the public URL parameter to the record's internal identity field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAlias {
    pub param: String,
    pub field: String,
}

impl Default for IdentityAlias {
    /// `id` in URLs, `_id` in records.
    fn default() -> Self {
        Self {
            param: "id".to_string(),
            field: ID_FIELD.to_string(),
        }
    }
}

/// Declarative description of a remote resource.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    name: String,
    template: PathPattern,
    alias: IdentityAlias,
    actions: Vec<ActionSpec>,
}

impl ResourceDescriptor {
    pub fn new(
        name: impl Into<String>,
        template: &str,
        alias: IdentityAlias,
        actions: Vec<ActionSpec>,
    ) -> Result<Self, RouteError> {
        Ok(Self {
            name: name.into(),
            template: PathPattern::parse(template)?,
            alias,
            actions,
        })
    }

    /// The standard five-action descriptor for `/api/<collection>/:id`.
    pub fn standard(name: impl Into<String>, collection: &str) -> Result<Self, RouteError> {
        Self::new(
            name,
            &format!("/api/{collection}/:id"),
            IdentityAlias::default(),
            vec![
                ActionSpec::new("list", Method::GET, Cardinality::Many),
                ActionSpec::new("show", Method::GET, Cardinality::One),
                ActionSpec::new("create", Method::POST, Cardinality::One),
                ActionSpec::new("update", Method::PUT, Cardinality::One),
                ActionSpec::new("destroy", Method::DELETE, Cardinality::One),
            ],
        )
    }

    pub fn contacts() -> Result<Self, RouteError> {
        Self::standard("Contact", "contacts")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self, name: &str) -> Option<&ActionSpec> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Fills the URL template.
    ///
    /// Each `:param` takes its value from `params` first, then from the record. The
    /// aliased parameter reads the record's identity field. Empty values count as
    /// missing. Only a trailing parameter may be missing, and its segment is dropped,
    /// so `/api/contacts/:id` without an id becomes `/api/contacts`.
    pub fn path_for(&self, params: &[(&str, &str)], record: Option<&Document>) -> Result<String, ClientError> {
        Ok(self.fill(params, record)?.path)
    }

    fn fill(&self, params: &[(&str, &str)], record: Option<&Document>) -> Result<FilledPath, ClientError> {
        let segments = self.template.segments();
        let mut filled = FilledPath {
            path: String::new(),
            complete: true,
        };
        for (index, segment) in segments.iter().enumerate() {
            let value = match segment {
                Segment::Literal(literal) => literal.clone(),
                Segment::Param(name) => match self.param_value(name, params, record) {
                    Some(value) if value == "." || value == ".." => {
                        return Err(ClientError::UnaddressableParam {
                            name: name.clone(),
                            value,
                        });
                    }
                    Some(value) => utf8_percent_encode(&value, SEGMENT).to_string(),
                    None if index + 1 == segments.len() => {
                        filled.complete = false;
                        continue;
                    }
                    None => return Err(ClientError::MissingParam(name.clone())),
                },
                Segment::Wildcard => continue,
            };
            filled.path.push('/');
            filled.path.push_str(&value);
        }
        if filled.path.is_empty() {
            filled.path.push('/');
        }
        Ok(filled)
    }

    fn param_value(&self, name: &str, params: &[(&str, &str)], record: Option<&Document>) -> Option<String> {
        params
            .iter()
            .find(|(key, value)| *key == name && !value.is_empty())
            .map(|(_, value)| (*value).to_string())
            .or_else(|| {
                let field = if name == self.alias.param { self.alias.field.as_str() } else { name };
                record.and_then(|r| r.scalar(field)).filter(|value| !value.is_empty())
            })
    }

    /// Recovers the public identity from a path built by [`path_for`](Self::path_for).
    pub fn parse_id(&self, path: &str) -> Option<String> {
        self.template
            .matches(path)?
            .get(&self.alias.param)
            .map(str::to_string)
    }
}

/// A filled URL template. `complete` is false when the trailing parameter was omitted.
struct FilledPath {
    path: String,
    complete: bool,
}

/// Result of a generic action call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A singular action; `None` means the server has no such record.
    One(Option<Document>),
    Many(Vec<Document>),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// HTTP binding of a [`ResourceDescriptor`] against a server.
#[derive(Debug, Clone)]
pub struct ResourceBinding {
    http: reqwest::Client,
    base: Url,
    descriptor: ResourceDescriptor,
}

impl ResourceBinding {
    pub fn new(http: reqwest::Client, base: Url, descriptor: ResourceDescriptor) -> Self {
        Self { http, base, descriptor }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    /// Runs any configured action. POST and PUT send `record` as the JSON body.
    ///
    /// A show, update or destroy with no usable identity (absent, empty, `.` or
    /// `..`) addresses no record and yields `One(None)` without a request.
    #[instrument(skip(self, record), fields(resource = %self.descriptor.name))]
    pub async fn call(
        &self,
        action: &str,
        params: &[(&str, &str)],
        record: Option<&Document>,
    ) -> Result<Outcome, ClientError> {
        let entry = self
            .descriptor
            .action(action)
            .ok_or_else(|| ClientError::UnknownAction(action.to_string()))?;
        let filled = match self.descriptor.fill(params, record) {
            Err(ClientError::UnaddressableParam { name, value }) if entry.addresses_record() => {
                debug!(%name, %value, "Value cannot address a record");
                return Ok(Outcome::One(None));
            }
            other => other?,
        };
        if !filled.complete && entry.addresses_record() {
            debug!("No identity to address");
            return Ok(Outcome::One(None));
        }
        let url = self.base.join(&filled.path)?;
        debug!(verb = %entry.verb, %url, "Sending request");

        let mut request = self.http.request(entry.verb.clone(), url);
        if entry.sends_body() {
            if let Some(record) = record {
                request = request.json(record);
            }
        }
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND && entry.cardinality == Cardinality::One {
            debug!("No such record");
            return Ok(Outcome::One(None));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => (body.error.code, body.error.message),
                Err(_) => ("unknown".to_string(), text),
            };
            warn!(status = status.as_u16(), %code, "Request failed");
            return Err(ClientError::Server {
                status: status.as_u16(),
                code,
                message,
            });
        }

        match entry.cardinality {
            Cardinality::One => Ok(Outcome::One(Some(response.json().await?))),
            Cardinality::Many => Ok(Outcome::Many(response.json().await?)),
        }
    }

    pub async fn list(&self) -> Result<Vec<Document>, ClientError> {
        match self.call("list", &[], None).await? {
            Outcome::Many(records) => Ok(records),
            Outcome::One(_) => Err(ClientError::Cardinality("list")),
        }
    }

    /// `Ok(None)` when the server has no record with that id.
    pub async fn show(&self, id: &str) -> Result<Option<Document>, ClientError> {
        self.one("show", &[("id", id)], None).await
    }

    /// Creates a record and returns it with its assigned identity.
    pub async fn create(&self, record: &Document) -> Result<Document, ClientError> {
        self.one("create", &[], Some(record))
            .await?
            .ok_or_else(|| ClientError::NotFound(self.descriptor.name.clone()))
    }

    /// Replaces the record addressed by its own identity.
    pub async fn update(&self, record: &Document) -> Result<Document, ClientError> {
        self.one("update", &[], Some(record))
            .await?
            .ok_or_else(|| ClientError::NotFound(record.id().unwrap_or_default().to_string()))
    }

    pub async fn destroy(&self, id: &str) -> Result<Document, ClientError> {
        self.one("destroy", &[("id", id)], None)
            .await?
            .ok_or_else(|| ClientError::NotFound(id.to_string()))
    }

    async fn one(
        &self,
        action: &'static str,
        params: &[(&str, &str)],
        record: Option<&Document>,
    ) -> Result<Option<Document>, ClientError> {
        match self.call(action, params, record).await? {
            Outcome::One(record) => Ok(record),
            Outcome::Many(_) => Err(ClientError::Cardinality(action)),
        }
    }
}
