use percent_encoding::percent_decode_str;

use super::RouteError;

/// One parsed segment of a [`PathPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

/// A parsed route pattern such as `/api/contacts/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = split_path(raw).collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (index, part) in parts.iter().enumerate() {
            let segment = if *part == "*" {
                if index + 1 != parts.len() {
                    return Err(invalid("wildcard must be the last segment"));
                }
                Segment::Wildcard
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("parameter without a name"));
                }
                if segments.iter().any(|s| matches!(s, Segment::Param(n) if n == name)) {
                    return Err(invalid("duplicate parameter name"));
                }
                Segment::Param(name.to_string())
            } else {
                Segment::Literal((*part).to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the `:param` segments, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Matches a request path, returning the decoded parameters on success.
    ///
    /// Empty segments are ignored, so `/contacts/` matches `/contacts`.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut parts = split_path(path);
        let mut params = Params::default();

        for segment in &self.segments {
            match segment {
                Segment::Wildcard => return Some(params),
                Segment::Literal(expected) => {
                    if parts.next()? != expected {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let raw = parts.next()?;
                    match percent_decode_str(raw).decode_utf8() {
                        Ok(value) => params.values.push((name.clone(), value.into_owned())),
                        Err(_) => params.undecodable.push((name.clone(), raw.to_string())),
                    }
                }
            }
        }

        match parts.next() {
            None => Some(params),
            Some(_) => None,
        }
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Named values captured from a matched path.
///
/// A segment that percent-decodes to invalid UTF-8 still matches its `:param`,
/// but is kept apart from the decoded values so callers can reject the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: Vec<(String, String)>,
    undecodable: Vec<(String, String)>,
}

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.undecodable.is_empty()
    }

    /// The first parameter that did not decode, as `(name, raw segment)`.
    pub fn undecodable(&self) -> Option<(&str, &str)> {
        self.undecodable
            .first()
            .map(|(name, raw)| (name.as_str(), raw.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let pattern = PathPattern::parse("/contacts/:id/edit").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("contacts".into()),
                Segment::Param("id".into()),
                Segment::Literal("edit".into()),
            ]
        );
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(pattern.as_str(), "/contacts/:id/edit");
    }

    #[test]
    fn test_literal_and_param_matching() {
        let pattern = PathPattern::parse("/api/contacts/:id").unwrap();
        assert_eq!(pattern.matches("/api/contacts/abc123").unwrap().get("id"), Some("abc123"));
        assert!(pattern.matches("/api/contacts").is_none());
        assert!(pattern.matches("/api/contacts/abc/extra").is_none());
        assert!(pattern.matches("/api/people/abc").is_none());
    }

    #[test]
    fn test_trailing_slash_is_tolerated() {
        let pattern = PathPattern::parse("/contacts").unwrap();
        assert!(pattern.matches("/contacts/").is_some());
    }

    #[test]
    fn test_params_are_percent_decoded() {
        let pattern = PathPattern::parse("/partials/:name").unwrap();
        let params = pattern.matches("/partials/a%20b").unwrap();
        assert_eq!(params.get("name"), Some("a b"));
    }

    #[test]
    fn test_undecodable_param_still_matches() {
        let pattern = PathPattern::parse("/api/contacts/:id").unwrap();
        let params = pattern.matches("/api/contacts/%FF").unwrap();
        assert_eq!(params.get("id"), None);
        assert_eq!(params.undecodable(), Some(("id", "%FF")));
        assert!(!params.is_empty());

        let clean = pattern.matches("/api/contacts/abc").unwrap();
        assert_eq!(clean.undecodable(), None);
    }

    #[test]
    fn test_wildcard_matches_any_depth() {
        let pattern = PathPattern::parse("*").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("/contacts/1/edit").is_some());

        let nested = PathPattern::parse("/static/*").unwrap();
        assert!(nested.matches("/static").is_some());
        assert!(nested.matches("/static/css/app.css").is_some());
        assert!(nested.matches("/api").is_none());
    }

    #[test]
    fn test_bad_patterns() {
        assert!(PathPattern::parse("/a/:").is_err());
        assert!(PathPattern::parse("/:id/:id").is_err());
        assert!(PathPattern::parse("/*/rest").is_err());
    }
}
