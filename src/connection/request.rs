use crate::core::{ClientError, Result};
use reqwest::Method;
use serde::Serialize;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Payload of an outbound request
///
/// Always owned so that the same logical request can be sent again after a
/// rotation or a leader redirect.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// Pre-encoded payload with its own content type, e.g. a multipart upload.
    Raw { content_type: String, data: Vec<u8> },
}

/// One logical API call: method, path under the API prefix, body, headers
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
    /// Caller overrides, applied after the defaults
    pub headers: Vec<(String, String)>,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Attach any serializable value as JSON
    pub fn json_from<T: Serialize>(self, value: &T) -> Result<Self> {
        Ok(self.json(serde_json::to_value(value)?))
    }

    /// Attach a pre-encoded body
    pub fn bytes(mut self, content_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.body = RequestBody::Raw {
            content_type: content_type.into(),
            data: data.into(),
        };
        self
    }

    /// Add a header override
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Check that the path can be joined to a base URL
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            return Err(ClientError::InvalidRequest(format!(
                "path '{}' must start with '/'",
                self.path
            )));
        }
        if self.path.starts_with("//") {
            return Err(ClientError::InvalidRequest(format!(
                "path '{}' must not start with '//'",
                self.path
            )));
        }
        if self.headers.iter().any(|(name, _)| name.trim().is_empty()) {
            return Err(ClientError::InvalidRequest("header name must not be empty".into()));
        }
        Ok(())
    }

    /// Full URL against a base such as `http://a/api`
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path)
    }

    /// Content type implied by the body, before caller overrides
    pub fn default_content_type(&self) -> &str {
        match &self.body {
            RequestBody::Raw { content_type, .. } => content_type,
            RequestBody::Empty | RequestBody::Json(_) => JSON_CONTENT_TYPE,
        }
    }
}
