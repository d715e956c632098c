use crate::core::{ClientError, Result};
use serde::de::DeserializeOwned;

/// A response the backend actually delivered, whatever its status
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Origin that served this response; for diagnostics only
    pub(crate) origin: String,
}

impl ApiResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
            origin: String::new(),
        }
    }

    pub(crate) fn served_by(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_leader_redirect(&self) -> bool {
        self.status == super::redirect::LEADER_REDIRECT_STATUS
    }

    /// First header value with this name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .is_some_and(|ct| ct.contains("application/json"))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON regardless of status
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turn a non-2xx response into `ClientError::Application`
    ///
    /// The message is the body's `error` field when the body is JSON and has
    /// one, otherwise `HTTP error! Status: <code>`.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let body = serde_json::from_slice::<serde_json::Value>(&self.body).ok();
        let message = body
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! Status: {}", self.status));

        Err(ClientError::Application {
            status: self.status,
            message,
            body,
        })
    }

    /// `error_for_status` followed by `json`
    pub fn json_ok<T: DeserializeOwned>(self) -> Result<T> {
        self.error_for_status()?.json()
    }
}
