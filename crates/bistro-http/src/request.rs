//! Replayable request and buffered response types.

use serde::Serialize;
use serde::de::DeserializeOwned;

use bistro_core::{Result, SetupToken};

pub use reqwest::Method;

/// An outgoing API call.
///
/// Holds everything needed to send the call again verbatim. Only the bearer
/// header differs between the first attempt and a replay.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    setup_token: Option<SetupToken>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            setup_token: None,
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

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Use an already-built JSON value as the request body.
    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Authorize this call with a setup token instead of the stored access
    /// token. Such calls are never decorated and never trigger a refresh.
    pub fn with_setup_token(mut self, token: SetupToken) -> Self {
        self.setup_token = Some(token);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn setup_token(&self) -> Option<&SetupToken> {
        self.setup_token.as_ref()
    }
}

/// A successful API response with its body fully read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: Vec<u8>,
}

impl ApiResponse {
    pub(crate) fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Decode the body as `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decode the body as loose JSON. An empty body decodes to `null`.
    pub fn json_value(&self) -> Result<serde_json::Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        self.json()
    }
}
