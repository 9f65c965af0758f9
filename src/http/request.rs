//! The request value handed to interceptors, transforms and the transport

use crate::resource::{ActionDefinition, HttpMethod, RequestOptions, ResponseType};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Fully resolved description of one HTTP call.
///
/// Built fresh for every action invocation. Pipeline stages only ever see a
/// shared reference or take ownership, so each stage that changes something
/// produces a new value. `action` and `options` are shared read-only, which
/// keeps the registered configuration out of reach of interceptors.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRequest {
    pub method: HttpMethod,
    /// Root path plus populated path, without the query string
    pub url: String,
    /// `url` followed by `?query` when the query is not empty
    pub path: String,
    pub headers: BTreeMap<String, String>,
    /// Parameters that did not match a path segment
    pub search: Map<String, Value>,
    pub with_credentials: bool,
    pub response_type: ResponseType,
    pub body: Option<Value>,
    pub action: Arc<ActionDefinition>,
    pub options: Arc<RequestOptions>,
}

impl ResourceRequest {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}
