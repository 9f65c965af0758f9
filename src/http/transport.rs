//! Transport capability
//!
//! The surrounding application supplies the transport. Only the four core
//! verbs are required; everything else has a default.

use super::request::ResourceRequest;
use crate::error::{ResourceError, Result};
use crate::resource::query::{encode_component, serialize_query};
use crate::resource::{ActionDefinition, HttpMethod};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::{Map, Value};

/// Eventual result of a dispatched request
pub type ResponseFuture<'a> = BoxFuture<'a, Result<Value>>;

/// Success continuation attached through [`Transport::subscribe`]
pub type Continuation = Box<dyn FnOnce(Value) -> Result<Value> + Send>;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, req: ResourceRequest) -> Result<Value>;

    async fn post(&self, req: ResourceRequest) -> Result<Value>;

    async fn put(&self, req: ResourceRequest) -> Result<Value>;

    async fn delete(&self, req: ResourceRequest) -> Result<Value>;

    async fn patch(&self, req: ResourceRequest) -> Result<Value> {
        Err(ResourceError::MethodResolution(req.method))
    }

    async fn head(&self, req: ResourceRequest) -> Result<Value> {
        Err(ResourceError::MethodResolution(req.method))
    }

    /// Encode a single path segment or query component
    fn encode_param(&self, value: &str) -> String {
        encode_component(value)
    }

    /// Serialize leftover parameters into a query string
    fn serialize_query(&self, query: &Map<String, Value>) -> String {
        serialize_query(query, |component| self.encode_param(component))
    }

    /// Pick the request function for an action, `None` if there is none
    fn resolve_method(&self, action: &ActionDefinition) -> Option<HttpMethod> {
        action.method.is_standard().then_some(action.method)
    }

    /// Attach a success continuation to a pending result
    fn subscribe<'a>(&'a self, result: ResponseFuture<'a>, continuation: Continuation) -> ResponseFuture<'a> {
        Box::pin(async move { continuation(result.await?) })
    }
}

/// Call the transport function for `method`
pub async fn send(transport: &dyn Transport, method: HttpMethod, req: ResourceRequest) -> Result<Value> {
    match method {
        HttpMethod::Get => transport.get(req).await,
        HttpMethod::Post => transport.post(req).await,
        HttpMethod::Put => transport.put(req).await,
        HttpMethod::Delete => transport.delete(req).await,
        HttpMethod::Patch => transport.patch(req).await,
        HttpMethod::Head => transport.head(req).await,
    }
}
