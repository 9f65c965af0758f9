//! Transform pipeline
//!
//! Transforms run unconditionally on every request after the request
//! interceptors and on every response after the response interceptors.
//! They are synchronous and infallible.

use super::request::ResourceRequest;
use serde_json::Value;
use std::sync::Arc;

pub trait Transform: Send + Sync {
    fn request(&self, req: ResourceRequest) -> ResourceRequest {
        req
    }

    fn response(&self, data: Value) -> Value {
        data
    }
}

/// Fold a request through every transform in order
pub fn transform_request(transforms: &[Arc<dyn Transform>], req: ResourceRequest) -> ResourceRequest {
    transforms
        .iter()
        .fold(req, |current, transform| transform.request(current))
}

/// Fold response data through every transform in order
pub fn transform_response(transforms: &[Arc<dyn Transform>], data: Value) -> Value {
    transforms
        .iter()
        .fold(data, |current, transform| transform.response(current))
}
