//! Interceptor chains
//!
//! An interceptor can hook the request phase (`request` / `request_error`),
//! the response phase (`response` / `response_error`), both, or neither. A
//! hook that returns `None` is not implemented and leaves the chain alone.
//!
//! [`execute`] folds the interceptors in registration order. For each one the
//! success hook runs only while the chain holds a value, then the failure
//! hook runs only while the chain holds an error. Either hook may flip the
//! state: a rejecting success hook fails the chain, a resolving failure hook
//! recovers it, and later interceptors see the recovered value.

use super::request::ResourceRequest;
use crate::error::{ResourceError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Reshape an outgoing request
    async fn request(&self, _req: &ResourceRequest) -> Option<Result<ResourceRequest>> {
        None
    }

    /// Recover from a request-phase failure; `req` is the request as built
    async fn request_error(&self, _err: &ResourceError, _req: &ResourceRequest) -> Option<Result<ResourceRequest>> {
        None
    }

    /// Reshape response data; `req` is the request that was sent
    async fn response(&self, _data: &Value, _req: &ResourceRequest) -> Option<Result<Value>> {
        None
    }

    /// Recover from a transport or response-phase failure
    async fn response_error(&self, _err: &ResourceError, _req: &ResourceRequest) -> Option<Result<Value>> {
        None
    }
}

/// One success/failure hook pair of [`Interceptor`]
#[async_trait]
pub trait Phase: Send + Sync {
    type Value: Send + Sync;

    /// Hook names, for logging
    fn hooks(&self) -> (&'static str, &'static str);

    async fn success(
        &self,
        interceptor: &dyn Interceptor,
        value: &Self::Value,
        req: &ResourceRequest,
    ) -> Option<Result<Self::Value>>;

    async fn failure(
        &self,
        interceptor: &dyn Interceptor,
        error: &ResourceError,
        req: &ResourceRequest,
    ) -> Option<Result<Self::Value>>;
}

/// `request` / `request_error`
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestPhase;

/// `response` / `response_error`
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponsePhase;

#[async_trait]
impl Phase for RequestPhase {
    type Value = ResourceRequest;

    fn hooks(&self) -> (&'static str, &'static str) {
        ("request", "request_error")
    }

    async fn success(
        &self,
        interceptor: &dyn Interceptor,
        value: &ResourceRequest,
        _req: &ResourceRequest,
    ) -> Option<Result<ResourceRequest>> {
        interceptor.request(value).await
    }

    async fn failure(
        &self,
        interceptor: &dyn Interceptor,
        error: &ResourceError,
        req: &ResourceRequest,
    ) -> Option<Result<ResourceRequest>> {
        interceptor.request_error(error, req).await
    }
}

#[async_trait]
impl Phase for ResponsePhase {
    type Value = Value;

    fn hooks(&self) -> (&'static str, &'static str) {
        ("response", "response_error")
    }

    async fn success(&self, interceptor: &dyn Interceptor, value: &Value, req: &ResourceRequest) -> Option<Result<Value>> {
        interceptor.response(value, req).await
    }

    async fn failure(
        &self,
        interceptor: &dyn Interceptor,
        error: &ResourceError,
        req: &ResourceRequest,
    ) -> Option<Result<Value>> {
        interceptor.response_error(error, req).await
    }
}

/// Run `initial` through every interceptor's hooks for `phase`.
///
/// An empty list returns `initial` unchanged.
pub async fn execute<P: Phase>(
    phase: &P,
    initial: Result<P::Value>,
    interceptors: &[Arc<dyn Interceptor>],
    req: &ResourceRequest,
) -> Result<P::Value> {
    let (success_hook, failure_hook) = phase.hooks();
    let mut state = initial;

    for (index, interceptor) in interceptors.iter().enumerate() {
        let next = match &state {
            Ok(value) => phase.success(interceptor.as_ref(), value, req).await,
            Err(_) => None,
        };
        if let Some(next) = next {
            if let Err(err) = &next {
                tracing::trace!("interceptor #{} {} rejected: {}", index, success_hook, err);
            }
            state = next;
        }

        let recovered = match &state {
            Err(err) => phase.failure(interceptor.as_ref(), err, req).await,
            Ok(_) => None,
        };
        if let Some(recovered) = recovered {
            match &recovered {
                Ok(_) => tracing::trace!("interceptor #{} {} recovered", index, failure_hook),
                Err(err) => tracing::trace!("interceptor #{} {} failed again: {}", index, failure_hook, err),
            }
            state = recovered;
        }
    }

    state
}
