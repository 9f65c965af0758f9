//! Declarative REST resources.
//!
//! A resource is a path template plus named actions. Each action becomes a
//! callable that builds a [`http::ResourceRequest`], runs it through the
//! interceptor and transform pipeline, hands it to a pluggable
//! [`http::Transport`] and shapes the result.
//!
//! - [`resource`] - Definitions, path resolution, dispatch and the factory
//! - [`http`] - Request value, transport trait, interceptors, transforms
//! - [`config`] - Persistent CLI settings
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod http;
pub mod resource;

pub use error::{ResourceError, Result};
pub use http::{Interceptor, ResourceRequest, ReqwestTransport, Transform, Transport};
pub use resource::{
    ActionDefinition, CallArgs, HttpMethod, ParamValue, RequestOptions, ResourceConfig, ResourceDefinition,
    ResourceFactory, ResourceInstance, ResponseType,
};
