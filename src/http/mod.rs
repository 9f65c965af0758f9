//! Request pipeline and transport boundary
//!
//! # Module Structure
//!
//! - [`request`] - The [`ResourceRequest`] value flowing through the pipeline
//! - [`transport`] - The [`Transport`] capability supplied by the application
//! - [`interceptor`] - Interceptor hooks and the chain executor
//! - [`transform`] - Unconditional request/response transforms
//! - [`client`] - A [`Transport`] built on reqwest
//!
//! # Example
//!
//! ```ignore
//! use restweave::http::{Interceptor, ResourceRequest};
//! use restweave::Result;
//!
//! struct Auth(String);
//!
//! #[async_trait::async_trait]
//! impl Interceptor for Auth {
//!     async fn request(&self, req: &ResourceRequest) -> Option<Result<ResourceRequest>> {
//!         Some(Ok(req.clone().with_header("Authorization", format!("Bearer {}", self.0))))
//!     }
//! }
//! ```

pub mod client;
pub mod interceptor;
pub mod request;
pub mod transform;
pub mod transport;

pub use client::ReqwestTransport;
pub use interceptor::{execute, Interceptor, Phase, RequestPhase, ResponsePhase};
pub use request::ResourceRequest;
pub use transform::{transform_request, transform_response, Transform};
pub use transport::{send, Continuation, ResponseFuture, Transport};
