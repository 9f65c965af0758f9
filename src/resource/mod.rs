//! Resource abstraction layer
//!
//! Resources are plain configuration: a path template, default parameters
//! and named actions. The factory binds each action to the dispatcher, which
//! builds the request, runs the interceptor pipeline and calls the transport.
//!
//! # Architecture
//!
//! - [`definition`] - Resource and action definitions
//! - [`registry`] - Loads definitions from JSON or YAML resource files
//! - [`path`] - Fills `/:name` segments and collects leftover query params
//! - [`query`] - Query string serialization and component encoding
//! - [`dispatch`] - Builds and sends one action call
//! - [`factory`] - Creates and caches resource instances
//!
//! # Example
//!
//! ```ignore
//! use restweave::resource::{ActionDefinition, ResourceDefinition, ResourceFactory};
//! use serde_json::json;
//!
//! async fn show(transport: impl restweave::http::Transport + 'static) -> restweave::Result<()> {
//!     let factory = ResourceFactory::builder(transport)
//!         .root_path("/rest")
//!         .resource("test", ResourceDefinition::new("/test/:id").with_param("id", json!("@id")))
//!         .build();
//!
//!     let test = factory.get("test")?;
//!     let item = test.call("get", json!({ "id": 123 }), None, None).await?;
//!     println!("{item}");
//!     Ok(())
//! }
//! ```

pub mod definition;
pub mod dispatch;
pub mod factory;
pub mod path;
pub mod query;
pub mod registry;

pub use definition::{
    ActionDefinition, HttpMethod, ItemTransform, ParamMap, ParamValue, RequestOptions, ResourceDefinition,
    ResponseType, SetupHook,
};
pub use dispatch::{Action, CallArgs};
pub use factory::{ResourceBinder, ResourceFactory, ResourceFactoryBuilder, ResourceInstance};
pub use registry::{Registry, ResourceConfig, ResourceDef};
