//! Action Dispatch
//!
//! Turns one bound action plus call arguments into a [`ResourceRequest`],
//! runs it through the interceptor and transform pipeline and the transport,
//! then shapes the result.

use super::definition::{ActionDefinition, ItemTransform, ParamMap, RequestOptions};
use super::path::{join_path, resolve_path};
use crate::error::{shape_name, ResourceError, Result};
use crate::http::interceptor::{self, Interceptor, RequestPhase, ResponsePhase};
use crate::http::transform::{transform_request, transform_response, Transform};
use crate::http::transport::{send, Transport};
use crate::http::ResourceRequest;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Factory-level settings read when each request is built
#[derive(Debug, Clone, Default)]
pub(crate) struct Settings {
    pub root_path: String,
    pub default_headers: BTreeMap<String, String>,
}

/// State shared by every action a factory binds
pub(crate) struct Dispatcher {
    pub transport: Arc<dyn Transport>,
    pub interceptors: Vec<Arc<dyn Interceptor>>,
    pub transforms: Vec<Arc<dyn Transform>>,
    pub settings: RwLock<Settings>,
}

impl Dispatcher {
    pub fn settings(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update_settings(&self, update: impl FnOnce(&mut Settings)) {
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut settings);
    }
}

/// Body, params and options of one action call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub body: Option<Value>,
    pub params: Map<String, Value>,
    pub options: RequestOptions,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Split positional arguments.
    ///
    /// With a body the call reads `(body, params, options)`; without one it
    /// reads `(params, options)` and a third argument is ignored.
    pub fn from_positional(has_body: bool, first: Value, second: Option<Value>, third: Option<Value>) -> Result<Self> {
        let (body, params, options) = if has_body {
            (Some(first), second, third)
        } else {
            if third.is_some() {
                tracing::warn!("ignoring third argument to an action without a body");
            }
            (None, Some(first), second)
        };

        Ok(Self {
            body: body.filter(|b| !b.is_null()),
            params: params_from_value(params),
            options: match options {
                None | Some(Value::Null) => RequestOptions::default(),
                Some(value) => serde_json::from_value(value)?,
            },
        })
    }
}

fn params_from_value(value: Option<Value>) -> Map<String, Value> {
    match value {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            tracing::warn!("ignoring params that are {}, expected an object", shape_name(&other));
            Map::new()
        }
    }
}

/// A callable resource action
#[derive(Clone)]
pub struct Action {
    resource: String,
    name: String,
    template: String,
    params: ParamMap,
    definition: Arc<ActionDefinition>,
    item_transform: Option<ItemTransform>,
    dispatcher: Arc<Dispatcher>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("resource", &self.resource)
            .field("name", &self.name)
            .field("template", &self.template)
            .field("params", &self.params)
            .field("definition", &self.definition)
            .finish()
    }
}

impl Action {
    pub(crate) fn new(
        resource: &str,
        name: &str,
        resource_path: &str,
        resource_params: &ParamMap,
        definition: ActionDefinition,
        item_transform: Option<ItemTransform>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let template = join_path(resource_path, definition.path.as_deref().unwrap_or(""));
        let params = resource_params.merged(&definition.params);

        Self {
            resource: resource.to_string(),
            name: name.to_string(),
            template,
            params,
            definition: Arc::new(definition),
            item_transform,
            dispatcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource path with the action suffix appended
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    /// Call with positional arguments (see [`CallArgs::from_positional`])
    pub async fn call(&self, first: Value, second: Option<Value>, third: Option<Value>) -> Result<Value> {
        let args = CallArgs::from_positional(self.definition.has_body, first, second, third)?;
        self.invoke(args).await
    }

    /// Build the request for `args` without sending it
    pub fn build_request(&self, args: CallArgs) -> Result<ResourceRequest> {
        let transport = &self.dispatcher.transport;

        let method = transport
            .resolve_method(&self.definition)
            .ok_or(ResourceError::MethodResolution(self.definition.method))?;

        let merged = self.params.merged(&ParamMap::from_literals(&args.params));
        let resolved = resolve_path(&self.template, &merged, args.body.as_ref(), |value| {
            transport.encode_param(value)
        });
        let query = transport.serialize_query(&resolved.query);

        let settings = self.dispatcher.settings();
        let url = join_path(&settings.root_path, &resolved.path);
        let path = if query.is_empty() {
            url.clone()
        } else {
            format!("{}?{}", url, query)
        };

        let mut headers = settings.default_headers;
        headers.extend(args.options.headers.clone());

        Ok(ResourceRequest {
            method,
            url,
            path,
            headers,
            search: resolved.query,
            with_credentials: args.options.with_credentials,
            response_type: args.options.response_type.unwrap_or_default(),
            body: args.body,
            action: self.definition.clone(),
            options: Arc::new(args.options),
        })
    }

    /// Dispatch the action and wait for its shaped result
    pub async fn invoke(&self, args: CallArgs) -> Result<Value> {
        let req = self.build_request(args)?;
        let dispatcher = &self.dispatcher;

        tracing::debug!("{} {} ({}.{})", req.method, req.path, self.resource, self.name);

        let pipeline = async move {
            let requested = interceptor::execute(&RequestPhase, Ok(req.clone()), &dispatcher.interceptors, &req).await;

            // An unrecovered request failure skips the transport but still
            // reaches the response-phase failure hooks
            let (response, sent) = match requested {
                Ok(request) => {
                    let request = transform_request(&dispatcher.transforms, request);
                    let sent = request.clone();
                    (send(dispatcher.transport.as_ref(), request.method, request).await, sent)
                }
                Err(err) => {
                    tracing::debug!("request phase failed, transport skipped: {}", err);
                    (Err(err), req)
                }
            };

            let data = interceptor::execute(&ResponsePhase, response, &dispatcher.interceptors, &sent).await?;
            Ok::<_, ResourceError>(transform_response(&dispatcher.transforms, data))
        };

        let name = self.name.clone();
        let is_array = self.definition.is_array;
        let item_transform = self
            .item_transform
            .clone()
            .filter(|_| self.definition.transform);

        dispatcher
            .transport
            .subscribe(
                Box::pin(pipeline),
                Box::new(move |value| shape_response(&name, is_array, item_transform.as_ref(), value)),
            )
            .await
    }
}

/// Enforce `is_array` and apply the resource's item transform
pub(crate) fn shape_response(
    action: &str,
    is_array: bool,
    item_transform: Option<&ItemTransform>,
    value: Value,
) -> Result<Value> {
    if is_array {
        let Value::Array(items) = value else {
            return Err(ResourceError::ShapeMismatch {
                action: action.to_string(),
                found: shape_name(&value),
            });
        };

        return Ok(match item_transform {
            Some(transform) => Value::Array(items.into_iter().map(|item| transform(item)).collect()),
            None => Value::Array(items),
        });
    }

    Ok(match item_transform {
        Some(transform) => transform(value),
        None => value,
    })
}
