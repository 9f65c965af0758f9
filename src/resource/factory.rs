//! Resource Factory
//!
//! Builds one instance per registered resource on first use, binds every
//! action onto it and caches it for the lifetime of the factory.

use super::definition::{default_actions, ActionDefinition, ResourceDefinition};
use super::dispatch::{Action, CallArgs, Dispatcher, Settings};
use super::registry::{Registry, ResourceConfig};
use crate::error::{ResourceError, Result};
use crate::http::{Interceptor, Transform, Transport};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// A bound resource: its actions by name
pub struct ResourceInstance {
    key: String,
    actions: BTreeMap<String, Action>,
}

impl fmt::Debug for ResourceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceInstance")
            .field("key", &self.key)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ResourceInstance {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn action(&self, name: &str) -> Result<&Action> {
        self.actions.get(name).ok_or_else(|| ResourceError::UnknownAction {
            resource: self.key.clone(),
            action: name.to_string(),
        })
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Call an action with positional arguments
    pub async fn call(&self, name: &str, first: Value, second: Option<Value>, third: Option<Value>) -> Result<Value> {
        self.action(name)?.call(first, second, third).await
    }

    /// Call an action with already separated arguments
    pub async fn invoke(&self, name: &str, args: CallArgs) -> Result<Value> {
        self.action(name)?.invoke(args).await
    }
}

/// Binds actions onto a resource instance under construction
pub struct ResourceBinder {
    key: String,
    definition: ResourceDefinition,
    dispatcher: Arc<Dispatcher>,
    actions: BTreeMap<String, Action>,
}

impl ResourceBinder {
    fn new(key: &str, definition: ResourceDefinition, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            key: key.to_string(),
            definition,
            dispatcher,
            actions: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.dispatcher.transport
    }

    /// Bind (or rebind) an action under `name`
    pub fn bind(&mut self, name: &str, action: ActionDefinition) {
        let bound = Action::new(
            &self.key,
            name,
            &self.definition.path,
            &self.definition.params,
            action,
            self.definition.transform.clone(),
            self.dispatcher.clone(),
        );
        self.actions.insert(name.to_string(), bound);
    }

    fn build(mut self) -> ResourceInstance {
        if self.definition.defaults {
            for (name, action) in default_actions() {
                self.bind(name, action);
            }
        }

        for (name, action) in self.definition.actions.clone() {
            self.bind(&name, action);
        }

        if let Some(setup) = self.definition.setup.clone() {
            setup(&mut self);
        }

        tracing::debug!("bound resource '{}' with {} actions", self.key, self.actions.len());

        ResourceInstance {
            key: self.key,
            actions: self.actions,
        }
    }
}

/// Creates and caches resource instances
pub struct ResourceFactory {
    registry: RwLock<Registry>,
    dispatcher: Arc<Dispatcher>,
    cache: Mutex<HashMap<String, Arc<ResourceInstance>>>,
}

impl fmt::Debug for ResourceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceFactory")
            .field("settings", &self.dispatcher.settings())
            .field("interceptors", &self.dispatcher.interceptors.len())
            .field("transforms", &self.dispatcher.transforms.len())
            .finish()
    }
}

impl ResourceFactory {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::builder(transport).build()
    }

    pub fn builder(transport: impl Transport + 'static) -> ResourceFactoryBuilder {
        ResourceFactoryBuilder::new(Arc::new(transport))
    }

    /// Register (or replace) a definition; already built instances keep theirs
    pub fn register(&self, key: impl Into<String>, definition: ResourceDefinition) {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(key, definition);
    }

    /// The instance for `key`, built on first use
    pub fn get(&self, key: &str) -> Result<Arc<ResourceInstance>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(instance) = cache.get(key) {
            return Ok(instance.clone());
        }

        let definition = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or_else(|| ResourceError::Configuration(key.to_string()))?;

        let instance = Arc::new(ResourceBinder::new(key, definition, self.dispatcher.clone()).build());
        cache.insert(key.to_string(), instance.clone());

        Ok(instance)
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.dispatcher.transport
    }

    pub fn root_path(&self) -> String {
        self.dispatcher.settings().root_path
    }

    /// Affects requests built after the call, not ones already in flight
    pub fn set_root_path(&self, root_path: impl Into<String>) {
        let root_path = root_path.into();
        self.dispatcher.update_settings(|settings| settings.root_path = root_path);
    }

    pub fn default_headers(&self) -> BTreeMap<String, String> {
        self.dispatcher.settings().default_headers
    }

    pub fn set_default_headers(&self, headers: BTreeMap<String, String>) {
        self.dispatcher.update_settings(|settings| settings.default_headers = headers);
    }

    pub fn insert_default_header(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        self.dispatcher.update_settings(|settings| {
            settings.default_headers.insert(name, value);
        });
    }
}

/// Configures a [`ResourceFactory`]
pub struct ResourceFactoryBuilder {
    transport: Arc<dyn Transport>,
    registry: Registry,
    settings: Settings,
    interceptors: Vec<Arc<dyn Interceptor>>,
    transforms: Vec<Arc<dyn Transform>>,
}

impl ResourceFactoryBuilder {
    fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            registry: Registry::new(),
            settings: Settings::default(),
            interceptors: Vec::new(),
            transforms: Vec::new(),
        }
    }

    pub fn root_path(mut self, root_path: impl Into<String>) -> Self {
        self.settings.root_path = root_path.into();
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn resource(mut self, key: impl Into<String>, definition: ResourceDefinition) -> Self {
        self.registry.register(key, definition);
        self
    }

    /// Apply a loaded resource file: root path, headers and resources
    pub fn config(mut self, config: ResourceConfig) -> Self {
        if let Some(root_path) = config.root_path.clone() {
            self.settings.root_path = root_path;
        }
        self.settings.default_headers.extend(config.default_headers.clone());
        self.registry.extend(config.into_registry());
        self
    }

    /// Interceptors run in the order they are added
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

    pub fn build(self) -> ResourceFactory {
        ResourceFactory {
            registry: RwLock::new(self.registry),
            dispatcher: Arc::new(Dispatcher {
                transport: self.transport,
                interceptors: self.interceptors,
                transforms: self.transforms,
                settings: RwLock::new(self.settings),
            }),
            cache: Mutex::new(HashMap::new()),
        }
    }
}
