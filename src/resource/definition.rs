//! Resource and action definitions
//!
//! Plain configuration data describing a resource: its path template, its
//! default parameters and the actions bound onto each instance. Definitions
//! can be built in code or deserialized from a resource file (see
//! [`super::registry`]).

use super::factory::ResourceBinder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Prefix marking a parameter value as a reference into the call payload.
const BODY_REF_PREFIX: char = '@';

/// HTTP verb of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "delete")]
    Delete,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "head")]
    Head,
}

impl HttpMethod {
    /// Whether calls to this verb carry a request body unless overridden
    pub fn has_body_by_default(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    /// The four verbs every transport is required to serve
    pub fn is_standard(self) -> bool {
        matches!(
            self,
            HttpMethod::Get | HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered parameter value.
///
/// Strings of the form `@a.b.c` are parsed once into [`ParamValue::BodyRef`]
/// and resolved against the call payload at dispatch time.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Literal(Value),
    BodyRef(Vec<String>),
}

impl ParamValue {
    /// Parse a configured value, recognizing `@`-prefixed body references
    pub fn parse(value: Value) -> Self {
        match value {
            Value::String(s) if s.starts_with(BODY_REF_PREFIX) => {
                let path = s[BODY_REF_PREFIX.len_utf8()..]
                    .split('.')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect();
                ParamValue::BodyRef(path)
            }
            other => ParamValue::Literal(other),
        }
    }

    /// Build a body reference from a dot path (without the `@`)
    pub fn body_ref(path: &str) -> Self {
        ParamValue::BodyRef(
            path.split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_body_ref(&self) -> bool {
        matches!(self, ParamValue::BodyRef(_))
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::parse(value)
    }
}

impl From<ParamValue> for Value {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Literal(v) => v,
            ParamValue::BodyRef(path) => Value::String(format!("{}{}", BODY_REF_PREFIX, path.join("."))),
        }
    }
}

/// Ordered parameter map.
///
/// Insertion order is kept so query strings come out in declaration order.
/// Re-inserting an existing key overwrites the value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ParamMap {
    entries: Vec<(String, ParamValue)>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call-site values: always literals, never body references
    pub fn from_literals(values: &Map<String, Value>) -> Self {
        let mut map = Self::new();
        for (key, value) in values {
            map.insert(key.clone(), ParamValue::Literal(value.clone()));
        }
        map
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layer `overrides` on top of `self`; values in `overrides` win.
    pub fn merged(&self, overrides: &ParamMap) -> ParamMap {
        let mut merged = self.clone();
        for (key, value) in overrides.iter() {
            merged.insert(key, value.clone());
        }
        merged
    }
}

impl From<Map<String, Value>> for ParamMap {
    fn from(values: Map<String, Value>) -> Self {
        values.into_iter().collect()
    }
}

impl From<ParamMap> for Map<String, Value> {
    fn from(params: ParamMap) -> Self {
        params
            .entries
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ParamMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Expected shape of the response body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Text,
    #[default]
    Json,
    #[serde(alias = "arraybuffer")]
    ArrayBuffer,
    Blob,
}

/// Per-call options: the last positional argument of an action call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    pub headers: BTreeMap<String, String>,
    #[serde(alias = "withCredentials")]
    pub with_credentials: bool,
    #[serde(alias = "responseType", skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
}

impl RequestOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = enabled;
        self
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }
}

/// Action definition as written in a resource file.
///
/// Flags left out fall back to the defaults derived from the method.
#[derive(Debug, Clone, Deserialize)]
struct ActionConfig {
    method: HttpMethod,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    params: ParamMap,
    #[serde(default, alias = "isArray")]
    is_array: bool,
    #[serde(default)]
    transform: Option<bool>,
    #[serde(default, alias = "hasBody")]
    has_body: Option<bool>,
}

/// One HTTP operation declared on a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ActionConfig")]
pub struct ActionDefinition {
    pub method: HttpMethod,
    /// Suffix appended to the resource path
    pub path: Option<String>,
    pub params: ParamMap,
    pub is_array: bool,
    /// Run the resource's item transform over the response
    pub transform: bool,
    /// First positional argument is the body rather than the params
    pub has_body: bool,
}

impl From<ActionConfig> for ActionDefinition {
    fn from(config: ActionConfig) -> Self {
        let mut action = ActionDefinition::new(config.method);
        action.path = config.path;
        action.params = config.params;
        action.is_array = config.is_array;
        if let Some(transform) = config.transform {
            action.transform = transform;
        }
        if let Some(has_body) = config.has_body {
            action.has_body = has_body;
        }
        action
    }
}

impl ActionDefinition {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            path: None,
            params: ParamMap::new(),
            is_array: false,
            transform: method != HttpMethod::Delete,
            has_body: method.has_body_by_default(),
        }
    }

    pub fn get() -> Self {
        Self::new(HttpMethod::Get)
    }

    pub fn post() -> Self {
        Self::new(HttpMethod::Post)
    }

    pub fn put() -> Self {
        Self::new(HttpMethod::Put)
    }

    pub fn delete() -> Self {
        Self::new(HttpMethod::Delete)
    }

    pub fn patch() -> Self {
        Self::new(HttpMethod::Patch)
    }

    pub fn head() -> Self {
        Self::new(HttpMethod::Head)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name, value);
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn with_transform(mut self, enabled: bool) -> Self {
        self.transform = enabled;
        self
    }

    pub fn with_body(mut self, has_body: bool) -> Self {
        self.has_body = has_body;
        self
    }
}

/// Per-item response transform exposed by a resource
pub type ItemTransform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Hook run while a resource instance is being built
pub type SetupHook = Arc<dyn Fn(&mut ResourceBinder) + Send + Sync>;

/// A REST entity: base path template, default params and its actions
#[derive(Clone)]
pub struct ResourceDefinition {
    pub path: String,
    pub params: ParamMap,
    /// Bind `create`/`update`/`delete`/`get`/`list` before declared actions
    pub defaults: bool,
    pub actions: Vec<(String, ActionDefinition)>,
    pub transform: Option<ItemTransform>,
    pub setup: Option<SetupHook>,
}

impl fmt::Debug for ResourceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDefinition")
            .field("path", &self.path)
            .field("params", &self.params)
            .field("defaults", &self.defaults)
            .field("actions", &self.actions)
            .field("transform", &self.transform.is_some())
            .field("setup", &self.setup.is_some())
            .finish()
    }
}

impl ResourceDefinition {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: ParamMap::new(),
            defaults: true,
            actions: Vec::new(),
            transform: None,
            setup: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name, value);
        self
    }

    pub fn with_defaults(mut self, enabled: bool) -> Self {
        self.defaults = enabled;
        self
    }

    /// Declare an action; a later action with the same name replaces it
    pub fn action(mut self, name: impl Into<String>, action: ActionDefinition) -> Self {
        let name = name.into();
        self.actions.retain(|(existing, _)| *existing != name);
        self.actions.push((name, action));
        self
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: Fn(&mut ResourceBinder) + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(setup));
        self
    }
}

/// The actions bound when a resource keeps its default interface
pub(crate) fn default_actions() -> Vec<(&'static str, ActionDefinition)> {
    vec![
        ("create", ActionDefinition::post()),
        ("update", ActionDefinition::put()),
        ("delete", ActionDefinition::delete()),
        ("get", ActionDefinition::get()),
        ("list", ActionDefinition::get().array()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_ref_parsed_once() {
        assert_eq!(
            ParamValue::parse(json!("@account.id.value")),
            ParamValue::BodyRef(vec!["account".into(), "id".into(), "value".into()])
        );
        assert_eq!(ParamValue::parse(json!("plain")), ParamValue::Literal(json!("plain")));
        assert_eq!(ParamValue::parse(json!(123)), ParamValue::Literal(json!(123)));
        assert!(ParamValue::from(json!("@id")).is_body_ref());
        assert!(!ParamValue::from(json!("id")).is_body_ref());
    }

    #[test]
    fn test_action_flags_default_from_method() {
        let post = ActionDefinition::post();
        assert!(post.has_body);
        assert!(post.transform);

        let delete = ActionDefinition::delete();
        assert!(!delete.has_body);
        assert!(!delete.transform);

        let patch = ActionDefinition::patch();
        assert!(patch.has_body);
        assert!(!ActionDefinition::get().has_body);
    }

    #[test]
    fn test_action_deserialize_applies_defaults_and_overrides() {
        let action: ActionDefinition = serde_json::from_value(json!({
            "method": "DELETE",
            "path": "/:name",
            "params": { "name": "@name" },
            "has_body": true
        }))
        .unwrap();

        assert_eq!(action.method, HttpMethod::Delete);
        assert!(action.has_body);
        assert!(!action.transform);
        assert_eq!(action.params.get("name"), Some(&ParamValue::body_ref("name")));
    }

    #[test]
    fn test_param_map_merge_keeps_order_and_overrides() {
        let base: ParamMap = [("id", json!("@id")), ("page", json!(1))].into_iter().collect();
        let overrides: ParamMap = [("page", json!(2)), ("q", json!("x"))].into_iter().collect();

        let merged = base.merged(&overrides);
        let keys: Vec<&str> = merged.iter().map(|(k, _)| k).collect();

        assert_eq!(keys, vec!["id", "page", "q"]);
        assert_eq!(merged.get("page"), Some(&ParamValue::Literal(json!(2))));
    }

    #[test]
    fn test_call_site_values_are_literals() {
        let values = json!({ "id": "@id" });
        let params = ParamMap::from_literals(values.as_object().unwrap());
        assert_eq!(params.get("id"), Some(&ParamValue::Literal(json!("@id"))));
    }

    #[test]
    fn test_request_options_accept_camel_case() {
        let options: RequestOptions = serde_json::from_value(json!({
            "withCredentials": true,
            "responseType": "text",
            "headers": { "X-Trace": "1" }
        }))
        .unwrap();

        assert!(options.with_credentials);
        assert_eq!(options.response_type, Some(ResponseType::Text));
        assert_eq!(options.headers.get("X-Trace").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_redeclared_action_replaces_previous() {
        let def = ResourceDefinition::new("/test")
            .action("get", ActionDefinition::get())
            .action("get", ActionDefinition::get().array());

        assert_eq!(def.actions.len(), 1);
        assert!(def.actions[0].1.is_array);
    }
}
