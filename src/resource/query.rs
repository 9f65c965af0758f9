//! Query string serialization
//!
//! Arrays are exploded with a bracketed index (`tags[0]=a&tags[1]=b`).
//! Keys and values are encoded separately so a transport can swap the
//! encoder without touching the layout.

use serde_json::{Map, Value};

/// Percent-encode one path or query component
pub fn encode_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Render a JSON value the way it appears in a URL
pub fn value_to_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        compound => compound.to_string(),
    }
}

/// Serialize a query map into `k1=v1&k2=v2` (no leading `?`).
///
/// `null` values are left out.
pub fn serialize_query<F>(query: &Map<String, Value>, encode: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut pairs = Vec::with_capacity(query.len());

    for (key, value) in query {
        match value {
            Value::Null => continue,
            Value::Array(items) => {
                let key = encode(key);
                for (index, item) in items.iter().enumerate() {
                    pairs.push(format!("{}[{}]={}", key, index, encode(&value_to_param(item))));
                }
            }
            scalar => pairs.push(format!("{}={}", encode(key), encode(&value_to_param(scalar)))),
        }
    }

    pairs.join("&")
}
