//! Path template resolution
//!
//! Templates contain `/:name` segments. Each merged parameter either fills
//! its segment or, when the template has no such segment, becomes a query
//! parameter. Body references never leak into the query string.

use super::definition::{ParamMap, ParamValue};
use super::query::value_to_param;
use serde_json::{Map, Value};

/// Populated path plus the parameters left over for the query string
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    pub path: String,
    pub query: Map<String, Value>,
}

/// Resolve `template` against merged params and the optional call payload.
pub fn resolve_path<F>(
    template: &str,
    params: &ParamMap,
    payload: Option<&Value>,
    encode: F,
) -> ResolvedPath
where
    F: Fn(&str) -> String,
{
    let mut path = template.to_string();
    let mut query = Map::new();

    for (name, param) in params.iter() {
        if find_segment(&path, name, 0).is_none() {
            match param {
                ParamValue::Literal(value) => {
                    query.insert(name.to_string(), value.clone());
                }
                ParamValue::BodyRef(_) => {
                    tracing::trace!("dropping body reference '{}' with no path segment", name);
                }
            }
            continue;
        }

        let value = match param {
            ParamValue::Literal(value) => present(value),
            ParamValue::BodyRef(segments) => {
                let resolved = payload.and_then(|p| lookup(p, segments)).and_then(present);
                if resolved.is_none() {
                    tracing::debug!("body reference for '{}' is unresolved, removing segment", name);
                }
                resolved
            }
        };

        let replacement = match value {
            Some(value) => format!("/{}", encode(&value_to_param(value))),
            None => String::new(),
        };

        if let Some(replaced) = replace_segment(&path, name, &replacement) {
            path = replaced;
        }
    }

    ResolvedPath {
        path: strip_unmatched(&path),
        query,
    }
}

/// Walk `payload` along a dot path. Missing or null segments resolve to `None`.
pub fn lookup<'a>(payload: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = payload;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            // Handle array index
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };

        if current.is_null() {
            return None;
        }
    }

    Some(current)
}

/// Join a base path and a suffix with exactly one `/` between them
pub fn join_path(base: &str, suffix: &str) -> String {
    let suffix = suffix.trim_start_matches('/');
    if suffix.is_empty() {
        return base.to_string();
    }

    format!("{}/{}", base.trim_end_matches('/'), suffix)
}

fn present(value: &Value) -> Option<&Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(other),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte offset of the first `/:name` segment at or after `from`
fn find_segment(path: &str, name: &str, from: usize) -> Option<usize> {
    let needle = format!("/:{}", name);
    let mut start = from;

    while let Some(offset) = path[start..].find(&needle) {
        let at = start + offset;
        let end = at + needle.len();
        if !path[end..].starts_with(is_name_char) {
            return Some(at);
        }
        start = at + 1;
    }

    None
}

fn replace_segment(path: &str, name: &str, replacement: &str) -> Option<String> {
    let needle_len = name.len() + 2;
    let mut out = String::with_capacity(path.len());
    let mut cursor = 0;
    let mut found = false;

    while let Some(at) = find_segment(path, name, cursor) {
        out.push_str(&path[cursor..at]);
        out.push_str(replacement);
        cursor = at + needle_len;
        found = true;
    }

    if !found {
        return None;
    }

    out.push_str(&path[cursor..]);
    Some(out)
}

/// Remove `/:name` segments that no parameter filled
fn strip_unmatched(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(at) = rest.find("/:") {
        out.push_str(&rest[..at]);
        let after = &rest[at + 2..];
        let name_len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());

        if name_len == 0 {
            out.push_str("/:");
        }
        rest = &after[name_len..];
    }

    out.push_str(rest);
    out
}
