// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;
use std::borrow::Cow;
use std::slice;

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

// Values reach the decoders in two forms. Literals written in a query document
// arrive as native lists/objects/enum tokens, while variables and other raw
// payloads arrive as a single JSON leaf that may itself be array- or
// object-shaped. Decoders accept both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// JSON-like leaf. Null is represented as `Leaf(serde_json::Value::Null)`.
    Leaf(serde_json::Value),

    /// Ordered list of values.
    List(Vec<Value>),

    /// Keyed collection of named values. Keys are unique; order is preserved.
    Object(IndexMap<String, Value>),

    /// Bare enum token.
    Enum(String),
}

impl Value {
    pub fn null() -> Self {
        Value::Leaf(serde_json::Value::Null)
    }

    pub fn enum_token(token: impl Into<String>) -> Self {
        Value::Enum(token.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Leaf(serde_json::Value::Null))
    }

    pub fn as_leaf(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Leaf(v) => Some(v),
            _ => None,
        }
    }

    /// Enum tokens and string leaves both name an enum value.
    pub fn as_token(&self) -> Option<&str> {
        match self {
            Value::Enum(token) => Some(token),
            Value::Leaf(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// List view over either a native list or an array-shaped leaf.
    pub fn elements(&self) -> Option<Elements<'_>> {
        match self {
            Value::List(items) => Some(Elements::Native(items.iter())),
            Value::Leaf(serde_json::Value::Array(items)) => Some(Elements::Json(items.iter())),
            _ => None,
        }
    }

    /// Keyed view over either a native object or an object-shaped leaf.
    pub fn as_keyed(&self) -> Option<Keyed<'_>> {
        match self {
            Value::Object(fields) => Some(Keyed::Native(fields)),
            Value::Leaf(serde_json::Value::Object(fields)) => Some(Keyed::Json(fields)),
            _ => None,
        }
    }

    /// Name of the observed shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Leaf(serde_json::Value::Null) => "null",
            Value::Leaf(serde_json::Value::Bool(_)) => "boolean",
            Value::Leaf(serde_json::Value::Number(_)) => "number",
            Value::Leaf(serde_json::Value::String(_)) => "string",
            Value::Leaf(serde_json::Value::Array(_)) => "array",
            Value::Leaf(serde_json::Value::Object(_)) => "object",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::Enum(_) => "enum",
        }
    }
}

pub enum Elements<'a> {
    Native(slice::Iter<'a, Value>),
    Json(slice::Iter<'a, serde_json::Value>),
}

impl<'a> Iterator for Elements<'a> {
    type Item = Cow<'a, Value>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Elements::Native(it) => it.next().map(Cow::Borrowed),
            Elements::Json(it) => it.next().map(|v| Cow::Owned(Value::Leaf(v.clone()))),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Elements::Native(it) => it.size_hint(),
            Elements::Json(it) => it.size_hint(),
        }
    }
}

pub enum Keyed<'a> {
    Native(&'a IndexMap<String, Value>),
    Json(&'a serde_json::Map<String, serde_json::Value>),
}

impl<'a> Keyed<'a> {
    pub fn get(&self, name: &str) -> Option<Cow<'a, Value>> {
        match self {
            Keyed::Native(fields) => fields.get(name).map(Cow::Borrowed),
            Keyed::Json(fields) => fields.get(name).map(|v| Cow::Owned(Value::Leaf(v.clone()))),
        }
    }

    pub fn keys(&self) -> Vec<&'a str> {
        match self {
            Keyed::Native(fields) => fields.keys().map(String::as_str).collect(),
            Keyed::Json(fields) => fields.keys().map(String::as_str).collect(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Leaf(v) => v.serialize(serializer),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            // display enum tokens as strings
            Value::Enum(token) => serializer.serialize_str(token),
        }
    }
}

// Any JSON document is a leaf; native lists/objects only come from literals.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Value::Leaf)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{s}"),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Leaf(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Leaf(serde_json::Value::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Leaf(serde_json::Value::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Leaf(serde_json::Value::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Leaf(serde_json::Value::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Leaf(serde_json::Value::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Value::Object(fields)
    }
}

impl<V: Into<Value>> FromIterator<(String, V)> for Value {
    fn from_iter<T: IntoIterator<Item = (String, V)>>(iter: T) -> Self {
        Value::Object(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
