// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Input decoders.
//!
//! An [`Input<A>`] turns an untyped external [`Value`] into an `A`, or reports
//! which field or type failed. Inputs are built bottom-up from scalars,
//! enumerations and input objects, then wrapped as lists or optionals:
//!
//! ```rust
//! use shapeql::{Accumulator, Input, Value};
//! use serde_json::json;
//!
//! let int = Input::scalar("Int", |v| v.as_i64().ok_or_else(|| "not an int".to_string()));
//! let point = Input::object(
//!     "Point",
//!     Accumulator::field("x", int.clone()).merge(Accumulator::field_or("y", int, 0), |x, y| (x, y)),
//! );
//!
//! assert_eq!(point.decode(&Value::from(json!({ "x": 3 }))), Ok((3, 0)));
//! ```

use core::fmt;
use std::borrow::Cow;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use crate::accumulator::{Accumulator, Entry};
use crate::value::Value;

pub mod error;

use error::DecodeError;

type Decoder<A> = dyn Fn(&Value) -> Result<A, DecodeError> + Send + Sync;

/// Reference to a named input type whose definition is built on first use.
#[derive(Clone)]
pub struct InputRef {
    name: Arc<str>,
    resolve: Arc<dyn Fn() -> InputShape + Send + Sync>,
}

impl InputRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape of the referenced definition. Forces the definition.
    pub fn resolve(&self) -> InputShape {
        (self.resolve)()
    }
}

impl fmt::Debug for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InputRef").field(&self.name).finish()
    }
}

impl PartialEq for InputRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for InputRef {}

/// Declared shape of an input, without its decoding logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputShape {
    Scalar(Arc<str>),
    Enum {
        name: Arc<str>,
        values: Arc<[Arc<str>]>,
    },
    Object {
        name: Arc<str>,
        fields: Arc<[Entry]>,
    },
    List(Box<InputShape>),
    Optional(Box<InputShape>),
    Ref(InputRef),
}

impl InputShape {
    /// Name of the type at this level, `None` for list and optional wrappers.
    pub fn name(&self) -> Option<&str> {
        match self {
            InputShape::Scalar(name) => Some(name),
            InputShape::Enum { name, .. } | InputShape::Object { name, .. } => Some(name),
            InputShape::Ref(r) => Some(r.name()),
            InputShape::List(_) | InputShape::Optional(_) => None,
        }
    }

    /// Name of the innermost named type.
    pub fn named_type(&self) -> &str {
        match self {
            InputShape::List(inner) | InputShape::Optional(inner) => inner.named_type(),
            InputShape::Scalar(name) => name,
            InputShape::Enum { name, .. } | InputShape::Object { name, .. } => name,
            InputShape::Ref(r) => r.name(),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, InputShape::Optional(_))
    }

    /// Type reference in query-language notation, e.g. `[Int!]!`.
    pub fn type_ref(&self) -> String {
        match self {
            InputShape::Optional(inner) => inner.bare_ref(),
            _ => format!("{}!", self.bare_ref()),
        }
    }

    fn bare_ref(&self) -> String {
        match self {
            InputShape::List(inner) => format!("[{}]", inner.type_ref()),
            InputShape::Optional(inner) => inner.bare_ref(),
            _ => self.named_type().to_string(),
        }
    }
}

/// A typed decoder from an external [`Value`] to an `A`.
pub struct Input<A> {
    shape: InputShape,
    decoder: Arc<Decoder<A>>,
}

impl<A> Clone for Input<A> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape.clone(),
            decoder: Arc::clone(&self.decoder),
        }
    }
}

impl<A> fmt::Debug for Input<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input").field("shape", &self.shape).finish()
    }
}

impl<A: 'static> Input<A> {
    fn from_parts<F>(shape: InputShape, decoder: F) -> Self
    where
        F: Fn(&Value) -> Result<A, DecodeError> + Send + Sync + 'static,
    {
        Self {
            shape,
            decoder: Arc::new(decoder),
        }
    }

    /// A leaf input decoded by a host-supplied function. Null and non-leaf
    /// values are rejected before the decoder runs.
    pub fn scalar<F>(name: impl Into<Arc<str>>, decode: F) -> Self
    where
        F: Fn(&serde_json::Value) -> Result<A, String> + Send + Sync + 'static,
    {
        let name: Arc<str> = name.into();
        let shape = InputShape::Scalar(Arc::clone(&name));
        Self::from_parts(shape, move |value| match value {
            Value::Leaf(json) if !json.is_null() => {
                decode(json).map_err(|message| DecodeError::InvalidScalar {
                    scalar: name.to_string(),
                    message,
                })
            }
            _ => Err(DecodeError::ShapeMismatch {
                expected: "scalar",
                type_name: name.to_string(),
                actual: value.type_name(),
            }),
        })
    }

    /// An enum input mapping each token to a value by exact lookup.
    pub fn enumeration<I, S>(name: impl Into<Arc<str>>, values: I) -> Self
    where
        I: IntoIterator<Item = (S, A)>,
        S: Into<String>,
        A: Clone + Send + Sync,
    {
        let name: Arc<str> = name.into();
        let mapping: IndexMap<String, A> = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let shape = InputShape::Enum {
            name: Arc::clone(&name),
            values: mapping.keys().map(|k| Arc::from(k.as_str())).collect(),
        };
        Self::from_parts(shape, move |value| match value.as_token() {
            Some(token) => {
                mapping
                    .get(token)
                    .cloned()
                    .ok_or_else(|| DecodeError::UnknownEnumToken {
                        token: token.to_string(),
                        enum_name: name.to_string(),
                    })
            }
            None => Err(DecodeError::ShapeMismatch {
                expected: "enum",
                type_name: name.to_string(),
                actual: value.type_name(),
            }),
        })
    }

    /// An input object. Fields are resolved in declared order from the payload
    /// or their defaults, then assembled by the accumulator.
    pub fn object(name: impl Into<Arc<str>>, fields: Accumulator<A>) -> Self {
        let name: Arc<str> = name.into();
        let shape = InputShape::Object {
            name: Arc::clone(&name),
            fields: fields.entries().into(),
        };
        Self::from_parts(shape, move |value| {
            let keyed = value.as_keyed().ok_or_else(|| DecodeError::ShapeMismatch {
                expected: "input object",
                type_name: name.to_string(),
                actual: value.type_name(),
            })?;

            let raw: Vec<Option<Cow<'_, Value>>> = fields
                .entries()
                .iter()
                .map(|entry| keyed.get(&entry.name))
                .collect();
            let positional: Vec<Option<&Value>> = raw.iter().map(|v| v.as_deref()).collect();

            let decoded = fields.decode(&name, &positional).map_err(|e| {
                tracing::trace!(object = %name, error = %e, "input object decode failed");
                e
            })?;

            if let Some(unknown) = keyed
                .keys()
                .into_iter()
                .find(|key| !fields.entries().iter().any(|e| &*e.name == *key))
            {
                return Err(DecodeError::UnknownField {
                    field: unknown.to_string(),
                    object: name.to_string(),
                });
            }

            Ok(decoded)
        })
    }

    /// A named input built on first use and memoized. Allows input objects to
    /// refer to themselves.
    pub fn lazy<F>(name: impl Into<Arc<str>>, thunk: F) -> Self
    where
        F: Fn() -> Input<A> + Send + Sync + 'static,
    {
        let cell: Arc<OnceCell<Input<A>>> = Arc::new(OnceCell::new());
        let thunk = Arc::new(thunk);

        let shape = InputShape::Ref(InputRef {
            name: name.into(),
            resolve: {
                let cell = Arc::clone(&cell);
                let thunk = Arc::clone(&thunk);
                Arc::new(move || cell.get_or_init(|| thunk()).shape.clone())
            },
        });

        Self::from_parts(shape, move |value| cell.get_or_init(|| thunk()).decode(value))
    }

    /// Decodes a list (or array-shaped leaf) element by element, stopping at
    /// the first failing element.
    pub fn list(self) -> Input<Vec<A>> {
        let shape = InputShape::List(Box::new(self.shape.clone()));
        let type_ref = shape.type_ref();
        Input::from_parts(shape, move |value| match value.elements() {
            Some(items) => items.map(|item| self.decode(&item)).collect(),
            None => Err(DecodeError::ShapeMismatch {
                expected: "list",
                type_name: type_ref.clone(),
                actual: value.type_name(),
            }),
        })
    }

    /// Null decodes to `None`; anything else is delegated.
    pub fn optional(self) -> Input<Option<A>> {
        let shape = InputShape::Optional(Box::new(self.shape.clone()));
        Input::from_parts(shape, move |value| {
            if value.is_null() {
                Ok(None)
            } else {
                self.decode(value).map(Some)
            }
        })
    }

    /// Post-transforms decoded values. The shape is unchanged.
    pub fn map<B, F>(self, f: F) -> Input<B>
    where
        B: 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let shape = self.shape.clone();
        Input::from_parts(shape, move |value| self.decode(value).map(&f))
    }
}

impl<A> Input<A> {
    pub fn decode(&self, value: &Value) -> Result<A, DecodeError> {
        (self.decoder)(value)
    }

    pub fn shape(&self) -> &InputShape {
        &self.shape
    }

    pub fn type_ref(&self) -> String {
        self.shape.type_ref()
    }
}
