// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::context::{Context, ContextMap, Resolution};
use crate::input::error::DecodeError;
use crate::output::remap::{RemappedAbstract, RemappedBound};
use crate::output::OutputShape;
use crate::output::object::ObjectShape;
use crate::value::Value;

/// Errors raised while resolving fields of bound values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown field {field} on type {type_name}")]
    UnknownField { field: String, type_name: String },

    #[error("unknown argument {argument} for field {type_name}.{field}")]
    UnknownArgument {
        argument: String,
        field: String,
        type_name: String,
    },

    #[error(transparent)]
    InvalidArguments(#[from] DecodeError),

    #[error("no member of {type_name} matches the value")]
    NoMatchingMember { type_name: String },

    #[error("enum {enum_name} has no token for the value")]
    UnmappedEnumValue { enum_name: String },
}

/// Result of resolving a field: the bound field value, possibly deferred.
pub type FieldResolution<C> = Resolution<C, Resolved<C>>;

/// A value paired with its output node.
pub enum Resolved<C: Context> {
    /// Encoded scalar.
    Leaf(serde_json::Value),
    /// Encoded enum token.
    Enum(String),
    Null,
    List(Vec<Resolved<C>>),
    Object(ResolvedObject<C>),
    Abstract(ResolvedAbstract<C>),
    /// The value could not be encoded by its node.
    Error(ResolveError),
}

impl<C: Context> Resolved<C> {
    pub fn is_null(&self) -> bool {
        matches!(self, Resolved::Null)
    }

    pub fn as_object(&self) -> Option<&ResolvedObject<C>> {
        match self {
            Resolved::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_abstract(&self) -> Option<&ResolvedAbstract<C>> {
        match self {
            Resolved::Abstract(a) => Some(a),
            _ => None,
        }
    }

    /// Encoded form of leaves, enum tokens, nulls and lists of those.
    /// Objects need a selection and yield `None`, as do encoding errors.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Resolved::Leaf(v) => Some(v.clone()),
            Resolved::Enum(token) => Some(serde_json::Value::from(token.as_str())),
            Resolved::Null => Some(serde_json::Value::Null),
            Resolved::List(items) => items
                .iter()
                .map(Resolved::to_json)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Resolved::Object(_) | Resolved::Abstract(_) | Resolved::Error(_) => None,
        }
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(self, nat: &Arc<N>) -> Resolved<D> {
        match self {
            Resolved::Leaf(v) => Resolved::Leaf(v),
            Resolved::Enum(token) => Resolved::Enum(token),
            Resolved::Null => Resolved::Null,
            Resolved::List(items) => {
                Resolved::List(items.into_iter().map(|r| r.remap(nat)).collect())
            }
            Resolved::Object(o) => Resolved::Object(o.remap(Arc::clone(nat))),
            Resolved::Abstract(a) => Resolved::Abstract(a.remap(Arc::clone(nat))),
            Resolved::Error(e) => Resolved::Error(e),
        }
    }
}

impl<C: Context> fmt::Debug for Resolved<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Leaf(v) => f.debug_tuple("Leaf").field(v).finish(),
            Resolved::Enum(token) => f.debug_tuple("Enum").field(token).finish(),
            Resolved::Null => f.write_str("Null"),
            Resolved::List(items) => f.debug_tuple("List").field(items).finish(),
            Resolved::Object(o) => o.fmt(f),
            Resolved::Abstract(a) => a.fmt(f),
            Resolved::Error(e) => f.debug_tuple("Error").field(e).finish(),
        }
    }
}

/// An object value whose fields are resolved on demand.
pub(crate) trait BoundObject<C: Context>: Send {
    fn typename(&self) -> &str;

    fn shape(&self) -> ObjectShape<C>;

    fn resolve(
        &self,
        field: &str,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, ResolveError>;

    fn resolve_with(
        &self,
        field: &str,
        args: &IndexMap<String, Value>,
    ) -> Result<FieldResolution<C>, ResolveError>;
}

/// An interface or union value awaiting narrowing.
pub(crate) trait BoundAbstract<C: Context>: Send {
    fn typename(&self) -> &str;

    fn shape(&self) -> OutputShape<C>;

    fn narrow(&self) -> Result<ResolvedObject<C>, ResolveError>;

    fn resolve(
        &self,
        field: &str,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, ResolveError>;
}

pub struct ResolvedObject<C: Context> {
    inner: Box<dyn BoundObject<C>>,
}

impl<C: Context> ResolvedObject<C> {
    pub(crate) fn new(inner: impl BoundObject<C> + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    pub fn typename(&self) -> &str {
        self.inner.typename()
    }

    pub fn shape(&self) -> ObjectShape<C> {
        self.inner.shape()
    }

    /// Resolves `field` with one positional value per declared argument.
    pub fn resolve(
        &self,
        field: &str,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, ResolveError> {
        self.inner.resolve(field, args)
    }

    /// Resolves `field` with arguments given by name. Absent arguments fall
    /// back to their defaults.
    pub fn resolve_with(
        &self,
        field: &str,
        args: &IndexMap<String, Value>,
    ) -> Result<FieldResolution<C>, ResolveError> {
        self.inner.resolve_with(field, args)
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(self, nat: Arc<N>) -> ResolvedObject<D> {
        ResolvedObject::new(RemappedBound::new(self.inner, nat))
    }
}

impl<C: Context> fmt::Debug for ResolvedObject<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Object").field(&self.typename()).finish()
    }
}

pub struct ResolvedAbstract<C: Context> {
    inner: Box<dyn BoundAbstract<C>>,
}

impl<C: Context> ResolvedAbstract<C> {
    pub(crate) fn new(inner: impl BoundAbstract<C> + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Name of the interface or union.
    pub fn typename(&self) -> &str {
        self.inner.typename()
    }

    pub fn shape(&self) -> OutputShape<C> {
        self.inner.shape()
    }

    /// The first member, in declaration order, that accepts the value.
    pub fn narrow(&self) -> Result<ResolvedObject<C>, ResolveError> {
        self.inner.narrow()
    }

    /// Resolves a field declared on the interface itself.
    pub fn resolve(
        &self,
        field: &str,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, ResolveError> {
        self.inner.resolve(field, args)
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(self, nat: Arc<N>) -> ResolvedAbstract<D> {
        ResolvedAbstract::new(RemappedAbstract::new(self.inner, nat))
    }
}

impl<C: Context> fmt::Debug for ResolvedAbstract<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Abstract").field(&self.typename()).finish()
    }
}
