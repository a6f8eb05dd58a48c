// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Output type tree.
//!
//! An [`Output<C, A>`] describes how values of type `A` are shaped for
//! encoding. Leaves carry encoders, objects carry fields with resolvers that
//! may defer work into the context `C`, and interfaces/unions carry the
//! members a value is narrowed to before encoding.
//!
//! The execution engine never sees `A`. [`Output::bind`] pairs a value with
//! its node and produces a [`Resolved<C>`] that can be walked field by field.

use core::fmt;
use std::sync::Arc;

use crate::context::{Context, ContextMap};

pub mod object;
pub mod polymorphic;
mod remap;
pub mod resolved;

use object::{FieldShape, ObjectOutput, ObjectShape};
use polymorphic::{InterfaceOutput, InterfaceShape, UnionOutput, UnionShape};
use remap::RemappedNode;
use resolved::{ResolveError, Resolved};

/// Type-erased output node.
pub trait OutputNode<C: Context, A>: Send + Sync {
    fn shape(&self) -> OutputShape<C>;

    fn bind(&self, value: A) -> Resolved<C>;
}

/// Shape of an output node without its encoders and resolvers.
///
/// Object shapes hold handles to their fields; the output shape of a field is
/// only computed when asked for, so shapes of recursive types are finite.
pub enum OutputShape<C: Context> {
    Scalar(Arc<str>),
    Enum {
        name: Arc<str>,
        values: Arc<[Arc<str>]>,
    },
    List(Box<OutputShape<C>>),
    Optional(Box<OutputShape<C>>),
    Object(ObjectShape<C>),
    Interface(InterfaceShape<C>),
    Union(UnionShape<C>),
}

impl<C: Context> Clone for OutputShape<C> {
    fn clone(&self) -> Self {
        match self {
            OutputShape::Scalar(name) => OutputShape::Scalar(Arc::clone(name)),
            OutputShape::Enum { name, values } => OutputShape::Enum {
                name: Arc::clone(name),
                values: Arc::clone(values),
            },
            OutputShape::List(inner) => OutputShape::List(inner.clone()),
            OutputShape::Optional(inner) => OutputShape::Optional(inner.clone()),
            OutputShape::Object(s) => OutputShape::Object(s.clone()),
            OutputShape::Interface(s) => OutputShape::Interface(s.clone()),
            OutputShape::Union(s) => OutputShape::Union(s.clone()),
        }
    }
}

impl<C: Context> fmt::Debug for OutputShape<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputShape::Scalar(name) => f.debug_tuple("Scalar").field(name).finish(),
            OutputShape::Enum { name, values } => f
                .debug_struct("Enum")
                .field("name", name)
                .field("values", values)
                .finish(),
            OutputShape::List(inner) => f.debug_tuple("List").field(inner).finish(),
            OutputShape::Optional(inner) => f.debug_tuple("Optional").field(inner).finish(),
            OutputShape::Object(s) => f.debug_tuple("Object").field(&s.name()).finish(),
            OutputShape::Interface(s) => f.debug_tuple("Interface").field(&s.name()).finish(),
            OutputShape::Union(s) => f.debug_tuple("Union").field(&s.name()).finish(),
        }
    }
}

impl<C: Context> OutputShape<C> {
    /// Name of the type at this level, `None` for list and optional wrappers.
    pub fn name(&self) -> Option<&str> {
        match self {
            OutputShape::List(_) | OutputShape::Optional(_) => None,
            _ => Some(self.named_type()),
        }
    }

    /// Name of the innermost named type.
    pub fn named_type(&self) -> &str {
        match self {
            OutputShape::List(inner) | OutputShape::Optional(inner) => inner.named_type(),
            OutputShape::Scalar(name) | OutputShape::Enum { name, .. } => name,
            OutputShape::Object(s) => s.name(),
            OutputShape::Interface(s) => s.name(),
            OutputShape::Union(s) => s.name(),
        }
    }

    /// Kind of the innermost named type, as printed in schema definitions.
    pub fn kind(&self) -> &'static str {
        match self {
            OutputShape::List(inner) | OutputShape::Optional(inner) => inner.kind(),
            OutputShape::Scalar(_) => "scalar",
            OutputShape::Enum { .. } => "enum",
            OutputShape::Object(_) => "type",
            OutputShape::Interface(_) => "interface",
            OutputShape::Union(_) => "union",
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, OutputShape::Optional(_))
    }

    /// Type reference in query-language notation, e.g. `[User!]`.
    pub fn type_ref(&self) -> String {
        match self {
            OutputShape::Optional(inner) => inner.bare_ref(),
            _ => format!("{}!", self.bare_ref()),
        }
    }

    fn bare_ref(&self) -> String {
        match self {
            OutputShape::List(inner) => format!("[{}]", inner.type_ref()),
            OutputShape::Optional(inner) => inner.bare_ref(),
            _ => self.named_type().to_string(),
        }
    }

    /// Fields of object and interface shapes.
    pub fn fields(&self) -> Option<&[FieldShape<C>]> {
        match self {
            OutputShape::Object(s) => Some(s.fields()),
            OutputShape::Interface(s) => Some(s.fields()),
            _ => None,
        }
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: &Arc<N>) -> OutputShape<D> {
        match self {
            OutputShape::Scalar(name) => OutputShape::Scalar(Arc::clone(name)),
            OutputShape::Enum { name, values } => OutputShape::Enum {
                name: Arc::clone(name),
                values: Arc::clone(values),
            },
            OutputShape::List(inner) => OutputShape::List(Box::new(inner.remap(nat))),
            OutputShape::Optional(inner) => OutputShape::Optional(Box::new(inner.remap(nat))),
            OutputShape::Object(s) => OutputShape::Object(s.remap(nat)),
            OutputShape::Interface(s) => OutputShape::Interface(s.remap(nat)),
            OutputShape::Union(s) => OutputShape::Union(s.remap(nat)),
        }
    }
}

/// A typed output node in the context `C`.
pub struct Output<C: Context, A> {
    node: Arc<dyn OutputNode<C, A>>,
}

impl<C: Context, A> Clone for Output<C, A> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<C: Context, A> fmt::Debug for Output<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Output").field(&self.node.shape()).finish()
    }
}

struct ScalarNode<A> {
    name: Arc<str>,
    encode: Box<dyn Fn(&A) -> serde_json::Value + Send + Sync>,
}

impl<C: Context, A> OutputNode<C, A> for ScalarNode<A> {
    fn shape(&self) -> OutputShape<C> {
        OutputShape::Scalar(Arc::clone(&self.name))
    }

    fn bind(&self, value: A) -> Resolved<C> {
        Resolved::Leaf((self.encode)(&value))
    }
}

struct EnumNode<A> {
    name: Arc<str>,
    values: Arc<[Arc<str>]>,
    mapping: Vec<(Arc<str>, A)>,
}

impl<C: Context, A: PartialEq + Send + Sync> OutputNode<C, A> for EnumNode<A> {
    fn shape(&self) -> OutputShape<C> {
        OutputShape::Enum {
            name: Arc::clone(&self.name),
            values: Arc::clone(&self.values),
        }
    }

    fn bind(&self, value: A) -> Resolved<C> {
        match self.mapping.iter().find(|(_, v)| *v == value) {
            Some((token, _)) => Resolved::Enum(token.to_string()),
            None => Resolved::Error(ResolveError::UnmappedEnumValue {
                enum_name: self.name.to_string(),
            }),
        }
    }
}

struct ListNode<C: Context, A> {
    inner: Output<C, A>,
}

impl<C: Context, A> OutputNode<C, Vec<A>> for ListNode<C, A> {
    fn shape(&self) -> OutputShape<C> {
        OutputShape::List(Box::new(self.inner.shape()))
    }

    fn bind(&self, values: Vec<A>) -> Resolved<C> {
        Resolved::List(values.into_iter().map(|v| self.inner.bind(v)).collect())
    }
}

struct OptionalNode<C: Context, A> {
    inner: Output<C, A>,
}

impl<C: Context, A> OutputNode<C, Option<A>> for OptionalNode<C, A> {
    fn shape(&self) -> OutputShape<C> {
        OutputShape::Optional(Box::new(self.inner.shape()))
    }

    fn bind(&self, value: Option<A>) -> Resolved<C> {
        match value {
            Some(v) => self.inner.bind(v),
            None => Resolved::Null,
        }
    }
}

impl<C: Context, A: 'static> Output<C, A> {
    pub fn from_node(node: impl OutputNode<C, A> + 'static) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// A leaf node encoded by a host-supplied function.
    pub fn scalar<F>(name: impl Into<Arc<str>>, encode: F) -> Self
    where
        F: Fn(&A) -> serde_json::Value + Send + Sync + 'static,
    {
        Self::from_node(ScalarNode {
            name: name.into(),
            encode: Box::new(encode),
        })
    }

    /// An enum node encoding each value as the token it is paired with.
    /// Values without a token bind to [`Resolved::Error`].
    pub fn enumeration<I, S>(name: impl Into<Arc<str>>, values: I) -> Self
    where
        I: IntoIterator<Item = (S, A)>,
        S: Into<Arc<str>>,
        A: PartialEq + Send + Sync,
    {
        let mapping: Vec<(Arc<str>, A)> = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::from_node(EnumNode {
            name: name.into(),
            values: mapping.iter().map(|(k, _)| Arc::clone(k)).collect(),
            mapping,
        })
    }

    pub fn list(self) -> Output<C, Vec<A>> {
        Output::from_node(ListNode { inner: self })
    }

    pub fn optional(self) -> Output<C, Option<A>> {
        Output::from_node(OptionalNode { inner: self })
    }

    /// Converts every deferred computation reachable from this node.
    pub fn remap<D: Context, N: ContextMap<C, D>>(self, nat: Arc<N>) -> Output<D, A> {
        Output::from_node(RemappedNode::new(self.node, nat))
    }
}

impl<C: Context, A> Output<C, A> {
    pub fn shape(&self) -> OutputShape<C> {
        self.node.shape()
    }

    pub fn type_ref(&self) -> String {
        self.node.shape().type_ref()
    }

    /// Pairs `value` with this node.
    pub fn bind(&self, value: A) -> Resolved<C> {
        self.node.bind(value)
    }
}

impl<C: Context, A: Send + 'static> From<ObjectOutput<C, A>> for Output<C, A> {
    fn from(object: ObjectOutput<C, A>) -> Self {
        Output::from_node(object)
    }
}

impl<C: Context, A: Send + 'static> From<InterfaceOutput<C, A>> for Output<C, A> {
    fn from(interface: InterfaceOutput<C, A>) -> Self {
        Output::from_node(interface)
    }
}

impl<C: Context, A: Send + 'static> From<UnionOutput<C, A>> for Output<C, A> {
    fn from(union: UnionOutput<C, A>) -> Self {
        Output::from_node(union)
    }
}
