// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Interfaces and unions.
//!
//! Abstract values are narrowed to exactly one concrete member before they can
//! be encoded. Members are tried in declaration order; the first whose
//! [`Specify`] accepts the value wins.

use core::fmt;
use std::sync::Arc;

use crate::context::{Context, ContextMap};
use crate::output::object::{Field, FieldEntry, FieldShape, Fields, ObjectOutput, ObjectShape};
use crate::output::remap::RemappedMember;
use crate::output::resolved::{
    BoundAbstract, FieldResolution, ResolveError, Resolved, ResolvedAbstract, ResolvedObject,
};
use crate::output::{OutputNode, OutputShape};
use crate::value::Value;

/// Types that are one case of an abstract type `A`.
///
/// Implemented by the member types of a host enum:
/// ```rust
/// use shapeql::Subtype;
///
/// #[derive(Clone)]
/// struct Dog { name: String }
/// #[derive(Clone)]
/// struct Cat { lives: i64 }
///
/// enum Pet { Dog(Dog), Cat(Cat) }
///
/// impl Subtype<Pet> for Dog {
///     fn narrow(value: &Pet) -> Option<Self> {
///         match value {
///             Pet::Dog(d) => Some(d.clone()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Subtype<A>: Sized {
    fn narrow(value: &A) -> Option<Self>;
}

/// Partial mapping from an abstract value to one member representation.
pub struct Specify<A, B> {
    f: Arc<dyn Fn(&A) -> Option<B> + Send + Sync>,
}

impl<A, B> Clone for Specify<A, B> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<A, B> fmt::Debug for Specify<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Specify(..)")
    }
}

impl<A: 'static, B: 'static> Specify<A, B> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&A) -> Option<B> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Narrows by [`Subtype`].
    pub fn subtype() -> Self
    where
        B: Subtype<A>,
    {
        Self::new(B::narrow)
    }

    pub fn apply(&self, value: &A) -> Option<B> {
        (self.f)(value)
    }

    /// Pre-transforms the probed value.
    pub fn contramap<X, F>(self, g: F) -> Specify<X, B>
    where
        X: 'static,
        F: Fn(&X) -> A + Send + Sync + 'static,
    {
        let f = self.f;
        Specify::new(move |x: &X| f(&g(x)))
    }

    /// Post-transforms the narrowed value.
    pub fn map<R, F>(self, g: F) -> Specify<A, R>
    where
        R: 'static,
        F: Fn(B) -> R + Send + Sync + 'static,
    {
        let f = self.f;
        Specify::new(move |a: &A| f(a).map(&g))
    }
}

/// One member of an interface or union.
pub(crate) trait Member<C: Context, A>: Send + Sync {
    fn shape(&self) -> ObjectShape<C>;

    fn matches(&self, value: &A) -> bool;

    fn narrow(&self, value: &A) -> Option<ResolvedObject<C>>;
}

struct Concrete<C: Context, A, B> {
    object: ObjectOutput<C, B>,
    specify: Specify<A, B>,
}

impl<C: Context, A: 'static, B: Send + 'static> Member<C, A> for Concrete<C, A, B> {
    fn shape(&self) -> ObjectShape<C> {
        self.object.shape()
    }

    fn matches(&self, value: &A) -> bool {
        self.specify.apply(value).is_some()
    }

    fn narrow(&self, value: &A) -> Option<ResolvedObject<C>> {
        self.specify.apply(value).map(|b| self.object.bind(b))
    }
}

struct ContramappedMember<C: Context, A, X> {
    inner: Arc<dyn Member<C, A>>,
    f: Arc<dyn Fn(&X) -> A + Send + Sync>,
}

impl<C: Context, A, X> Member<C, X> for ContramappedMember<C, A, X> {
    fn shape(&self) -> ObjectShape<C> {
        self.inner.shape()
    }

    fn matches(&self, value: &X) -> bool {
        self.inner.matches(&(self.f)(value))
    }

    fn narrow(&self, value: &X) -> Option<ResolvedObject<C>> {
        self.inner.narrow(&(self.f)(value))
    }
}

/// A concrete member of an abstract type `A`. Its name is the name of its
/// object type.
pub struct Instance<C: Context, A> {
    name: Arc<str>,
    member: Arc<dyn Member<C, A>>,
}

impl<C: Context, A> Clone for Instance<C, A> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            member: Arc::clone(&self.member),
        }
    }
}

impl<C: Context, A> fmt::Debug for Instance<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instance").field(&self.name).finish()
    }
}

impl<C: Context, A: 'static> Instance<C, A> {
    pub fn new<B: Send + 'static>(object: ObjectOutput<C, B>, specify: Specify<A, B>) -> Self {
        Self {
            name: Arc::from(object.name()),
            member: Arc::new(Concrete { object, specify }),
        }
    }

    /// Member narrowed by [`Subtype`].
    pub fn of<B: Subtype<A> + Send + 'static>(object: ObjectOutput<C, B>) -> Self {
        Self::new(object, Specify::subtype())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> ObjectShape<C> {
        self.member.shape()
    }

    pub fn matches(&self, value: &A) -> bool {
        self.member.matches(value)
    }

    pub fn narrow(&self, value: &A) -> Option<ResolvedObject<C>> {
        self.member.narrow(value)
    }

    pub fn contramap<X, F>(&self, f: F) -> Instance<C, X>
    where
        X: 'static,
        F: Fn(&X) -> A + Send + Sync + 'static,
    {
        self.contramap_shared(Arc::new(f))
    }

    fn contramap_shared<X: 'static>(
        &self,
        f: Arc<dyn Fn(&X) -> A + Send + Sync>,
    ) -> Instance<C, X> {
        Instance {
            name: Arc::clone(&self.name),
            member: Arc::new(ContramappedMember {
                inner: Arc::clone(&self.member),
                f,
            }),
        }
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: Arc<N>) -> Instance<D, A> {
        Instance {
            name: Arc::clone(&self.name),
            member: Arc::new(RemappedMember::new(Arc::clone(&self.member), nat)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Interface,
    Union,
}

/// State shared by interfaces and unions.
struct Polymorphic<C: Context, A> {
    kind: Kind,
    name: Arc<str>,
    fields: Fields<C, A>,
    members: Arc<[Instance<C, A>]>,
}

impl<C: Context, A> Clone for Polymorphic<C, A> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            name: Arc::clone(&self.name),
            fields: self.fields.clone(),
            members: Arc::clone(&self.members),
        }
    }
}

impl<C: Context, A: 'static> Polymorphic<C, A> {
    fn member_shapes(&self) -> Arc<[ObjectShape<C>]> {
        self.members.iter().map(Instance::shape).collect()
    }

    fn shape(&self) -> OutputShape<C> {
        match self.kind {
            Kind::Interface => OutputShape::Interface(InterfaceShape {
                name: Arc::clone(&self.name),
                fields: Arc::clone(self.fields.shapes()),
                members: self.member_shapes(),
            }),
            Kind::Union => OutputShape::Union(UnionShape {
                name: Arc::clone(&self.name),
                members: self.member_shapes(),
            }),
        }
    }

    fn narrow(&self, value: &A) -> Result<ResolvedObject<C>, ResolveError> {
        let narrowed = self.members.iter().find_map(|m| m.narrow(value));
        narrowed.ok_or_else(|| {
            tracing::trace!(type_name = %self.name, "no member matches value");
            ResolveError::NoMatchingMember {
                type_name: self.name.to_string(),
            }
        })
    }

    fn matching_members(&self, value: &A) -> Vec<&str> {
        self.members
            .iter()
            .filter(|m| m.matches(value))
            .map(Instance::name)
            .collect()
    }

    fn contramap<B: 'static>(&self, f: Arc<dyn Fn(&B) -> A + Send + Sync>) -> Polymorphic<C, B> {
        Polymorphic {
            kind: self.kind,
            name: Arc::clone(&self.name),
            fields: self.fields.contramap(Arc::clone(&f)),
            members: self
                .members
                .iter()
                .map(|m| m.contramap_shared(Arc::clone(&f)))
                .collect(),
        }
    }

    fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: Arc<N>) -> Polymorphic<D, A> {
        Polymorphic {
            kind: self.kind,
            name: Arc::clone(&self.name),
            fields: self.fields.remap(&nat),
            members: self
                .members
                .iter()
                .map(|m| m.remap(Arc::clone(&nat)))
                .collect(),
        }
    }
}

struct BoundPolymorphic<C: Context, A> {
    output: Polymorphic<C, A>,
    value: A,
}

impl<C: Context, A: Send + 'static> BoundAbstract<C> for BoundPolymorphic<C, A> {
    fn typename(&self) -> &str {
        &self.output.name
    }

    fn shape(&self) -> OutputShape<C> {
        self.output.shape()
    }

    fn narrow(&self) -> Result<ResolvedObject<C>, ResolveError> {
        self.output.narrow(&self.value)
    }

    fn resolve(
        &self,
        field: &str,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, ResolveError> {
        self.output
            .fields
            .resolve(&self.output.name, &self.value, field, args)
    }
}

impl<C: Context, A: Send + 'static> Polymorphic<C, A> {
    fn bind(&self, value: A) -> Resolved<C> {
        Resolved::Abstract(ResolvedAbstract::new(BoundPolymorphic {
            output: self.clone(),
            value,
        }))
    }
}

/// Shape of an interface type.
pub struct InterfaceShape<C: Context> {
    name: Arc<str>,
    fields: Arc<[FieldShape<C>]>,
    members: Arc<[ObjectShape<C>]>,
}

impl<C: Context> Clone for InterfaceShape<C> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            fields: Arc::clone(&self.fields),
            members: Arc::clone(&self.members),
        }
    }
}

impl<C: Context> InterfaceShape<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldShape<C>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldShape<C>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn members(&self) -> &[ObjectShape<C>] {
        &self.members
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: &Arc<N>) -> InterfaceShape<D> {
        InterfaceShape {
            name: Arc::clone(&self.name),
            fields: self.fields.iter().map(|f| f.remap(nat)).collect(),
            members: self.members.iter().map(|m| m.remap(nat)).collect(),
        }
    }
}

/// Shape of a union type.
pub struct UnionShape<C: Context> {
    name: Arc<str>,
    members: Arc<[ObjectShape<C>]>,
}

impl<C: Context> Clone for UnionShape<C> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            members: Arc::clone(&self.members),
        }
    }
}

impl<C: Context> UnionShape<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[ObjectShape<C>] {
        &self.members
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: &Arc<N>) -> UnionShape<D> {
        UnionShape {
            name: Arc::clone(&self.name),
            members: self.members.iter().map(|m| m.remap(nat)).collect(),
        }
    }
}

/// An interface: fields shared by all members, resolvable on the abstract
/// value itself, plus the members a value narrows to.
pub struct InterfaceOutput<C: Context, A> {
    inner: Polymorphic<C, A>,
}

impl<C: Context, A> Clone for InterfaceOutput<C, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Context, A> fmt::Debug for InterfaceOutput<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceOutput")
            .field("name", &self.inner.name)
            .field("members", &self.inner.members)
            .finish()
    }
}

pub struct InterfaceBuilder<C: Context, A> {
    name: Arc<str>,
    fields: Vec<FieldEntry<C, A>>,
    members: Vec<Instance<C, A>>,
}

impl<C: Context, A: 'static> InterfaceBuilder<C, A> {
    pub fn field<T: Send + 'static>(
        mut self,
        name: impl Into<Arc<str>>,
        field: Field<C, A, T>,
    ) -> Self {
        self.fields.push(FieldEntry::new(name.into(), field));
        self
    }

    pub fn member(mut self, instance: Instance<C, A>) -> Self {
        self.members.push(instance);
        self
    }

    pub fn build(self) -> InterfaceOutput<C, A> {
        InterfaceOutput {
            inner: Polymorphic {
                kind: Kind::Interface,
                name: self.name,
                fields: Fields::new(self.fields),
                members: self.members.into(),
            },
        }
    }
}

impl<C: Context, A: 'static> InterfaceOutput<C, A> {
    pub fn builder(name: impl Into<Arc<str>>) -> InterfaceBuilder<C, A> {
        InterfaceBuilder {
            name: name.into(),
            fields: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn fields(&self) -> &[FieldShape<C>] {
        self.inner.fields.shapes()
    }

    pub fn field(&self, name: &str) -> Option<&FieldShape<C>> {
        self.fields().iter().find(|f| f.name() == name)
    }

    pub fn members(&self) -> &[Instance<C, A>] {
        &self.inner.members
    }

    /// Resolves an interface field directly on the abstract value.
    pub fn resolve(
        &self,
        parent: &A,
        field: &str,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, ResolveError> {
        self.inner.fields.resolve(&self.inner.name, parent, field, args)
    }

    /// Narrows to the first member, in declaration order, that accepts the value.
    pub fn narrow(&self, value: &A) -> Result<ResolvedObject<C>, ResolveError> {
        self.inner.narrow(value)
    }

    /// Names of every member that accepts the value. More than one entry
    /// means the member declarations overlap.
    pub fn matching_members(&self, value: &A) -> Vec<&str> {
        self.inner.matching_members(value)
    }

    pub fn contramap<B, F>(&self, f: F) -> InterfaceOutput<C, B>
    where
        B: 'static,
        F: Fn(&B) -> A + Send + Sync + 'static,
    {
        InterfaceOutput {
            inner: self.inner.contramap(Arc::new(f)),
        }
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: Arc<N>) -> InterfaceOutput<D, A> {
        InterfaceOutput {
            inner: self.inner.remap(nat),
        }
    }
}

impl<C: Context, A: Send + 'static> OutputNode<C, A> for InterfaceOutput<C, A> {
    fn shape(&self) -> OutputShape<C> {
        self.inner.shape()
    }

    fn bind(&self, value: A) -> Resolved<C> {
        self.inner.bind(value)
    }
}

/// A union: a closed set of members without shared fields.
pub struct UnionOutput<C: Context, A> {
    inner: Polymorphic<C, A>,
}

impl<C: Context, A> Clone for UnionOutput<C, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Context, A> fmt::Debug for UnionOutput<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionOutput")
            .field("name", &self.inner.name)
            .field("members", &self.inner.members)
            .finish()
    }
}

impl<C: Context, A: 'static> UnionOutput<C, A> {
    pub fn new<I>(name: impl Into<Arc<str>>, members: I) -> Self
    where
        I: IntoIterator<Item = Instance<C, A>>,
    {
        Self {
            inner: Polymorphic {
                kind: Kind::Union,
                name: name.into(),
                fields: Fields::empty(),
                members: members.into_iter().collect(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn members(&self) -> &[Instance<C, A>] {
        &self.inner.members
    }

    pub fn narrow(&self, value: &A) -> Result<ResolvedObject<C>, ResolveError> {
        self.inner.narrow(value)
    }

    pub fn matching_members(&self, value: &A) -> Vec<&str> {
        self.inner.matching_members(value)
    }

    pub fn contramap<B, F>(&self, f: F) -> UnionOutput<C, B>
    where
        B: 'static,
        F: Fn(&B) -> A + Send + Sync + 'static,
    {
        UnionOutput {
            inner: self.inner.contramap(Arc::new(f)),
        }
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: Arc<N>) -> UnionOutput<D, A> {
        UnionOutput {
            inner: self.inner.remap(nat),
        }
    }
}

impl<C: Context, A: Send + 'static> OutputNode<C, A> for UnionOutput<C, A> {
    fn shape(&self) -> OutputShape<C> {
        self.inner.shape()
    }

    fn bind(&self, value: A) -> Resolved<C> {
        self.inner.bind(value)
    }
}
