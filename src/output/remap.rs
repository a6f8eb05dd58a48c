// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Context remapping.
//!
//! Remapping a tree wraps each node lazily: the wrapped node keeps producing
//! resolutions in the source context, and the wrapper converts them (and every
//! value bound from them) on the way out.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::accumulator::Entry;
use crate::context::{Context, ContextMap};
use crate::input::error::DecodeError;
use crate::output::object::{FieldInfo, FieldNode, ObjectShape};
use crate::output::polymorphic::Member;
use crate::output::resolved::{
    BoundAbstract, BoundObject, FieldResolution, ResolveError, Resolved, ResolvedObject,
};
use crate::output::{OutputNode, OutputShape};
use crate::value::Value;

/// Converts a field resolution and the value it eventually produces.
pub(crate) fn remap_resolution<C, D, N>(
    resolution: FieldResolution<C>,
    nat: &Arc<N>,
) -> FieldResolution<D>
where
    C: Context,
    D: Context,
    N: ContextMap<C, D>,
{
    let inner = Arc::clone(nat);
    resolution
        .map(move |resolved| resolved.remap::<D, N>(&inner))
        .remap(&**nat)
}

pub(crate) struct RemappedNode<C: Context, A, N> {
    inner: Arc<dyn OutputNode<C, A>>,
    nat: Arc<N>,
}

impl<C: Context, A, N> RemappedNode<C, A, N> {
    pub(crate) fn new(inner: Arc<dyn OutputNode<C, A>>, nat: Arc<N>) -> Self {
        Self { inner, nat }
    }
}

impl<C, D, A, N> OutputNode<D, A> for RemappedNode<C, A, N>
where
    C: Context,
    D: Context,
    N: ContextMap<C, D>,
{
    fn shape(&self) -> OutputShape<D> {
        self.inner.shape().remap(&self.nat)
    }

    fn bind(&self, value: A) -> Resolved<D> {
        self.inner.bind(value).remap(&self.nat)
    }
}

pub(crate) struct RemappedField<C: Context, A, N> {
    inner: Arc<dyn FieldNode<C, A>>,
    nat: Arc<N>,
}

impl<C: Context, A, N> RemappedField<C, A, N> {
    pub(crate) fn new(inner: Arc<dyn FieldNode<C, A>>, nat: Arc<N>) -> Self {
        Self { inner, nat }
    }
}

impl<C, D, A, N> FieldNode<D, A> for RemappedField<C, A, N>
where
    C: Context,
    D: Context,
    N: ContextMap<C, D>,
{
    fn resolve(
        &self,
        name: &str,
        parent: &A,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<D>, DecodeError> {
        let resolution = self.inner.resolve(name, parent, args)?;
        Ok(remap_resolution(resolution, &self.nat))
    }
}

pub(crate) struct RemappedInfo<C: Context, N> {
    inner: Arc<dyn FieldInfo<C>>,
    nat: Arc<N>,
}

impl<C: Context, N> RemappedInfo<C, N> {
    pub(crate) fn new(inner: Arc<dyn FieldInfo<C>>, nat: Arc<N>) -> Self {
        Self { inner, nat }
    }
}

impl<C, D, N> FieldInfo<D> for RemappedInfo<C, N>
where
    C: Context,
    D: Context,
    N: ContextMap<C, D>,
{
    fn arguments(&self) -> &[Entry] {
        self.inner.arguments()
    }

    fn output_shape(&self) -> OutputShape<D> {
        self.inner.output_shape().remap(&self.nat)
    }
}

pub(crate) struct RemappedBound<C: Context, N> {
    inner: Box<dyn BoundObject<C>>,
    nat: Arc<N>,
}

impl<C: Context, N> RemappedBound<C, N> {
    pub(crate) fn new(inner: Box<dyn BoundObject<C>>, nat: Arc<N>) -> Self {
        Self { inner, nat }
    }
}

impl<C, D, N> BoundObject<D> for RemappedBound<C, N>
where
    C: Context,
    D: Context,
    N: ContextMap<C, D>,
{
    fn typename(&self) -> &str {
        self.inner.typename()
    }

    fn shape(&self) -> ObjectShape<D> {
        self.inner.shape().remap(&self.nat)
    }

    fn resolve(
        &self,
        field: &str,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<D>, ResolveError> {
        let resolution = self.inner.resolve(field, args)?;
        Ok(remap_resolution(resolution, &self.nat))
    }

    fn resolve_with(
        &self,
        field: &str,
        args: &IndexMap<String, Value>,
    ) -> Result<FieldResolution<D>, ResolveError> {
        let resolution = self.inner.resolve_with(field, args)?;
        Ok(remap_resolution(resolution, &self.nat))
    }
}

pub(crate) struct RemappedAbstract<C: Context, N> {
    inner: Box<dyn BoundAbstract<C>>,
    nat: Arc<N>,
}

impl<C: Context, N> RemappedAbstract<C, N> {
    pub(crate) fn new(inner: Box<dyn BoundAbstract<C>>, nat: Arc<N>) -> Self {
        Self { inner, nat }
    }
}

impl<C, D, N> BoundAbstract<D> for RemappedAbstract<C, N>
where
    C: Context,
    D: Context,
    N: ContextMap<C, D>,
{
    fn typename(&self) -> &str {
        self.inner.typename()
    }

    fn shape(&self) -> OutputShape<D> {
        self.inner.shape().remap(&self.nat)
    }

    fn narrow(&self) -> Result<ResolvedObject<D>, ResolveError> {
        Ok(self.inner.narrow()?.remap(Arc::clone(&self.nat)))
    }

    fn resolve(
        &self,
        field: &str,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<D>, ResolveError> {
        let resolution = self.inner.resolve(field, args)?;
        Ok(remap_resolution(resolution, &self.nat))
    }
}

pub(crate) struct RemappedMember<C: Context, A, N> {
    inner: Arc<dyn Member<C, A>>,
    nat: Arc<N>,
}

impl<C: Context, A, N> RemappedMember<C, A, N> {
    pub(crate) fn new(inner: Arc<dyn Member<C, A>>, nat: Arc<N>) -> Self {
        Self { inner, nat }
    }
}

impl<C, D, A, N> Member<D, A> for RemappedMember<C, A, N>
where
    C: Context,
    D: Context,
    N: ContextMap<C, D>,
{
    fn shape(&self) -> ObjectShape<D> {
        self.inner.shape().remap(&self.nat)
    }

    fn matches(&self, value: &A) -> bool {
        self.inner.matches(value)
    }

    fn narrow(&self, value: &A) -> Option<ResolvedObject<D>> {
        self.inner
            .narrow(value)
            .map(|object| object.remap(Arc::clone(&self.nat)))
    }
}
