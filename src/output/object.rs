// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use crate::accumulator::{Accumulator, Entry};
use crate::context::{Context, ContextMap, Resolution};
use crate::input::error::DecodeError;
use crate::output::remap::{RemappedField, RemappedInfo};
use crate::output::resolved::{
    BoundObject, FieldResolution, ResolveError, Resolved, ResolvedObject,
};
use crate::output::{Output, OutputNode, OutputShape};
use crate::value::Value;

type ResolveFn<C, I, T> =
    dyn Fn(&str, &I, &[Option<&Value>]) -> Result<Resolution<C, T>, DecodeError> + Send + Sync;

/// Resolves one field of a parent value, binding the result to the field's
/// output. `name` is only used in error messages.
pub trait FieldNode<C: Context, A>: Send + Sync {
    fn resolve(
        &self,
        name: &str,
        parent: &A,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, DecodeError>;
}

/// Declared arguments and output shape of a field.
pub trait FieldInfo<C: Context>: Send + Sync {
    fn arguments(&self) -> &[Entry];

    fn output_shape(&self) -> OutputShape<C>;
}

struct LazyOutput<C: Context, T> {
    cell: OnceCell<Output<C, T>>,
    thunk: Box<dyn Fn() -> Output<C, T> + Send + Sync>,
}

impl<C: Context, T> LazyOutput<C, T> {
    fn new<F>(thunk: F) -> Self
    where
        F: Fn() -> Output<C, T> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            thunk: Box::new(thunk),
        }
    }

    fn get(&self) -> &Output<C, T> {
        self.cell.get_or_init(|| (self.thunk)())
    }
}

/// A field of an object or interface whose parent values have type `I` and
/// whose resolved values have type `T`.
///
/// The field's output is produced by a thunk that runs on first use, so a
/// type may have fields of its own type.
pub struct Field<C: Context, I, T: Send + 'static> {
    arguments: Arc<[Entry]>,
    output: Arc<LazyOutput<C, T>>,
    resolve: Arc<ResolveFn<C, I, T>>,
}

impl<C: Context, I, T: Send + 'static> Clone for Field<C, I, T> {
    fn clone(&self) -> Self {
        Self {
            arguments: Arc::clone(&self.arguments),
            output: Arc::clone(&self.output),
            resolve: Arc::clone(&self.resolve),
        }
    }
}

impl<C: Context, I: 'static, T: Send + 'static> Field<C, I, T> {
    /// A field without arguments.
    pub fn simple<O, R>(output: O, resolve: R) -> Self
    where
        O: Fn() -> Output<C, T> + Send + Sync + 'static,
        R: Fn(&I) -> Resolution<C, T> + Send + Sync + 'static,
    {
        Self {
            arguments: Vec::new().into(),
            output: Arc::new(LazyOutput::new(output)),
            resolve: Arc::new(move |name: &str, parent: &I, values: &[Option<&Value>]| {
                if !values.is_empty() {
                    return Err(DecodeError::ArityMismatch {
                        owner: name.to_string(),
                        expected: 0,
                        actual: values.len(),
                    });
                }
                Ok(resolve(parent))
            }),
        }
    }

    /// A field without arguments whose value is always available.
    pub fn pure<O, R>(output: O, resolve: R) -> Self
    where
        O: Fn() -> Output<C, T> + Send + Sync + 'static,
        R: Fn(&I) -> T + Send + Sync + 'static,
    {
        Self::simple(output, move |parent| Resolution::Pure(resolve(parent)))
    }

    /// A field taking the arguments declared by `args`.
    pub fn with_args<X, O, R>(args: Accumulator<X>, output: O, resolve: R) -> Self
    where
        X: 'static,
        O: Fn() -> Output<C, T> + Send + Sync + 'static,
        R: Fn(&I, X) -> Resolution<C, T> + Send + Sync + 'static,
    {
        Self {
            arguments: args.entries().into(),
            output: Arc::new(LazyOutput::new(output)),
            resolve: Arc::new(move |name: &str, parent: &I, values: &[Option<&Value>]| {
                let decoded = args.decode(name, values)?;
                Ok(resolve(parent, decoded))
            }),
        }
    }

    /// Decodes the arguments, then runs the resolver.
    pub fn resolve(
        &self,
        name: &str,
        parent: &I,
        args: &[Option<&Value>],
    ) -> Result<Resolution<C, T>, DecodeError> {
        (self.resolve)(name, parent, args)
    }

    pub fn arguments(&self) -> &[Entry] {
        &self.arguments
    }

    /// The declared output. Built on first call.
    pub fn output(&self) -> &Output<C, T> {
        self.output.get()
    }

    /// Adapts the field to parents of type `J`.
    pub fn contramap<J, F>(self, f: F) -> Field<C, J, T>
    where
        J: 'static,
        F: Fn(&J) -> I + Send + Sync + 'static,
    {
        let resolve = self.resolve;
        Field {
            arguments: self.arguments,
            output: self.output,
            resolve: Arc::new(move |name: &str, parent: &J, values: &[Option<&Value>]| {
                resolve(name, &f(parent), values)
            }),
        }
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(self, nat: Arc<N>) -> Field<D, I, T> {
        let output = self.output;
        let resolve = self.resolve;
        let lazy = {
            let nat = Arc::clone(&nat);
            LazyOutput::new(move || output.get().clone().remap(Arc::clone(&nat)))
        };
        Field {
            arguments: self.arguments,
            output: Arc::new(lazy),
            resolve: Arc::new(move |name: &str, parent: &I, values: &[Option<&Value>]| {
                Ok(resolve(name, parent, values)?.remap(&*nat))
            }),
        }
    }
}

impl<C: Context, I: 'static, T: Send + 'static> FieldNode<C, I> for Field<C, I, T> {
    fn resolve(
        &self,
        name: &str,
        parent: &I,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, DecodeError> {
        let output = self.output().clone();
        Ok(Field::resolve(self, name, parent, args)?.map(move |value| output.bind(value)))
    }
}

impl<C: Context, I: 'static, T: Send + 'static> FieldInfo<C> for Field<C, I, T> {
    fn arguments(&self) -> &[Entry] {
        &self.arguments
    }

    fn output_shape(&self) -> OutputShape<C> {
        self.output().shape()
    }
}

struct ContramappedField<C: Context, A, B> {
    inner: Arc<dyn FieldNode<C, A>>,
    f: Arc<dyn Fn(&B) -> A + Send + Sync>,
}

impl<C: Context, A, B> FieldNode<C, B> for ContramappedField<C, A, B> {
    fn resolve(
        &self,
        name: &str,
        parent: &B,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, DecodeError> {
        self.inner.resolve(name, &(self.f)(parent), args)
    }
}

/// Name, arguments and output shape of a declared field.
pub struct FieldShape<C: Context> {
    name: Arc<str>,
    info: Arc<dyn FieldInfo<C>>,
}

impl<C: Context> Clone for FieldShape<C> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            info: Arc::clone(&self.info),
        }
    }
}

impl<C: Context> fmt::Debug for FieldShape<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldShape")
            .field("name", &self.name)
            .field("arguments", &self.info.arguments())
            .finish()
    }
}

impl<C: Context> FieldShape<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[Entry] {
        self.info.arguments()
    }

    pub fn argument(&self, name: &str) -> Option<&Entry> {
        self.arguments().iter().find(|e| &*e.name == name)
    }

    /// Output shape of the field. Forces the field's output.
    pub fn output(&self) -> OutputShape<C> {
        self.info.output_shape()
    }

    pub fn type_ref(&self) -> String {
        self.output().type_ref()
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: &Arc<N>) -> FieldShape<D> {
        FieldShape {
            name: Arc::clone(&self.name),
            info: Arc::new(RemappedInfo::new(Arc::clone(&self.info), Arc::clone(nat))),
        }
    }
}

pub(crate) struct FieldEntry<C: Context, A> {
    name: Arc<str>,
    node: Arc<dyn FieldNode<C, A>>,
    info: Arc<dyn FieldInfo<C>>,
}

impl<C: Context, A> Clone for FieldEntry<C, A> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            node: Arc::clone(&self.node),
            info: Arc::clone(&self.info),
        }
    }
}

impl<C: Context, A: 'static> FieldEntry<C, A> {
    pub(crate) fn new<T: Send + 'static>(name: Arc<str>, field: Field<C, A, T>) -> Self {
        let field = Arc::new(field);
        Self {
            name,
            node: Arc::clone(&field) as Arc<dyn FieldNode<C, A>>,
            info: field,
        }
    }
}

/// Ordered fields of an object or interface.
pub(crate) struct Fields<C: Context, A> {
    entries: Arc<[FieldEntry<C, A>]>,
    shapes: Arc<[FieldShape<C>]>,
}

impl<C: Context, A> Clone for Fields<C, A> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            shapes: Arc::clone(&self.shapes),
        }
    }
}

impl<C: Context, A: 'static> Fields<C, A> {
    pub(crate) fn new(entries: Vec<FieldEntry<C, A>>) -> Self {
        let shapes = entries
            .iter()
            .map(|e| FieldShape {
                name: Arc::clone(&e.name),
                info: Arc::clone(&e.info),
            })
            .collect();
        Self {
            entries: entries.into(),
            shapes,
        }
    }

    pub(crate) fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub(crate) fn shapes(&self) -> &Arc<[FieldShape<C>]> {
        &self.shapes
    }

    fn get(&self, field: &str) -> Option<&FieldEntry<C, A>> {
        self.entries.iter().find(|e| &*e.name == field)
    }

    pub(crate) fn resolve(
        &self,
        owner: &str,
        parent: &A,
        field: &str,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, ResolveError> {
        let entry = self.get(field).ok_or_else(|| ResolveError::UnknownField {
            field: field.to_string(),
            type_name: owner.to_string(),
        })?;
        Ok(entry.node.resolve(&entry.name, parent, args)?)
    }

    pub(crate) fn resolve_with(
        &self,
        owner: &str,
        parent: &A,
        field: &str,
        args: &IndexMap<String, Value>,
    ) -> Result<FieldResolution<C>, ResolveError> {
        let entry = self.get(field).ok_or_else(|| ResolveError::UnknownField {
            field: field.to_string(),
            type_name: owner.to_string(),
        })?;
        let declared = entry.info.arguments();

        if let Some(unknown) = args
            .keys()
            .find(|k| !declared.iter().any(|e| &*e.name == k.as_str()))
        {
            return Err(ResolveError::UnknownArgument {
                argument: unknown.clone(),
                field: field.to_string(),
                type_name: owner.to_string(),
            });
        }

        let positional: Vec<Option<&Value>> =
            declared.iter().map(|e| args.get(&*e.name)).collect();
        Ok(entry.node.resolve(&entry.name, parent, &positional)?)
    }

    pub(crate) fn contramap<B: 'static>(
        &self,
        f: Arc<dyn Fn(&B) -> A + Send + Sync>,
    ) -> Fields<C, B> {
        let entries = self
            .entries
            .iter()
            .map(|e| FieldEntry {
                name: Arc::clone(&e.name),
                node: Arc::new(ContramappedField {
                    inner: Arc::clone(&e.node),
                    f: Arc::clone(&f),
                }) as Arc<dyn FieldNode<C, B>>,
                info: Arc::clone(&e.info),
            })
            .collect();
        Fields::new(entries)
    }

    pub(crate) fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: &Arc<N>) -> Fields<D, A> {
        let entries = self
            .entries
            .iter()
            .map(|e| FieldEntry {
                name: Arc::clone(&e.name),
                node: Arc::new(RemappedField::new(Arc::clone(&e.node), Arc::clone(nat)))
                    as Arc<dyn FieldNode<D, A>>,
                info: Arc::new(RemappedInfo::new(Arc::clone(&e.info), Arc::clone(nat)))
                    as Arc<dyn FieldInfo<D>>,
            })
            .collect();
        Fields::new(entries)
    }
}

/// Shape of an object type.
pub struct ObjectShape<C: Context> {
    name: Arc<str>,
    fields: Arc<[FieldShape<C>]>,
}

impl<C: Context> Clone for ObjectShape<C> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            fields: Arc::clone(&self.fields),
        }
    }
}

impl<C: Context> fmt::Debug for ObjectShape<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectShape")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

impl<C: Context> ObjectShape<C> {
    pub(crate) fn new(name: Arc<str>, fields: Arc<[FieldShape<C>]>) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldShape<C>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldShape<C>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: &Arc<N>) -> ObjectShape<D> {
        ObjectShape {
            name: Arc::clone(&self.name),
            fields: self.fields.iter().map(|f| f.remap(nat)).collect(),
        }
    }
}

/// An object type whose values have type `A`.
///
/// # Example
/// ```rust
/// use shapeql::{Field, ObjectOutput, Output, Thunk};
///
/// struct User {
///     name: String,
/// }
///
/// let user: ObjectOutput<Thunk, User> = ObjectOutput::builder("User")
///     .field(
///         "name",
///         Field::pure(
///             || Output::scalar("String", |s: &String| s.as_str().into()),
///             |u: &User| u.name.clone(),
///         ),
///     )
///     .build();
///
/// assert_eq!(user.fields()[0].type_ref(), "String!");
/// ```
pub struct ObjectOutput<C: Context, A> {
    name: Arc<str>,
    fields: Fields<C, A>,
}

impl<C: Context, A> Clone for ObjectOutput<C, A> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            fields: self.fields.clone(),
        }
    }
}

impl<C: Context, A> fmt::Debug for ObjectOutput<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectOutput")
            .field("name", &self.name)
            .field("fields", &self.fields.shapes)
            .finish()
    }
}

pub struct ObjectBuilder<C: Context, A> {
    name: Arc<str>,
    fields: Vec<FieldEntry<C, A>>,
}

impl<C: Context, A: 'static> ObjectBuilder<C, A> {
    /// Appends a field. Declaration order is kept.
    pub fn field<T: Send + 'static>(
        mut self,
        name: impl Into<Arc<str>>,
        field: Field<C, A, T>,
    ) -> Self {
        self.fields.push(FieldEntry::new(name.into(), field));
        self
    }

    pub fn build(self) -> ObjectOutput<C, A> {
        ObjectOutput {
            name: self.name,
            fields: Fields::new(self.fields),
        }
    }
}

impl<C: Context, A: 'static> ObjectOutput<C, A> {
    pub fn builder(name: impl Into<Arc<str>>) -> ObjectBuilder<C, A> {
        ObjectBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> ObjectShape<C> {
        ObjectShape::new(Arc::clone(&self.name), Arc::clone(self.fields.shapes()))
    }

    pub fn fields(&self) -> &[FieldShape<C>] {
        self.fields.shapes()
    }

    pub fn field(&self, name: &str) -> Option<&FieldShape<C>> {
        self.fields.shapes().iter().find(|f| f.name() == name)
    }

    /// Resolves `field` of `parent` with one positional value per declared
    /// argument.
    pub fn resolve(
        &self,
        parent: &A,
        field: &str,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, ResolveError> {
        self.fields.resolve(&self.name, parent, field, args)
    }

    /// Resolves `field` of `parent` with arguments given by name.
    pub fn resolve_with(
        &self,
        parent: &A,
        field: &str,
        args: &IndexMap<String, Value>,
    ) -> Result<FieldResolution<C>, ResolveError> {
        self.fields.resolve_with(&self.name, parent, field, args)
    }

    /// Adapts every resolver to parents of type `B`.
    pub fn contramap<B, F>(&self, f: F) -> ObjectOutput<C, B>
    where
        B: 'static,
        F: Fn(&B) -> A + Send + Sync + 'static,
    {
        ObjectOutput {
            name: Arc::clone(&self.name),
            fields: self.fields.contramap(Arc::new(f)),
        }
    }

    pub fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: Arc<N>) -> ObjectOutput<D, A> {
        ObjectOutput {
            name: Arc::clone(&self.name),
            fields: self.fields.remap(&nat),
        }
    }
}

impl<C: Context, A: Send + 'static> ObjectOutput<C, A> {
    pub fn bind(&self, value: A) -> ResolvedObject<C> {
        ResolvedObject::new(BoundValue {
            object: self.clone(),
            value,
        })
    }
}

impl<C: Context, A: Send + 'static> OutputNode<C, A> for ObjectOutput<C, A> {
    fn shape(&self) -> OutputShape<C> {
        OutputShape::Object(ObjectOutput::shape(self))
    }

    fn bind(&self, value: A) -> Resolved<C> {
        Resolved::Object(ObjectOutput::bind(self, value))
    }
}

struct BoundValue<C: Context, A> {
    object: ObjectOutput<C, A>,
    value: A,
}

impl<C: Context, A: Send + 'static> BoundObject<C> for BoundValue<C, A> {
    fn typename(&self) -> &str {
        self.object.name()
    }

    fn shape(&self) -> ObjectShape<C> {
        self.object.shape()
    }

    fn resolve(
        &self,
        field: &str,
        args: &[Option<&Value>],
    ) -> Result<FieldResolution<C>, ResolveError> {
        self.object.resolve(&self.value, field, args)
    }

    fn resolve_with(
        &self,
        field: &str,
        args: &IndexMap<String, Value>,
    ) -> Result<FieldResolution<C>, ResolveError> {
        self.object.resolve_with(&self.value, field, args)
    }
}
