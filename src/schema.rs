// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Schemas.
//!
//! A [`Schema`] is a query root object together with every named type
//! reachable from it: the outputs of its fields (transitively, including the
//! members of interfaces and unions) and the inputs of their arguments.
//!
//! Building a schema registers each type once by name, then validates the
//! registered definitions:
//!
//! ```rust
//! use shapeql::{Field, ObjectOutput, Output, Schema, Thunk};
//!
//! let query: ObjectOutput<Thunk, ()> = ObjectOutput::builder("Query")
//!     .field(
//!         "version",
//!         Field::pure(|| Output::scalar("String", |s: &String| s.as_str().into()), |_: &()| "1.0".to_string()),
//!     )
//!     .build();
//!
//! let schema = Schema::new(query).unwrap();
//! assert!(schema.get("Query").is_some());
//! assert_eq!(schema.to_sdl(), "schema {\n  query: Query\n}\n\ntype Query {\n  version: String!\n}\n");
//! ```

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::context::{Context, ContextMap};
use crate::input::InputShape;
use crate::output::object::ObjectOutput;
use crate::output::resolved::ResolvedObject;
use crate::output::OutputShape;

pub mod error;
pub mod registry;
pub mod sdl;
pub mod validate;

use error::SchemaError;
use registry::TypeRegistry;
use sdl::Sdl;
use validate::SchemaValidator;

/// A validated query root and its type registry.
pub struct Schema<C: Context, Q> {
    query: ObjectOutput<C, Q>,
    types: IndexMap<Arc<str>, OutputShape<C>>,
    inputs: IndexMap<Arc<str>, InputShape>,
}

impl<C: Context, Q> Clone for Schema<C, Q> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            types: self.types.clone(),
            inputs: self.inputs.clone(),
        }
    }
}

impl<C: Context, Q> fmt::Debug for Schema<C, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("query", &self.query)
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("inputs", &self.inputs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<C: Context, Q: Send + 'static> Schema<C, Q> {
    /// Collects every type reachable from `query` and validates them.
    pub fn new(query: ObjectOutput<C, Q>) -> Result<Self, SchemaError> {
        let mut registry = TypeRegistry::new();
        registry
            .collect(OutputShape::Object(query.shape()))
            .and_then(|_| SchemaValidator::validate(registry.outputs(), registry.inputs()))
            .map_err(|e| {
                tracing::debug!(query = query.name(), error = %e, "schema rejected");
                e
            })?;

        let (types, inputs) = registry.into_parts();
        tracing::debug!(
            query = query.name(),
            types = types.len(),
            inputs = inputs.len(),
            "schema assembled"
        );

        Ok(Self {
            query,
            types,
            inputs,
        })
    }

    pub fn query(&self) -> &ObjectOutput<C, Q> {
        &self.query
    }

    /// Named output types, in discovery order. The query type comes first.
    pub fn types(&self) -> &IndexMap<Arc<str>, OutputShape<C>> {
        &self.types
    }

    pub fn get(&self, name: &str) -> Option<&OutputShape<C>> {
        self.types.get(name)
    }

    /// Named input types reachable through field arguments.
    pub fn input_types(&self) -> &IndexMap<Arc<str>, InputShape> {
        &self.inputs
    }

    pub fn input(&self, name: &str) -> Option<&InputShape> {
        self.inputs.get(name)
    }

    /// Pairs a root value with the query type.
    pub fn bind(&self, root: Q) -> ResolvedObject<C> {
        self.query.bind(root)
    }

    /// Converts every deferred computation reachable from the schema. The
    /// registered definitions are unchanged, so no revalidation happens.
    pub fn remap<D: Context, N: ContextMap<C, D>>(&self, nat: Arc<N>) -> Schema<D, Q> {
        Schema {
            query: self.query.remap(Arc::clone(&nat)),
            types: self
                .types
                .iter()
                .map(|(name, shape)| (Arc::clone(name), shape.remap(&nat)))
                .collect(),
            inputs: self.inputs.clone(),
        }
    }

    /// The schema in schema definition language. Built-in scalars are not
    /// printed.
    pub fn to_sdl(&self) -> String {
        Sdl {
            query: self.query.name(),
            outputs: &self.types,
            inputs: &self.inputs,
        }
        .to_string()
    }
}
