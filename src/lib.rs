// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

pub mod accumulator;
pub mod context;
pub mod input;
pub mod output;
pub mod schema;
mod value;

pub use accumulator::{Accumulator, Entry, EntryKind};
#[cfg(feature = "async")]
pub use context::{Async, Lift};
pub use context::{Context, ContextMap, Identity, Resolution, Thunk};
pub use input::error::DecodeError;
pub use input::{Input, InputRef, InputShape};
pub use output::object::{
    Field, FieldInfo, FieldNode, FieldShape, ObjectBuilder, ObjectOutput, ObjectShape,
};
pub use output::polymorphic::{
    Instance, InterfaceBuilder, InterfaceOutput, InterfaceShape, Specify, Subtype, UnionOutput,
    UnionShape,
};
pub use output::resolved::{
    FieldResolution, ResolveError, Resolved, ResolvedAbstract, ResolvedObject,
};
pub use output::{Output, OutputNode, OutputShape};
pub use schema::error::SchemaError;
pub use schema::registry::TypeRegistry;
pub use schema::sdl::Sdl;
pub use schema::validate::{validate_name, SchemaValidator};
pub use schema::Schema;
pub use value::{Elements, Keyed, Value};

#[cfg(test)]
mod tests;
