// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::VecDeque;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::context::Context;
use crate::input::InputShape;
use crate::output::object::FieldShape;
use crate::output::OutputShape;
use crate::schema::error::SchemaError;

/// Named types reachable from a query root, in discovery order.
///
/// Types are identified by name and registered once. Every later definition
/// under the same name must declare the same fields, arguments, members or
/// values. Input and output types share one namespace, so a name may only be
/// reused across the two when both definitions are scalars or both are enums.
pub struct TypeRegistry<C: Context> {
    outputs: IndexMap<Arc<str>, OutputShape<C>>,
    inputs: IndexMap<Arc<str>, InputShape>,
}

impl<C: Context> Default for TypeRegistry<C> {
    fn default() -> Self {
        Self {
            outputs: IndexMap::new(),
            inputs: IndexMap::new(),
        }
    }
}

fn input_kind(shape: &InputShape) -> &'static str {
    match shape {
        InputShape::List(inner) | InputShape::Optional(inner) => input_kind(inner),
        InputShape::Scalar(_) => "scalar",
        InputShape::Enum { .. } => "enum",
        InputShape::Object { .. } | InputShape::Ref(_) => "input",
    }
}

// Everything a definition declares, down to the names of the types it
// refers to. Referenced types are compared when they are registered.
fn output_signature<C: Context>(shape: &OutputShape<C>) -> Vec<String> {
    match shape {
        OutputShape::List(inner) | OutputShape::Optional(inner) => output_signature(inner),
        OutputShape::Scalar(_) => Vec::new(),
        OutputShape::Enum { values, .. } => values.iter().map(|v| v.to_string()).collect(),
        OutputShape::Object(object) => field_signature(object.fields()),
        OutputShape::Interface(interface) => {
            let mut signature = field_signature(interface.fields());
            signature.extend(interface.members().iter().map(|m| format!("| {}", m.name())));
            signature
        }
        OutputShape::Union(union) => union
            .members()
            .iter()
            .map(|m| format!("| {}", m.name()))
            .collect(),
    }
}

fn field_signature<C: Context>(fields: &[FieldShape<C>]) -> Vec<String> {
    fields
        .iter()
        .map(|field| {
            let arguments: Vec<String> = field
                .arguments()
                .iter()
                .map(|a| format!("{}: {}", a.name, a.type_ref()))
                .collect();
            format!("{}({}): {}", field.name(), arguments.join(", "), field.type_ref())
        })
        .collect()
}

fn input_signature(shape: &InputShape) -> Vec<String> {
    match shape {
        InputShape::List(inner) | InputShape::Optional(inner) => input_signature(inner),
        InputShape::Scalar(_) | InputShape::Ref(_) => Vec::new(),
        InputShape::Enum { values, .. } => values.iter().map(|v| v.to_string()).collect(),
        InputShape::Object { fields, .. } => fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.type_ref()))
            .collect(),
    }
}

fn check_same(name: &str, first: Vec<String>, second: Vec<String>) -> Result<(), SchemaError> {
    if first == second {
        Ok(())
    } else {
        Err(SchemaError::ConflictingDefinitions {
            name: name.to_string(),
        })
    }
}

fn check_shared(name: &str, first: &'static str, second: &'static str) -> Result<(), SchemaError> {
    match (first, second) {
        ("scalar", "scalar") | ("enum", "enum") => Ok(()),
        _ => Err(SchemaError::ConflictingTypes {
            name: name.to_string(),
            first,
            second,
        }),
    }
}

impl<C: Context> TypeRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every named output and input type reachable from `root`.
    pub fn collect(&mut self, root: OutputShape<C>) -> Result<(), SchemaError> {
        let mut queue = VecDeque::from([root]);

        while let Some(shape) = queue.pop_front() {
            let shape = match shape {
                OutputShape::List(inner) | OutputShape::Optional(inner) => {
                    queue.push_back(*inner);
                    continue;
                }
                shape => shape,
            };
            if !self.add_output(&shape)? {
                continue;
            }

            match &shape {
                OutputShape::Object(object) => {
                    self.enqueue_fields(object.fields(), &mut queue)?;
                }
                OutputShape::Interface(interface) => {
                    self.enqueue_fields(interface.fields(), &mut queue)?;
                    for member in interface.members() {
                        queue.push_back(OutputShape::Object(member.clone()));
                    }
                }
                OutputShape::Union(union) => {
                    for member in union.members() {
                        queue.push_back(OutputShape::Object(member.clone()));
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn enqueue_fields(
        &mut self,
        fields: &[FieldShape<C>],
        queue: &mut VecDeque<OutputShape<C>>,
    ) -> Result<(), SchemaError> {
        for field in fields {
            for argument in field.arguments() {
                self.collect_input(&argument.input)?;
            }
            queue.push_back(field.output());
        }
        Ok(())
    }

    /// Registers a named input type and everything it refers to.
    pub fn collect_input(&mut self, shape: &InputShape) -> Result<(), SchemaError> {
        let mut pending = vec![shape.clone()];

        while let Some(shape) = pending.pop() {
            match shape {
                InputShape::List(inner) | InputShape::Optional(inner) => pending.push(*inner),
                InputShape::Ref(reference) => pending.push(reference.resolve()),
                shape => {
                    if self.add_input(&shape)? {
                        if let InputShape::Object { fields, .. } = &shape {
                            pending.extend(fields.iter().rev().map(|f| f.input.clone()));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns whether the type was newly registered.
    fn add_output(&mut self, shape: &OutputShape<C>) -> Result<bool, SchemaError> {
        let name = shape.named_type();

        if let Some(existing) = self.outputs.get(name) {
            if existing.kind() != shape.kind() {
                return Err(SchemaError::ConflictingTypes {
                    name: name.to_string(),
                    first: existing.kind(),
                    second: shape.kind(),
                });
            }
            check_same(name, output_signature(existing), output_signature(shape))?;
            return Ok(false);
        }
        if let Some(existing) = self.inputs.get(name) {
            check_shared(name, input_kind(existing), shape.kind())?;
            check_same(name, input_signature(existing), output_signature(shape))?;
        }

        tracing::trace!(name, kind = shape.kind(), "registered output type");
        self.outputs.insert(Arc::from(name), shape.clone());
        Ok(true)
    }

    fn add_input(&mut self, shape: &InputShape) -> Result<bool, SchemaError> {
        let name = shape.named_type();
        let kind = input_kind(shape);

        if let Some(existing) = self.inputs.get(name) {
            if input_kind(existing) != kind {
                return Err(SchemaError::ConflictingTypes {
                    name: name.to_string(),
                    first: input_kind(existing),
                    second: kind,
                });
            }
            check_same(name, input_signature(existing), input_signature(shape))?;
            return Ok(false);
        }
        if let Some(existing) = self.outputs.get(name) {
            check_shared(name, existing.kind(), kind)?;
            check_same(name, output_signature(existing), input_signature(shape))?;
        }

        tracing::trace!(name, kind, "registered input type");
        self.inputs.insert(Arc::from(name), shape.clone());
        Ok(true)
    }

    pub fn outputs(&self) -> &IndexMap<Arc<str>, OutputShape<C>> {
        &self.outputs
    }

    pub fn inputs(&self) -> &IndexMap<Arc<str>, InputShape> {
        &self.inputs
    }

    pub fn into_parts(
        self,
    ) -> (
        IndexMap<Arc<str>, OutputShape<C>>,
        IndexMap<Arc<str>, InputShape>,
    ) {
        (self.outputs, self.inputs)
    }
}
