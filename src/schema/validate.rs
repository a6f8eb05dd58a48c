// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::accumulator::Entry;
use crate::context::Context;
use crate::input::InputShape;
use crate::output::object::{FieldShape, ObjectShape};
use crate::output::polymorphic::{InterfaceShape, UnionShape};
use crate::output::OutputShape;
use crate::schema::error::SchemaError;

lazy_static! {
    static ref NAME: Regex =
        Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("name pattern should be a valid regex");
}

fn field_signature<C: Context>(field: &FieldShape<C>) -> String {
    if field.arguments().is_empty() {
        return format!("{}: {}", field.name(), field.type_ref());
    }
    let arguments: Vec<String> = field
        .arguments()
        .iter()
        .map(|a| format!("{}: {}", a.name, a.type_ref()))
        .collect();
    format!("{}({}): {}", field.name(), arguments.join(", "), field.type_ref())
}

/// Validates that a type, field, argument or enum value name is usable in
/// a query document.
pub fn validate_name(name: &str, kind: &'static str) -> Result<(), SchemaError> {
    if NAME.is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidName {
            name: name.to_string(),
            kind,
        })
    }
}

/// Checks registered type definitions for problems the type system cannot
/// rule out on its own.
pub struct SchemaValidator;

impl SchemaValidator {
    /// Validates every registered output and input type. Reports the first
    /// problem found, in registration order.
    pub fn validate<C: Context>(
        outputs: &IndexMap<Arc<str>, OutputShape<C>>,
        inputs: &IndexMap<Arc<str>, InputShape>,
    ) -> Result<(), SchemaError> {
        for shape in outputs.values() {
            Self::validate_output(shape)?;
        }
        for shape in inputs.values() {
            Self::validate_input(shape)?;
        }
        Ok(())
    }

    fn validate_output<C: Context>(shape: &OutputShape<C>) -> Result<(), SchemaError> {
        match shape {
            OutputShape::Scalar(name) => validate_name(name, "scalar"),
            OutputShape::Enum { name, values } => Self::validate_enum(name, values),
            OutputShape::Object(object) => Self::validate_object(object),
            OutputShape::Interface(interface) => Self::validate_interface(interface),
            OutputShape::Union(union) => Self::validate_union(union),
            OutputShape::List(inner) | OutputShape::Optional(inner) => Self::validate_output(inner),
        }
    }

    fn validate_enum(name: &str, values: &[Arc<str>]) -> Result<(), SchemaError> {
        validate_name(name, "enum")?;
        if values.is_empty() {
            return Err(SchemaError::EmptyType {
                type_name: name.to_string(),
                missing: "values",
            });
        }

        let mut seen = BTreeSet::new();
        for value in values {
            validate_name(value, "enum value")?;
            if !seen.insert(&**value) {
                return Err(SchemaError::DuplicateEnumValue {
                    value: value.to_string(),
                    type_name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_object<C: Context>(object: &ObjectShape<C>) -> Result<(), SchemaError> {
        validate_name(object.name(), "type")?;
        Self::validate_fields(object.name(), object.fields())
    }

    fn validate_fields<C: Context>(
        type_name: &str,
        fields: &[FieldShape<C>],
    ) -> Result<(), SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::EmptyType {
                type_name: type_name.to_string(),
                missing: "fields",
            });
        }

        let mut seen = BTreeSet::new();
        for field in fields {
            validate_name(field.name(), "field")?;
            if !seen.insert(field.name()) {
                return Err(SchemaError::DuplicateField {
                    field: field.name().to_string(),
                    type_name: type_name.to_string(),
                });
            }
            Self::validate_arguments(type_name, field.name(), field.arguments())?;
        }
        Ok(())
    }

    fn validate_arguments(
        type_name: &str,
        field: &str,
        arguments: &[Entry],
    ) -> Result<(), SchemaError> {
        let mut seen = BTreeSet::new();
        for argument in arguments {
            validate_name(&argument.name, "argument")?;
            if !seen.insert(&*argument.name) {
                return Err(SchemaError::DuplicateArgument {
                    argument: argument.name.to_string(),
                    field: field.to_string(),
                    type_name: type_name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_members<C: Context>(
        type_name: &str,
        members: &[ObjectShape<C>],
    ) -> Result<(), SchemaError> {
        if members.is_empty() {
            return Err(SchemaError::EmptyType {
                type_name: type_name.to_string(),
                missing: "members",
            });
        }

        let mut seen = BTreeSet::new();
        for member in members {
            if !seen.insert(member.name()) {
                return Err(SchemaError::DuplicateMember {
                    member: member.name().to_string(),
                    type_name: type_name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_interface<C: Context>(interface: &InterfaceShape<C>) -> Result<(), SchemaError> {
        validate_name(interface.name(), "interface")?;
        Self::validate_fields(interface.name(), interface.fields())?;
        Self::validate_members(interface.name(), interface.members())?;

        for member in interface.members() {
            for field in interface.fields() {
                let Some(declared) = member.field(field.name()) else {
                    return Err(SchemaError::MissingInterfaceField {
                        interface: interface.name().to_string(),
                        member: member.name().to_string(),
                        field: field.name().to_string(),
                    });
                };
                let expected = field_signature(field);
                let actual = field_signature(declared);
                if expected != actual {
                    return Err(SchemaError::InterfaceFieldMismatch {
                        interface: interface.name().to_string(),
                        member: member.name().to_string(),
                        expected,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_union<C: Context>(union: &UnionShape<C>) -> Result<(), SchemaError> {
        validate_name(union.name(), "union")?;
        Self::validate_members(union.name(), union.members())
    }

    fn validate_input(shape: &InputShape) -> Result<(), SchemaError> {
        match shape {
            InputShape::Scalar(name) => validate_name(name, "scalar"),
            InputShape::Enum { name, values } => Self::validate_enum(name, values),
            InputShape::Object { name, fields } => {
                validate_name(name, "input")?;
                if fields.is_empty() {
                    return Err(SchemaError::EmptyType {
                        type_name: name.to_string(),
                        missing: "fields",
                    });
                }

                let mut seen = BTreeSet::new();
                for field in fields.iter() {
                    validate_name(&field.name, "field")?;
                    if !seen.insert(&*field.name) {
                        return Err(SchemaError::DuplicateField {
                            field: field.name.to_string(),
                            type_name: name.to_string(),
                        });
                    }
                }
                Ok(())
            }
            InputShape::List(inner) | InputShape::Optional(inner) => Self::validate_input(inner),
            InputShape::Ref(_) => Ok(()),
        }
    }
}
