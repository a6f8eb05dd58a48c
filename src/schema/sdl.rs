// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::context::Context;
use crate::input::InputShape;
use crate::output::object::FieldShape;
use crate::output::OutputShape;

const BUILT_IN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Prints registered types as schema definition language.
pub struct Sdl<'a, C: Context> {
    pub(crate) query: &'a str,
    pub(crate) outputs: &'a IndexMap<Arc<str>, OutputShape<C>>,
    pub(crate) inputs: &'a IndexMap<Arc<str>, InputShape>,
}

impl<C: Context> Sdl<'_, C> {
    fn interfaces_of(&self, object: &str) -> Vec<&str> {
        self.outputs
            .values()
            .filter_map(|shape| match shape {
                OutputShape::Interface(i) if i.members().iter().any(|m| m.name() == object) => {
                    Some(i.name())
                }
                _ => None,
            })
            .collect()
    }
}

fn write_fields<C: Context>(f: &mut fmt::Formatter<'_>, fields: &[FieldShape<C>]) -> fmt::Result {
    for field in fields {
        write!(f, "  {}", field.name())?;
        if !field.arguments().is_empty() {
            let args: Vec<String> = field
                .arguments()
                .iter()
                .map(|a| format!("{}: {}", a.name, a.type_ref()))
                .collect();
            write!(f, "({})", args.join(", "))?;
        }
        writeln!(f, ": {}", field.type_ref())?;
    }
    Ok(())
}

impl<C: Context> fmt::Display for Sdl<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "schema {{")?;
        writeln!(f, "  query: {}", self.query)?;
        writeln!(f, "}}")?;

        // Scalars and enums may be registered on both sides.
        let mut scalars: IndexSet<&str> = IndexSet::new();
        let mut enums: IndexMap<&str, &[Arc<str>]> = IndexMap::new();
        for shape in self.outputs.values() {
            match shape {
                OutputShape::Scalar(name) => {
                    scalars.insert(name);
                }
                OutputShape::Enum { name, values } => {
                    enums.entry(name).or_insert(values);
                }
                _ => {}
            }
        }
        for shape in self.inputs.values() {
            match shape {
                InputShape::Scalar(name) => {
                    scalars.insert(name);
                }
                InputShape::Enum { name, values } => {
                    enums.entry(name).or_insert(values);
                }
                _ => {}
            }
        }

        for name in scalars {
            if !BUILT_IN_SCALARS.contains(&name) {
                writeln!(f)?;
                writeln!(f, "scalar {name}")?;
            }
        }

        for (name, values) in enums {
            writeln!(f)?;
            writeln!(f, "enum {name} {{")?;
            for value in values {
                writeln!(f, "  {value}")?;
            }
            writeln!(f, "}}")?;
        }

        for shape in self.inputs.values() {
            if let InputShape::Object { name, fields } = shape {
                writeln!(f)?;
                writeln!(f, "input {name} {{")?;
                for field in fields.iter() {
                    writeln!(f, "  {}: {}", field.name, field.type_ref())?;
                }
                writeln!(f, "}}")?;
            }
        }

        for shape in self.outputs.values() {
            if let OutputShape::Interface(interface) = shape {
                writeln!(f)?;
                writeln!(f, "interface {} {{", interface.name())?;
                write_fields(f, interface.fields())?;
                writeln!(f, "}}")?;
            }
        }

        for shape in self.outputs.values() {
            if let OutputShape::Object(object) = shape {
                writeln!(f)?;
                write!(f, "type {}", object.name())?;
                let interfaces = self.interfaces_of(object.name());
                if !interfaces.is_empty() {
                    write!(f, " implements {}", interfaces.join(" & "))?;
                }
                writeln!(f, " {{")?;
                write_fields(f, object.fields())?;
                writeln!(f, "}}")?;
            }
        }

        for shape in self.outputs.values() {
            if let OutputShape::Union(union) = shape {
                let members: Vec<&str> = union.members().iter().map(|m| m.name()).collect();
                writeln!(f)?;
                writeln!(f, "union {} = {}", union.name(), members.join(" | "))?;
            }
        }

        Ok(())
    }
}
