// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Errors that make a set of type definitions unusable as a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Names must match `[_A-Za-z][_0-9A-Za-z]*`.
    #[error("invalid {kind} name {name:?}")]
    InvalidName { name: String, kind: &'static str },

    /// Objects, interfaces and input objects need fields, unions need
    /// members and enums need values.
    #[error("{type_name} declares no {missing}")]
    EmptyType {
        type_name: String,
        missing: &'static str,
    },

    #[error("duplicate field {field} on {type_name}")]
    DuplicateField { field: String, type_name: String },

    #[error("duplicate argument {argument} on {type_name}.{field}")]
    DuplicateArgument {
        argument: String,
        field: String,
        type_name: String,
    },

    #[error("duplicate member {member} in {type_name}")]
    DuplicateMember { member: String, type_name: String },

    #[error("duplicate value {value} in enum {type_name}")]
    DuplicateEnumValue { value: String, type_name: String },

    /// A member object lacks a field declared by its interface.
    #[error("{member} does not declare field {field} of interface {interface}")]
    MissingInterfaceField {
        interface: String,
        member: String,
        field: String,
    },

    /// A member declares an interface field with a different type or
    /// different arguments.
    #[error("{member} declares {actual} but interface {interface} declares {expected}")]
    InterfaceFieldMismatch {
        interface: String,
        member: String,
        expected: String,
        actual: String,
    },

    /// Two definitions of the same kind share a name but declare different
    /// fields, arguments, members or values.
    #[error("{name} has conflicting definitions")]
    ConflictingDefinitions { name: String },

    /// Two different kinds of type share a name.
    #[error("{name} is declared as both {first} and {second}")]
    ConflictingTypes {
        name: String,
        first: &'static str,
        second: &'static str,
    },
}
