// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Errors raised while decoding an external [`Value`](crate::Value) into a
/// typed input.
///
/// Decoding is fail-fast: only the first failure, in declared order, is
/// reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The value's tagged kind does not match the expected input shape.
    #[error("expected {expected} for {type_name}, got {actual}")]
    ShapeMismatch {
        expected: &'static str,
        type_name: String,
        actual: &'static str,
    },

    /// A required input object field is absent and has no default.
    #[error("missing field {field} in input object {object}")]
    MissingField { field: String, object: String },

    /// The payload carries a field the input object does not declare.
    #[error("unknown field {field} in input object {object}")]
    UnknownField { field: String, object: String },

    /// The enum token is not one of the declared values.
    #[error("unknown value {token} for enum {enum_name}")]
    UnknownEnumToken { token: String, enum_name: String },

    /// The host-supplied scalar decoder rejected the value.
    #[error("invalid value for scalar {scalar}: {message}")]
    InvalidScalar { scalar: String, message: String },

    /// An argument failed to decode.
    #[error("invalid argument {argument}: {source}")]
    ArgumentDecodeFailure {
        argument: String,
        #[source]
        source: Box<DecodeError>,
    },

    /// A required argument is absent and has no default.
    #[error("missing argument {argument} for field {field}")]
    MissingArgument { argument: String, field: String },

    /// The number of positional values does not match the declarations.
    #[error("{owner} expects {expected} values, got {actual}")]
    ArityMismatch {
        owner: String,
        expected: usize,
        actual: usize,
    },
}
