// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared scalars and fixtures for unit tests.

use crate::context::Context;
use crate::input::Input;
use crate::output::Output;

pub fn int() -> Input<i64> {
    Input::scalar("Int", |v| {
        v.as_i64().ok_or_else(|| "expected an integer".to_string())
    })
}

pub fn string() -> Input<String> {
    Input::scalar("String", |v| {
        v.as_str()
            .map(str::to_string)
            .ok_or_else(|| "expected a string".to_string())
    })
}

pub fn boolean() -> Input<bool> {
    Input::scalar("Boolean", |v| {
        v.as_bool().ok_or_else(|| "expected a boolean".to_string())
    })
}

pub fn int_output<C: Context>() -> Output<C, i64> {
    Output::scalar("Int", |n: &i64| serde_json::Value::from(*n))
}

pub fn string_output<C: Context>() -> Output<C, String> {
    Output::scalar("String", |s: &String| serde_json::Value::from(s.as_str()))
}
