// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::input::{error::DecodeError, Input, InputShape};
use crate::value::Value;

/// Whether an entry is an input object field or an output field argument.
/// Only affects how failures are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Field,
    Argument,
}

/// Declaration of one accumulated slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: Arc<str>,
    pub kind: EntryKind,
    pub input: InputShape,
    pub has_default: bool,
}

impl Entry {
    pub fn type_ref(&self) -> String {
        self.input.type_ref()
    }
}

type DecodeFn<A> = dyn Fn(&str, &[Option<&Value>]) -> Result<A, DecodeError> + Send + Sync;

/// An ordered group of independently typed declarations decoded in one step.
///
/// Each single-entry accumulator is typed by its own input. Merging two
/// accumulators concatenates their entries and composes their builders, so
/// the typed result of every slot is available to the combining function
/// without a common supertype:
///
/// ```rust
/// use shapeql::{Accumulator, Input, Value};
///
/// let int = Input::scalar("Int", |v| v.as_i64().ok_or_else(|| "not an int".to_string()));
/// let name = Input::scalar("String", |v| v.as_str().map(str::to_string).ok_or_else(|| "not a string".to_string()));
///
/// let args = Accumulator::arg("first", int).and(Accumulator::arg("after", name.optional()));
/// let (first, after) = args.decode("users", &[Some(&Value::from(10_i64)), None]).unwrap();
/// assert_eq!((first, after), (10, None));
/// ```
///
/// Merging is associative: `(x.and(y)).and(z)` and `x.and(y.and(z))` declare
/// the same entries in the same order and decode the same positional values.
pub struct Accumulator<A> {
    entries: Arc<[Entry]>,
    decode: Arc<DecodeFn<A>>,
}

impl<A> Clone for Accumulator<A> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<A> fmt::Debug for Accumulator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accumulator")
            .field("entries", &self.entries)
            .finish()
    }
}

impl<A: 'static> Accumulator<A> {
    /// An input object field without a default.
    pub fn field(name: impl Into<Arc<str>>, input: Input<A>) -> Self {
        Self::entry(name.into(), EntryKind::Field, input, None)
    }

    /// An input object field that falls back to `default` when absent.
    pub fn field_or(name: impl Into<Arc<str>>, input: Input<A>, default: A) -> Self
    where
        A: Clone + Send + Sync,
    {
        Self::entry(
            name.into(),
            EntryKind::Field,
            input,
            Some(Arc::new(move || default.clone())),
        )
    }

    /// An output field argument without a default.
    pub fn arg(name: impl Into<Arc<str>>, input: Input<A>) -> Self {
        Self::entry(name.into(), EntryKind::Argument, input, None)
    }

    /// An output field argument that falls back to `default` when absent.
    pub fn arg_or(name: impl Into<Arc<str>>, input: Input<A>, default: A) -> Self
    where
        A: Clone + Send + Sync,
    {
        Self::entry(
            name.into(),
            EntryKind::Argument,
            input,
            Some(Arc::new(move || default.clone())),
        )
    }

    fn entry(
        name: Arc<str>,
        kind: EntryKind,
        input: Input<A>,
        default: Option<Arc<dyn Fn() -> A + Send + Sync>>,
    ) -> Self {
        let entry = Entry {
            name: Arc::clone(&name),
            kind,
            input: input.shape().clone(),
            has_default: default.is_some(),
        };
        let optional = input.shape().is_optional();

        let decode = move |owner: &str, values: &[Option<&Value>]| {
            let decoded = match values.first().copied().flatten() {
                Some(value) => input.decode(value),
                // Defaults bypass the entry's own input.
                None => match &default {
                    Some(default) => return Ok(default()),
                    None if optional => input.decode(&Value::null()),
                    None => {
                        return Err(match kind {
                            EntryKind::Field => DecodeError::MissingField {
                                field: name.to_string(),
                                object: owner.to_string(),
                            },
                            EntryKind::Argument => DecodeError::MissingArgument {
                                argument: name.to_string(),
                                field: owner.to_string(),
                            },
                        })
                    }
                },
            };

            match kind {
                EntryKind::Field => decoded,
                EntryKind::Argument => decoded.map_err(|e| DecodeError::ArgumentDecodeFailure {
                    argument: name.to_string(),
                    source: Box::new(e),
                }),
            }
        };

        Self {
            entries: Arc::from(vec![entry]),
            decode: Arc::new(decode),
        }
    }

    /// Concatenates the entries of `self` and `other`. Decoding consumes
    /// `self`'s positional values first, then `other`'s, and hands both
    /// partial results to `combine`.
    pub fn merge<B, R, F>(self, other: Accumulator<B>, combine: F) -> Accumulator<R>
    where
        B: 'static,
        R: 'static,
        F: Fn(A, B) -> R + Send + Sync + 'static,
    {
        let split = self.entries.len();
        let entries: Arc<[Entry]> = self
            .entries
            .iter()
            .chain(other.entries.iter())
            .cloned()
            .collect();
        let (left, right) = (self.decode, other.decode);

        Accumulator {
            entries,
            decode: Arc::new(move |owner: &str, values: &[Option<&Value>]| {
                let (l, r) = split_positional(values, split);
                let a = left(owner, l)?;
                let b = right(owner, r)?;
                Ok(combine(a, b))
            }),
        }
    }

    /// Merges into a pair.
    pub fn and<B: 'static>(self, other: Accumulator<B>) -> Accumulator<(A, B)> {
        self.merge(other, |a, b| (a, b))
    }

    pub fn map<B, F>(self, f: F) -> Accumulator<B>
    where
        B: 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let decode = self.decode;
        Accumulator {
            entries: self.entries,
            decode: Arc::new(move |owner: &str, values: &[Option<&Value>]| {
                decode(owner, values).map(&f)
            }),
        }
    }
}

impl<A> Accumulator<A> {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // Accumulators always declare at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decodes positional values, one per entry. `None` marks an absent value.
    /// `owner` names the input object or field in error messages.
    pub fn decode(&self, owner: &str, values: &[Option<&Value>]) -> Result<A, DecodeError> {
        if values.len() != self.entries.len() {
            return Err(DecodeError::ArityMismatch {
                owner: owner.to_string(),
                expected: self.entries.len(),
                actual: values.len(),
            });
        }
        (self.decode)(owner, values)
    }

    /// Decodes values looked up by entry name.
    pub fn decode_named(
        &self,
        owner: &str,
        values: &IndexMap<String, Value>,
    ) -> Result<A, DecodeError> {
        let positional: Vec<Option<&Value>> = self
            .entries
            .iter()
            .map(|entry| values.get(&*entry.name))
            .collect();
        (self.decode)(owner, &positional)
    }
}

fn split_positional<'a, 'v>(
    values: &'a [Option<&'v Value>],
    at: usize,
) -> (&'a [Option<&'v Value>], &'a [Option<&'v Value>]) {
    if at <= values.len() {
        values.split_at(at)
    } else {
        (values, &[])
    }
}
