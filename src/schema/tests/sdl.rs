// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;

use super::super::*;
use super::fixtures::*;
use crate::accumulator::Accumulator;
use crate::context::{Identity, Resolution, Thunk};
use crate::input::Input;
use crate::output::object::Field;
use crate::output::Output;
use crate::tests::common::{int, string_output};

const CHARACTERS: &str = r#"schema {
  query: Query
}

enum Episode {
  NEWHOPE
  EMPIRE
}

input DroidFilter {
  name: String
  primaryFunction: String
}

interface Character {
  name: String!
}

type Query {
  hero(episode: Episode!): Character!
  search(text: String!): [SearchResult!]!
  droids(filter: DroidFilter): [Droid!]!
}

type Human implements Character {
  name: String!
  height: Int!
  appearsIn: [Episode!]!
  friends: [Character!]!
}

type Droid implements Character {
  name: String!
  primaryFunction: String!
}

union SearchResult = Human | Droid
"#;

#[test]
fn prints_every_kind_of_definition() {
    let schema = Schema::new(query()).unwrap();
    assert_eq!(schema.to_sdl(), CHARACTERS);
}

#[test]
fn remapping_keeps_the_printed_schema() {
    let schema = Schema::new(query()).unwrap();
    let same: Schema<Thunk, ()> = schema.remap(Arc::new(Identity));
    assert_eq!(same.to_sdl(), CHARACTERS);

    #[cfg(feature = "async")]
    {
        let lifted = schema.remap(Arc::new(crate::context::Lift));
        assert_eq!(lifted.to_sdl(), CHARACTERS);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timestamp(i64);

#[test]
fn custom_scalars_and_optional_outputs() {
    let timestamp = Input::scalar("Timestamp", |v| {
        v.as_i64()
            .map(Timestamp)
            .ok_or_else(|| "expected seconds".to_string())
    });
    let query = ObjectOutput::<Thunk, ()>::builder("Root")
        .field(
            "after",
            Field::with_args(
                Accumulator::arg("since", timestamp)
                    .merge(Accumulator::arg_or("limit", int(), 10), |since, limit| {
                        (since, limit)
                    }),
                || Output::scalar("Timestamp", |t: &Timestamp| json!(t.0)).optional(),
                |_: &(), (since, limit): (Timestamp, i64)| {
                    Resolution::Pure(Some(Timestamp(since.0 + limit)))
                },
            ),
        )
        .field(
            "motd",
            Field::pure(|| string_output().optional(), |_: &()| None),
        )
        .build();

    let schema = Schema::new(query).unwrap();
    assert_eq!(
        schema.to_sdl(),
        "schema {\n  query: Root\n}\n\nscalar Timestamp\n\ntype Root {\n  after(since: Timestamp!, limit: Int!): Timestamp\n  motd: String\n}\n"
    );
}
