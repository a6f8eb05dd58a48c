// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::json;

use super::super::*;
use super::fixtures::*;
use crate::accumulator::Accumulator;
use crate::context::{Identity, Resolution, Thunk};
use crate::input::Input;
use crate::output::object::Field;
use crate::output::resolved::{FieldResolution, Resolved};
use crate::output::Output;
use crate::tests::common::{int, int_output, string, string_output};
use crate::value::Value;

fn run(resolution: FieldResolution<Thunk>) -> Resolved<Thunk> {
    match resolution {
        Resolution::Pure(resolved) => resolved,
        Resolution::Deferred(thunk) => thunk(),
    }
}

#[test]
fn collects_reachable_types_once() {
    let schema = Schema::new(query()).unwrap();

    let types: Vec<&str> = schema.types().keys().map(|k| &**k).collect();
    assert_eq!(
        types,
        [
            "Query",
            "Character",
            "String",
            "Human",
            "Droid",
            "SearchResult",
            "Int",
            "Episode"
        ]
    );

    let inputs: Vec<&str> = schema.input_types().keys().map(|k| &**k).collect();
    assert_eq!(inputs, ["Episode", "String", "DroidFilter"]);
}

#[test]
fn lookups() {
    let schema = Schema::new(query()).unwrap();
    assert_eq!(schema.query().name(), "Query");

    let Some(OutputShape::Interface(character)) = schema.get("Character") else {
        panic!("Character should be an interface");
    };
    let members: Vec<&str> = character.members().iter().map(|m| m.name()).collect();
    assert_eq!(members, ["Human", "Droid"]);

    let Some(InputShape::Object { fields, .. }) = schema.input("DroidFilter") else {
        panic!("DroidFilter should be an input object");
    };
    assert_eq!(fields.len(), 2);
    assert!(schema.get("Missing").is_none());
}

#[test]
fn bound_root_resolves_through_abstract_types() {
    let schema = Schema::new(query()).unwrap();
    let root = schema.bind(());

    let mut args = IndexMap::new();
    args.insert("episode".to_string(), Value::enum_token("EMPIRE"));
    let hero = run(root.resolve_with("hero", &args).unwrap());
    let hero = hero.as_abstract().unwrap().narrow().unwrap();
    assert_eq!(hero.typename(), "Human");
    assert_eq!(
        run(hero.resolve("name", &[]).unwrap()).to_json(),
        Some(json!("Luke Skywalker"))
    );
    assert_eq!(
        run(hero.resolve("appearsIn", &[]).unwrap()).to_json(),
        Some(json!(["NEWHOPE", "EMPIRE"]))
    );

    // default argument
    let hero = run(root.resolve_with("hero", &IndexMap::new()).unwrap());
    assert_eq!(
        hero.as_abstract().unwrap().narrow().unwrap().typename(),
        "Droid"
    );
}

#[test]
fn input_objects_in_arguments() {
    let schema = Schema::new(query()).unwrap();
    let root = schema.bind(());

    let filter = Value::from(json!({ "primaryFunction": "Protocol" }));
    let Resolved::List(droids) = run(root.resolve("droids", &[Some(&filter)]).unwrap()) else {
        panic!("droids should be a list");
    };
    assert_eq!(droids.len(), 1);
    let name = run(droids[0].as_object().unwrap().resolve("name", &[]).unwrap());
    assert_eq!(name.to_json(), Some(json!("C-3PO")));

    let Resolved::List(all) = run(root.resolve("droids", &[None]).unwrap()) else {
        panic!("droids should be a list");
    };
    assert_eq!(all.len(), 2);
}

#[test]
fn output_kinds_conflict() {
    let query = ObjectOutput::<Thunk, ()>::builder("Query")
        .field("droid", Field::pure(|| Output::from(droid()), |_: &()| r2d2()))
        .field(
            "fake",
            Field::pure(
                || Output::scalar("Droid", |_: &i64| json!(0)),
                |_: &()| 0,
            ),
        )
        .build();

    assert_eq!(
        Schema::new(query).unwrap_err(),
        SchemaError::ConflictingTypes {
            name: "Droid".to_string(),
            first: "type",
            second: "scalar",
        }
    );
}

#[test]
fn input_and_output_kinds_conflict() {
    let droid_input = Input::object(
        "Droid",
        Accumulator::field("name", string()),
    );
    let query = ObjectOutput::<Thunk, ()>::builder("Query")
        .field(
            "echo",
            Field::with_args(
                Accumulator::arg("droid", droid_input),
                || Output::from(droid()),
                |_: &(), name: String| {
                    Resolution::Pure(Droid {
                        name,
                        primary_function: String::new(),
                    })
                },
            ),
        )
        .build();

    assert_eq!(
        Schema::new(query).unwrap_err().to_string(),
        "Droid is declared as both input and type"
    );
}

#[derive(Debug, Clone)]
struct User {
    id: i64,
    email: String,
}

fn user_with_id() -> ObjectOutput<Thunk, User> {
    ObjectOutput::<Thunk, User>::builder("User")
        .field("id", Field::pure(int_output, |u: &User| u.id))
        .build()
}

fn user_with_email() -> ObjectOutput<Thunk, User> {
    ObjectOutput::<Thunk, User>::builder("User")
        .field("email", Field::pure(string_output, |u: &User| u.email.clone()))
        .build()
}

fn ada() -> User {
    User {
        id: 1,
        email: "ada@example.com".to_string(),
    }
}

#[test]
fn same_name_objects_must_agree() {
    let query = ObjectOutput::<Thunk, ()>::builder("Query")
        .field("byId", Field::pure(|| Output::from(user_with_id()), |_: &()| ada()))
        .field("byEmail", Field::pure(|| Output::from(user_with_email()), |_: &()| ada()))
        .build();
    assert_eq!(
        Schema::new(query).unwrap_err(),
        SchemaError::ConflictingDefinitions {
            name: "User".to_string(),
        }
    );

    // the same definition reached twice is registered once
    let query = ObjectOutput::<Thunk, ()>::builder("Query")
        .field("me", Field::pure(|| Output::from(user_with_id()), |_: &()| ada()))
        .field("you", Field::pure(|| Output::from(user_with_id()).optional(), |_: &()| None))
        .build();
    let schema = Schema::new(query).unwrap();
    assert_eq!(schema.types().keys().filter(|k| &***k == "User").count(), 1);
}

#[test]
fn same_name_fields_must_take_the_same_arguments() {
    let plain = || {
        ObjectOutput::<Thunk, User>::builder("User")
            .field("id", Field::pure(int_output, |u: &User| u.id))
            .build()
    };
    let with_arg = || {
        ObjectOutput::<Thunk, User>::builder("User")
            .field(
                "id",
                Field::with_args(
                    Accumulator::arg("offset", int()),
                    int_output,
                    |u: &User, offset: i64| Resolution::Pure(u.id + offset),
                ),
            )
            .build()
    };
    let query = ObjectOutput::<Thunk, ()>::builder("Query")
        .field("a", Field::pure(move || Output::from(plain()), |_: &()| ada()))
        .field("b", Field::pure(move || Output::from(with_arg()), |_: &()| ada()))
        .build();
    assert_eq!(
        Schema::new(query).unwrap_err().to_string(),
        "User has conflicting definitions"
    );
}

#[test]
fn shared_enums_must_declare_the_same_values() {
    let short_episode = Input::enumeration("Episode", [("NEWHOPE", Episode::NewHope)]);
    let query = ObjectOutput::<Thunk, ()>::builder("Query")
        .field(
            "echo",
            Field::with_args(
                Accumulator::arg("episode", short_episode),
                episode_output,
                |_: &(), e: Episode| Resolution::Pure(e),
            ),
        )
        .build();
    assert_eq!(
        Schema::new(query).unwrap_err(),
        SchemaError::ConflictingDefinitions {
            name: "Episode".to_string(),
        }
    );
}

#[test]
fn same_name_input_objects_must_agree() {
    let point = Input::object(
        "Point",
        Accumulator::field("x", int()).merge(Accumulator::field("y", int()), |x, y| x + y),
    );
    let flat = Input::object("Point", Accumulator::field("x", int()));
    let query = ObjectOutput::<Thunk, ()>::builder("Query")
        .field(
            "sum",
            Field::with_args(
                Accumulator::arg("a", point).and(Accumulator::arg("b", flat)),
                int_output,
                |_: &(), (a, b): (i64, i64)| Resolution::Pure(a + b),
            ),
        )
        .build();
    assert_eq!(
        Schema::new(query).unwrap_err(),
        SchemaError::ConflictingDefinitions {
            name: "Point".to_string(),
        }
    );
}

#[derive(Debug, Clone, PartialEq)]
struct Tree {
    children: Vec<Tree>,
}

fn tree() -> Input<Tree> {
    Input::lazy("Tree", || {
        Input::object(
            "Tree",
            Accumulator::field("children", tree().list()).map(|children| Tree { children }),
        )
    })
}

#[test]
fn recursive_inputs_register_once() {
    let query = ObjectOutput::<Thunk, ()>::builder("Query")
        .field(
            "depth",
            Field::with_args(
                Accumulator::arg("tree", tree()),
                int_output,
                |_: &(), tree: Tree| {
                    fn depth(t: &Tree) -> i64 {
                        1 + t.children.iter().map(depth).max().unwrap_or(0)
                    }
                    Resolution::Pure(depth(&tree))
                },
            ),
        )
        .build();

    let schema = Schema::new(query).unwrap();
    let inputs: Vec<&str> = schema.input_types().keys().map(|k| &**k).collect();
    assert_eq!(inputs, ["Tree"]);

    let tree = Value::from(json!({ "children": [{ "children": [{ "children": [] }] }] }));
    let depth = run(schema.bind(()).resolve("depth", &[Some(&tree)]).unwrap());
    assert_eq!(depth.to_json(), Some(json!(3)));
}

#[test]
fn identity_remap_keeps_registry() {
    let schema = Schema::new(query()).unwrap();
    let same: Schema<Thunk, ()> = schema.remap(Arc::new(Identity));
    assert!(same.types().keys().eq(schema.types().keys()));
    assert!(same.input_types().keys().eq(schema.input_types().keys()));
}

#[cfg(feature = "async")]
#[test]
fn lifted_schema_defers_into_futures() {
    use crate::context::{Async, Lift};
    use futures::executor::block_on;

    let schema: Schema<Async, ()> = Schema::new(query()).unwrap().remap(Arc::new(Lift));
    let root = schema.bind(());

    let text = Value::from("Luke");
    let Resolution::Pure(Resolved::List(found)) = root.resolve("search", &[Some(&text)]).unwrap()
    else {
        panic!("search should resolve to a pure list");
    };
    let luke = found[0].as_abstract().unwrap().narrow().unwrap();
    let name = luke.resolve("name", &[]).unwrap();
    assert!(!name.is_pure());
    assert_eq!(
        block_on(name.into_deferred()).to_json(),
        Some(json!("Luke Skywalker"))
    );
}
