// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use shapeql::*;

use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use test_generator::test_resources;

pub mod library;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct TestCase {
    note: String,
    query: serde_json::Value,
    want_result: Option<serde_json::Value>,
    want_error: Option<String>,
    skip: Option<bool>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn run(resolution: FieldResolution<Thunk>) -> Resolved<Thunk> {
    match resolution {
        Resolution::Pure(resolved) => resolved,
        Resolution::Deferred(thunk) => thunk(),
    }
}

// A selection is a list whose items are either a field name or a single-key
// map from a field name to a nested selection, or to `{args, select}`.
fn select_fields(
    object: &ResolvedObject<Thunk>,
    selection: &serde_json::Value,
) -> Result<serde_json::Value> {
    let Some(items) = selection.as_array() else {
        bail!("selection on {} must be a list", object.typename());
    };

    let mut result = serde_json::Map::new();
    for item in items {
        let (name, args, nested) = match item {
            serde_json::Value::String(name) => (name.as_str(), None, &serde_json::Value::Null),
            serde_json::Value::Object(map) if map.len() == 1 => {
                let (name, sub) = map.iter().next().expect("map has one entry");
                match sub.get("select") {
                    Some(nested) => (name.as_str(), sub.get("args"), nested),
                    None => (name.as_str(), None, sub),
                }
            }
            _ => bail!("invalid selection item {item}"),
        };

        if name == "__typename" {
            result.insert(name.to_string(), object.typename().into());
            continue;
        }

        let args: IndexMap<String, Value> = match args.and_then(|a| a.as_object()) {
            Some(args) => args
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect(),
            None => IndexMap::new(),
        };
        let resolved = run(object.resolve_with(name, &args)?);
        result.insert(name.to_string(), select(resolved, nested)?);
    }
    Ok(serde_json::Value::Object(result))
}

fn select(resolved: Resolved<Thunk>, selection: &serde_json::Value) -> Result<serde_json::Value> {
    match resolved {
        Resolved::Null => Ok(serde_json::Value::Null),
        Resolved::Leaf(v) => Ok(v),
        Resolved::Enum(token) => Ok(token.into()),
        Resolved::List(items) => items
            .into_iter()
            .map(|item| select(item, selection))
            .collect::<Result<Vec<_>>>()
            .map(serde_json::Value::Array),
        Resolved::Object(object) => select_fields(&object, selection),
        Resolved::Abstract(value) => select_fields(&value.narrow()?, selection),
        Resolved::Error(e) => Err(e.into()),
    }
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;
    let schema = library::schema()?;

    std::eprintln!("running {file}");

    for case in test.cases {
        std::print!("case {} ", case.note);
        if case.skip == Some(true) {
            std::println!("skipped");
            continue;
        }

        let root = schema.bind(library::library());
        match (case.want_result, case.want_error, select_fields(&root, &case.query)) {
            (Some(expected), _, Ok(actual)) => {
                assert_eq!(expected, actual, "case {}", case.note);
            }
            (_, Some(expected), Err(actual)) => {
                if !actual.to_string().contains(&expected) {
                    panic!("`{actual}` does not contain `{expected}`");
                }
            }
            (want_result, want_error, actual) => {
                panic!(
                    "failure: want_result = `{want_result:?}` want_error = `{want_error:?}` actual={actual:?}"
                );
            }
        }

        std::println!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{e}");
        }
    }
}

#[test_resources("tests/execution/cases/*.yaml")]
fn run_yaml(path: &str) {
    yaml_test(path).unwrap()
}

#[test]
fn library_sdl() -> Result<()> {
    let expected = r#"schema {
  query: Query
}

enum Genre {
  SCIFI
  ROMANCE
}

input BookFilter {
  genre: Genre
  title: String
}

interface Node {
  id: Int!
}

type Query {
  book(id: Int!): Book
  books(filter: BookFilter, limit: Int!): [Book!]!
  node(id: Int!): Node
  search(text: String!): [SearchResult!]!
}

type Book implements Node {
  id: Int!
  title: String!
  genre: Genre!
  author: Author
}

type Author implements Node {
  id: Int!
  name: String!
  books: [Book!]!
}

union SearchResult = Book | Author
"#;
    assert_eq!(library::schema()?.to_sdl(), expected);
    Ok(())
}

#[test]
fn library_registry() -> Result<()> {
    let schema = library::schema()?;
    let outputs: Vec<&str> = schema.types().keys().map(|k| &**k).collect();
    assert_eq!(
        outputs,
        ["Query", "Book", "Node", "SearchResult", "Int", "String", "Genre", "Author"]
    );
    let inputs: Vec<&str> = schema.input_types().keys().map(|k| &**k).collect();
    assert_eq!(inputs, ["Int", "BookFilter", "Genre", "String"]);
    Ok(())
}

#[test]
fn positional_arguments() -> Result<()> {
    let schema = library::schema()?;
    let root = schema.bind(library::library());

    let filter = Value::from(serde_json::json!({ "genre": "SCIFI" }));
    let limit = Value::from(1_i64);
    let Resolved::List(books) = run(root.resolve("books", &[Some(&filter), Some(&limit)])?) else {
        bail!("books should be a list");
    };
    assert_eq!(books.len(), 1);

    let err = root.resolve("books", &[Some(&filter)]).unwrap_err();
    assert_eq!(err.to_string(), "books expects 2 values, got 1");
    Ok(())
}
