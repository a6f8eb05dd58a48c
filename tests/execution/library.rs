// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use shapeql::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genre {
    SciFi,
    Romance,
}

#[derive(Debug, Clone)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub genre: Genre,
    pub author: i64,
}

#[derive(Debug, Clone)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum Node {
    Book(Book),
    Author(Author),
}

impl Subtype<Node> for Book {
    fn narrow(value: &Node) -> Option<Self> {
        match value {
            Node::Book(b) => Some(b.clone()),
            _ => None,
        }
    }
}

impl Subtype<Node> for Author {
    fn narrow(value: &Node) -> Option<Self> {
        match value {
            Node::Author(a) => Some(a.clone()),
            _ => None,
        }
    }
}

/// Filter for the `books` field.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub genre: Option<Genre>,
    pub title: Option<String>,
}

pub struct Library {
    pub books: Vec<Book>,
    pub authors: Vec<Author>,
}

impl Default for Library {
    fn default() -> Self {
        let book = |id, title: &str, genre, author| Book {
            id,
            title: title.to_string(),
            genre,
            author,
        };
        Self {
            books: vec![
                book(1, "Dune", Genre::SciFi, 101),
                book(2, "Emma", Genre::Romance, 102),
                book(3, "Dune Messiah", Genre::SciFi, 101),
            ],
            authors: vec![
                Author {
                    id: 101,
                    name: "Frank Herbert".to_string(),
                },
                Author {
                    id: 102,
                    name: "Jane Austen".to_string(),
                },
            ],
        }
    }
}

impl Library {
    fn author(&self, id: i64) -> Option<Author> {
        self.authors.iter().find(|a| a.id == id).cloned()
    }

    fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.books
            .iter()
            .cloned()
            .map(Node::Book)
            .chain(self.authors.iter().cloned().map(Node::Author))
    }
}

lazy_static::lazy_static! {
    static ref LIBRARY: Library = Library::default();
}

pub fn int() -> Input<i64> {
    Input::scalar("Int", |v| {
        v.as_i64().ok_or_else(|| format!("expected an integer, got {v}"))
    })
}

pub fn string() -> Input<String> {
    Input::scalar("String", |v| {
        v.as_str()
            .map(str::to_string)
            .ok_or_else(|| format!("expected a string, got {v}"))
    })
}

fn int_output() -> Output<Thunk, i64> {
    Output::scalar("Int", |n: &i64| (*n).into())
}

fn string_output() -> Output<Thunk, String> {
    Output::scalar("String", |s: &String| s.as_str().into())
}

pub fn genre_input() -> Input<Genre> {
    Input::enumeration("Genre", [("SCIFI", Genre::SciFi), ("ROMANCE", Genre::Romance)])
}

fn genre_output() -> Output<Thunk, Genre> {
    Output::enumeration("Genre", [("SCIFI", Genre::SciFi), ("ROMANCE", Genre::Romance)])
}

pub fn book_filter() -> Input<BookFilter> {
    Input::object(
        "BookFilter",
        Accumulator::field("genre", genre_input().optional()).merge(
            Accumulator::field("title", string().optional()),
            |genre, title| BookFilter { genre, title },
        ),
    )
}

pub fn book() -> ObjectOutput<Thunk, Book> {
    ObjectOutput::builder("Book")
        .field("id", Field::pure(int_output, |b: &Book| b.id))
        .field("title", Field::pure(string_output, |b: &Book| b.title.clone()))
        .field("genre", Field::pure(genre_output, |b: &Book| b.genre))
        .field(
            "author",
            Field::simple(
                || Output::from(author()).optional(),
                |b: &Book| {
                    let id = b.author;
                    Resolution::<Thunk, Option<Author>>::deferred(Box::new(move || {
                        LIBRARY.author(id)
                    }))
                },
            ),
        )
        .build()
}

pub fn author() -> ObjectOutput<Thunk, Author> {
    ObjectOutput::builder("Author")
        .field("id", Field::pure(int_output, |a: &Author| a.id))
        .field("name", Field::pure(string_output, |a: &Author| a.name.clone()))
        .field(
            "books",
            Field::pure(
                || Output::from(book()).list(),
                |a: &Author| {
                    LIBRARY
                        .books
                        .iter()
                        .filter(|b| b.author == a.id)
                        .cloned()
                        .collect::<Vec<_>>()
                },
            ),
        )
        .build()
}

pub fn node() -> InterfaceOutput<Thunk, Node> {
    InterfaceOutput::builder("Node")
        .field(
            "id",
            Field::pure(int_output, |n: &Node| match n {
                Node::Book(b) => b.id,
                Node::Author(a) => a.id,
            }),
        )
        .member(Instance::of(book()))
        .member(Instance::of(author()))
        .build()
}

pub fn search_result() -> UnionOutput<Thunk, Node> {
    UnionOutput::new(
        "SearchResult",
        [Instance::of(book()), Instance::of(author())],
    )
}

pub fn query() -> ObjectOutput<Thunk, &'static Library> {
    ObjectOutput::builder("Query")
        .field(
            "book",
            Field::with_args(
                Accumulator::arg("id", int()),
                || Output::from(book()).optional(),
                |lib: &&'static Library, id: i64| {
                    Resolution::Pure(lib.books.iter().find(|b| b.id == id).cloned())
                },
            ),
        )
        .field(
            "books",
            Field::with_args(
                Accumulator::arg("filter", book_filter().optional())
                    .and(Accumulator::arg_or("limit", int(), 10)),
                || Output::from(book()).list(),
                |lib: &&'static Library, (filter, limit): (Option<BookFilter>, i64)| {
                    let filter = filter.unwrap_or_default();
                    let books: Vec<Book> = lib
                        .books
                        .iter()
                        .filter(|b| filter.genre.map_or(true, |g| b.genre == g))
                        .filter(|b| filter.title.as_ref().map_or(true, |t| b.title.contains(t)))
                        .take(usize::try_from(limit).unwrap_or(0))
                        .cloned()
                        .collect();
                    Resolution::Pure(books)
                },
            ),
        )
        .field(
            "node",
            Field::with_args(
                Accumulator::arg("id", int()),
                || Output::from(node()).optional(),
                |lib: &&'static Library, id: i64| {
                    Resolution::Pure(lib.nodes().find(|n| match n {
                        Node::Book(b) => b.id == id,
                        Node::Author(a) => a.id == id,
                    }))
                },
            ),
        )
        .field(
            "search",
            Field::with_args(
                Accumulator::arg("text", string()),
                || Output::from(search_result()).list(),
                |lib: &&'static Library, text: String| {
                    let text = text.to_lowercase();
                    let found = lib
                        .nodes()
                        .filter(|n| {
                            let name = match n {
                                Node::Book(b) => &b.title,
                                Node::Author(a) => &a.name,
                            };
                            name.to_lowercase().contains(&text)
                        })
                        .collect::<Vec<_>>();
                    Resolution::<Thunk, Vec<Node>>::deferred(Box::new(move || found))
                },
            ),
        )
        .build()
}

pub fn schema() -> Result<Schema<Thunk, &'static Library>, SchemaError> {
    Schema::new(query())
}

pub fn library() -> &'static Library {
    &LIBRARY
}
