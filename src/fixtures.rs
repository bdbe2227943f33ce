// src/fixtures.rs

use serde::Serialize;

/// A sample document an operator can load as the source.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Fixture {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub html: &'static str,
}

pub const FIXTURES: &[Fixture] = &[
    Fixture {
        name: "word",
        description: "Word clipboard document",
        html: include_str!("../fixtures/word.html"),
    },
    Fixture {
        name: "flights",
        description: "Flight search results copied from a web page",
        html: include_str!("../fixtures/flights.html"),
    },
];

pub fn find(name: &str) -> Option<&'static Fixture> {
    FIXTURES.iter().find(|f| f.name == name)
}
