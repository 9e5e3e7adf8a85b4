use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Newtype wrapper for noun IDs: the noun's position in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NounId(pub usize);

/// A dynamic value that can be stored in noun properties.
///
/// Equality is strict: `Int(1)` and `Float(1.0)` are different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Float(f64),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Float(x) => write!(f, "{}", x),
            Self::Int(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

/// A noun is anything that can take part in a story event:
/// a person, a place, an object.
///
/// The engine does not interpret tag semantics; tags are only used
/// for rule pattern matching and tag-scoped relation queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Noun {
    pub name: String,
    #[serde(default)]
    pub tags: FxHashSet<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Noun {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: FxHashSet::default(),
            properties: BTreeMap::new(),
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns true if this noun has the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Returns true if this noun matches a rule pattern.
    pub fn matches(&self, pattern: &Pattern) -> bool {
        match pattern {
            Pattern::Name(name) => self.name == *name,
            Pattern::Tag(tag) => self.has_tag(tag),
        }
    }
}

/// One slot of an action's match list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// Matches the single noun with exactly this name.
    Name(String),
    /// Matches every noun carrying this tag.
    Tag(String),
}

impl Pattern {
    /// `"#person"` is a tag reference, anything else is an exact name.
    pub fn parse(input: &str) -> Pattern {
        match input.strip_prefix('#') {
            Some(tag) => Pattern::Tag(tag.to_string()),
            None => Pattern::Name(input.to_string()),
        }
    }
}

impl From<&str> for Pattern {
    fn from(input: &str) -> Self {
        Pattern::parse(input)
    }
}
