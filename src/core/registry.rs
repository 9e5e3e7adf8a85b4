/// Noun registry — ordered storage with name, tag, and property lookup.
use rustc_hash::FxHashMap;

use crate::core::world::WorldError;
use crate::schema::event::StoryEvent;
use crate::schema::noun::{Noun, NounId, Pattern, Value};

/// All nouns of a story world, in authoring order.
///
/// Registry order is the iteration order for every query and therefore
/// the tie-break order for rule matching.
#[derive(Debug, Clone, Default)]
pub struct NounRegistry {
    nouns: Vec<Noun>,
    by_name: FxHashMap<String, NounId>,
}

impl NounRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn new(nouns: Vec<Noun>) -> Result<Self, WorldError> {
        let mut by_name = FxHashMap::default();
        for (i, noun) in nouns.iter().enumerate() {
            if by_name.insert(noun.name.clone(), NounId(i)).is_some() {
                return Err(WorldError::DuplicateNoun(noun.name.clone()));
            }
        }
        Ok(Self { nouns, by_name })
    }

    pub fn len(&self) -> usize {
        self.nouns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nouns.is_empty()
    }

    /// Iterate over `(id, noun)` in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (NounId, &Noun)> {
        self.nouns.iter().enumerate().map(|(i, n)| (NounId(i), n))
    }

    pub fn get(&self, id: NounId) -> Result<&Noun, WorldError> {
        self.nouns.get(id.0).ok_or(WorldError::UnknownNoun(id))
    }

    pub fn get_mut(&mut self, id: NounId) -> Result<&mut Noun, WorldError> {
        self.nouns.get_mut(id.0).ok_or(WorldError::UnknownNoun(id))
    }

    /// Look up a noun by name. A missing name is an authoring error.
    pub fn lookup(&self, name: &str) -> Result<NounId, WorldError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| WorldError::NounNotFound(name.to_string()))
    }

    pub fn name(&self, id: NounId) -> Result<&str, WorldError> {
        Ok(self.get(id)?.name.as_str())
    }

    /// All nouns carrying `tag`, in registry order.
    pub fn by_tag(&self, tag: &str) -> Vec<NounId> {
        self.iter()
            .filter(|(_, n)| n.has_tag(tag))
            .map(|(id, _)| id)
            .collect()
    }

    /// All nouns whose property `key` is strictly equal to `value`.
    pub fn by_property(&self, key: &str, value: &Value) -> Vec<NounId> {
        self.iter()
            .filter(|(_, n)| n.properties.get(key) == Some(value))
            .map(|(id, _)| id)
            .collect()
    }

    /// All nouns matching a rule pattern, in registry order.
    pub fn matching(&self, pattern: &Pattern) -> Vec<NounId> {
        self.iter()
            .filter(|(_, n)| n.matches(pattern))
            .map(|(id, _)| id)
            .collect()
    }

    /// Serialize an event as `[verb]`, `[subject, verb]` or
    /// `[subject, verb, object]`.
    pub fn dump(&self, event: &StoryEvent) -> Result<Vec<String>, WorldError> {
        let verb = event.verb().to_string();
        match (event.subject(), event.object()) {
            (None, None) => Ok(vec![verb]),
            (Some(a), None) => Ok(vec![self.name(a)?.to_string(), verb]),
            (Some(a), Some(b)) => Ok(vec![
                self.name(a)?.to_string(),
                verb,
                self.name(b)?.to_string(),
            ]),
            (None, Some(_)) => Err(WorldError::InvalidArity(event.arity())),
        }
    }
}
