/// World state — nouns, relations, and the random source rule bodies draw from.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use thiserror::Error;

use crate::core::registry::NounRegistry;
use crate::core::relations::RelationStore;
use crate::schema::event::StoryEvent;
use crate::schema::noun::{Noun, NounId, Value};

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("unknown noun \"{0}\"")]
    NounNotFound(String),
    #[error("no noun with id {0:?}")]
    UnknownNoun(NounId),
    #[error("duplicate noun name \"{0}\"")]
    DuplicateNoun(String),
    #[error("invalid event arity: {0}")]
    InvalidArity(usize),
    #[error("choice from an empty list")]
    EmptyChoice,
}

/// The mutable state of a story world.
///
/// Rule guards read it through `&World`; rule bodies and the
/// initialization routine mutate it through `&mut World`.
pub struct World {
    nouns: NounRegistry,
    relations: RelationStore,
    rng: Box<dyn RngCore>,
}

impl World {
    pub fn new(nouns: Vec<Noun>, seed: u64) -> Result<Self, WorldError> {
        Self::with_rng(nouns, Box::new(StdRng::seed_from_u64(seed)))
    }

    /// Build a world drawing its random choices from `rng`.
    pub fn with_rng(nouns: Vec<Noun>, rng: Box<dyn RngCore>) -> Result<Self, WorldError> {
        Ok(Self {
            nouns: NounRegistry::new(nouns)?,
            relations: RelationStore::new(),
            rng,
        })
    }

    pub fn nouns(&self) -> &NounRegistry {
        &self.nouns
    }

    pub fn relations(&self) -> &RelationStore {
        &self.relations
    }

    // --- noun queries ---

    /// Look up a noun id by name.
    pub fn noun(&self, name: &str) -> Result<NounId, WorldError> {
        self.nouns.lookup(name)
    }

    pub fn get(&self, id: NounId) -> Result<&Noun, WorldError> {
        self.nouns.get(id)
    }

    pub fn name(&self, id: NounId) -> Result<&str, WorldError> {
        self.nouns.name(id)
    }

    pub fn by_tag(&self, tag: &str) -> Vec<NounId> {
        self.nouns.by_tag(tag)
    }

    pub fn by_property(&self, key: &str, value: &Value) -> Vec<NounId> {
        self.nouns.by_property(key, value)
    }

    pub fn property(&self, id: NounId, key: &str) -> Option<&Value> {
        self.nouns.get(id).ok()?.properties.get(key)
    }

    /// Property value compared against `value` with strict equality.
    /// A missing property never matches.
    pub fn property_is(&self, id: NounId, key: &str, value: impl Into<Value>) -> bool {
        self.property(id, key) == Some(&value.into())
    }

    pub fn set_property(
        &mut self,
        id: NounId,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<(), WorldError> {
        self.nouns
            .get_mut(id)?
            .properties
            .insert(key.to_string(), value.into());
        Ok(())
    }

    // --- relations ---

    /// Both endpoints of an edge must name registered nouns.
    fn check_pair(&self, a: NounId, b: NounId) -> Result<(), WorldError> {
        self.nouns.get(a)?;
        self.nouns.get(b)?;
        Ok(())
    }

    pub fn relate(&mut self, rel: &str, a: NounId, b: NounId) -> Result<(), WorldError> {
        self.check_pair(a, b)?;
        self.relations.relate(rel, a, b);
        Ok(())
    }

    pub fn unrelate(&mut self, rel: &str, a: NounId, b: NounId) -> Result<(), WorldError> {
        self.check_pair(a, b)?;
        self.relations.unrelate(rel, a, b);
        Ok(())
    }

    pub fn reciprocal(&mut self, rel: &str, a: NounId, b: NounId) -> Result<(), WorldError> {
        self.check_pair(a, b)?;
        self.relations.reciprocal(rel, a, b);
        Ok(())
    }

    pub fn unreciprocal(&mut self, rel: &str, a: NounId, b: NounId) -> Result<(), WorldError> {
        self.check_pair(a, b)?;
        self.relations.unreciprocal(rel, a, b);
        Ok(())
    }

    pub fn is_related(&self, rel: &str, a: NounId, b: NounId) -> bool {
        self.relations.is_related(rel, a, b)
    }

    /// Every noun tagged `tag` that `a` relates to by `rel`, in registry order.
    pub fn all_related_by_tag(&self, rel: &str, a: NounId, tag: &str) -> Vec<NounId> {
        self.nouns
            .by_tag(tag)
            .into_iter()
            .filter(|&b| self.relations.is_related(rel, a, b))
            .collect()
    }

    /// The first match of `all_related_by_tag`, if any.
    pub fn related_by_tag(&self, rel: &str, a: NounId, tag: &str) -> Option<NounId> {
        self.nouns
            .by_tag(tag)
            .into_iter()
            .find(|&b| self.relations.is_related(rel, a, b))
    }

    /// Remove every `a -rel-> b` edge where `b` is tagged `tag`.
    pub fn unrelate_by_tag(&mut self, rel: &str, a: NounId, tag: &str) {
        for b in self.all_related_by_tag(rel, a, tag) {
            self.relations.unrelate(rel, a, b);
        }
    }

    /// Remove both directions for every `b` tagged `tag` that `a` relates to.
    pub fn unreciprocal_by_tag(&mut self, rel: &str, a: NounId, tag: &str) {
        for b in self.all_related_by_tag(rel, a, tag) {
            self.relations.unreciprocal(rel, a, b);
        }
    }

    // --- randomness ---

    /// Pick one alternative uniformly at random.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, WorldError> {
        items.choose(&mut *self.rng).ok_or(WorldError::EmptyChoice)
    }

    /// Serialize an event against this world's noun names.
    pub fn dump(&self, event: &StoryEvent) -> Result<Vec<String>, WorldError> {
        self.nouns.dump(event)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("nouns", &self.nouns)
            .field("relations", &self.relations)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn make_world() -> World {
        World::new(
            vec![
                Noun::new("kitchen").tag("room"),
                Noun::new("living room").tag("room"),
                Noun::new("study").tag("room"),
                Noun::new("Max").tag("person").property("has_drink", false),
                Noun::new("coffee").tag("drink"),
            ],
            7,
        )
        .unwrap()
    }

    #[test]
    fn related_by_tag_in_registry_order() {
        let mut world = make_world();
        let kitchen = world.noun("kitchen").unwrap();
        let living = world.noun("living room").unwrap();
        let study = world.noun("study").unwrap();
        world.reciprocal("connects to", kitchen, study).unwrap();
        world.reciprocal("connects to", kitchen, living).unwrap();

        assert_eq!(
            world.all_related_by_tag("connects to", kitchen, "room"),
            vec![living, study]
        );
        assert_eq!(
            world.related_by_tag("connects to", kitchen, "room"),
            Some(living)
        );
        assert_eq!(world.related_by_tag("connects to", study, "drink"), None);
    }

    #[test]
    fn unrelate_by_tag_removes_only_tagged_edges() {
        let mut world = make_world();
        let coffee = world.noun("coffee").unwrap();
        let kitchen = world.noun("kitchen").unwrap();
        let study = world.noun("study").unwrap();
        let max = world.noun("Max").unwrap();
        world.relate("currently in", coffee, kitchen).unwrap();
        world.relate("currently in", coffee, study).unwrap();
        world.relate("currently in", coffee, max).unwrap();

        world.unrelate_by_tag("currently in", coffee, "room");
        assert!(world.all_related_by_tag("currently in", coffee, "room").is_empty());
        assert!(world.is_related("currently in", coffee, max));
    }

    #[test]
    fn unreciprocal_by_tag_removes_both_directions() {
        let mut world = make_world();
        let kitchen = world.noun("kitchen").unwrap();
        let living = world.noun("living room").unwrap();
        let study = world.noun("study").unwrap();
        world.reciprocal("connects to", kitchen, living).unwrap();
        world.reciprocal("connects to", kitchen, study).unwrap();

        world.unreciprocal_by_tag("connects to", kitchen, "room");
        assert!(world.relations().is_empty());
    }

    #[test]
    fn properties_mutate_in_place() {
        let mut world = make_world();
        let max = world.noun("Max").unwrap();
        assert!(world.property_is(max, "has_drink", false));
        world.set_property(max, "has_drink", true).unwrap();
        assert!(world.property_is(max, "has_drink", true));
        assert_eq!(world.by_property("has_drink", &Value::Bool(true)), vec![max]);
        assert!(!world.property_is(max, "missing", true));
    }

    #[test]
    fn relations_reject_unregistered_nouns() {
        let mut world = make_world();
        let max = world.noun("Max").unwrap();
        let ghost = NounId(99);

        assert!(matches!(
            world.relate("currently in", max, ghost),
            Err(WorldError::UnknownNoun(NounId(99)))
        ));
        assert!(matches!(
            world.reciprocal("connects to", ghost, max),
            Err(WorldError::UnknownNoun(NounId(99)))
        ));
        assert!(world.unrelate("currently in", ghost, max).is_err());
        assert!(world.unreciprocal("connects to", max, ghost).is_err());
        assert!(!world.is_related("currently in", max, ghost));
        assert!(world.relations().is_empty());
    }

    #[test]
    fn choice_with_deterministic_source() {
        let nouns = vec![Noun::new("a")];
        let mut world = World::with_rng(nouns, Box::new(StepRng::new(0, 0))).unwrap();
        let items = ["first", "second", "third"];
        assert_eq!(*world.choice(&items).unwrap(), "first");
        assert_eq!(*world.choice(&items).unwrap(), "first");
    }

    #[test]
    fn choice_from_empty_list_fails() {
        let mut world = make_world();
        let empty: [NounId; 0] = [];
        assert!(matches!(world.choice(&empty), Err(WorldError::EmptyChoice)));
    }

    #[test]
    fn same_seed_same_choices() {
        let items: Vec<u32> = (0..50).collect();
        let mut w1 = make_world();
        let mut w2 = make_world();
        for _ in 0..20 {
            assert_eq!(w1.choice(&items).unwrap(), w2.choice(&items).unwrap());
        }
    }
}
