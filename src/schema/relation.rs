use serde::{Deserialize, Serialize};

use super::noun::NounId;

/// A directed, named, presence-only edge between two nouns.
///
/// The key is structured, so no choice of relation or noun name can
/// make two different triples collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationKey {
    pub relation: String,
    pub subject: NounId,
    pub object: NounId,
}

impl RelationKey {
    pub fn new(relation: &str, subject: NounId, object: NounId) -> Self {
        Self {
            relation: relation.to_string(),
            subject,
            object,
        }
    }

    /// The same relation pointing the other way.
    pub fn reversed(&self) -> Self {
        Self {
            relation: self.relation.clone(),
            subject: self.object,
            object: self.subject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_with_separator_like_names_stay_distinct() {
        let a = RelationKey::new("in$x", NounId(1), NounId(2));
        let b = RelationKey::new("in", NounId(1), NounId(2));
        assert_ne!(a, b);
    }

    #[test]
    fn reversed_swaps_direction() {
        let key = RelationKey::new("connects to", NounId(0), NounId(1));
        let rev = key.reversed();
        assert_eq!(rev.subject, NounId(1));
        assert_eq!(rev.object, NounId(0));
        assert_eq!(rev.relation, "connects to");
        assert_eq!(rev.reversed(), key);
    }
}
