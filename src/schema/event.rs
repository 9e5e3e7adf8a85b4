use serde::{Deserialize, Serialize};

use super::noun::NounId;

/// The reserved verb that marks the end of a run.
pub const END_VERB: &str = "_end";

/// A structured record of something that happened in the story world.
///
/// Events are immutable once built. Arity is derived from which
/// participants are present; the constructors only allow a subject-only
/// or subject-and-object shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryEvent {
    verb: String,
    subject: Option<NounId>,
    object: Option<NounId>,
}

impl StoryEvent {
    /// An event with no participants, e.g. the end marker.
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            subject: None,
            object: None,
        }
    }

    pub fn unary(verb: impl Into<String>, subject: NounId) -> Self {
        Self {
            verb: verb.into(),
            subject: Some(subject),
            object: None,
        }
    }

    pub fn binary(verb: impl Into<String>, subject: NounId, object: NounId) -> Self {
        Self {
            verb: verb.into(),
            subject: Some(subject),
            object: Some(object),
        }
    }

    /// The terminal sentinel event.
    pub fn end() -> Self {
        Self::new(END_VERB)
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn subject(&self) -> Option<NounId> {
        self.subject
    }

    pub fn object(&self) -> Option<NounId> {
        self.object
    }

    /// Number of participants: 0, 1 or 2.
    pub fn arity(&self) -> usize {
        usize::from(self.subject.is_some()) + usize::from(self.object.is_some())
    }

    /// True iff this is the terminal sentinel.
    pub fn ending(&self) -> bool {
        self.verb == END_VERB
    }
}
