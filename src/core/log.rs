/// Event log — the append-only record of everything that happened in a run.
use crate::core::registry::NounRegistry;
use crate::core::world::WorldError;
use crate::schema::event::StoryEvent;

/// Chronological events from initialization and every step.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<StoryEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: StoryEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&StoryEvent> {
        self.events.last()
    }

    pub fn events(&self) -> &[StoryEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoryEvent> {
        self.events.iter()
    }

    /// True once the most recent event is the terminal sentinel.
    pub fn is_ended(&self) -> bool {
        self.last().is_some_and(StoryEvent::ending)
    }

    /// Every event serialized as a name tuple.
    pub fn dump(&self, nouns: &NounRegistry) -> Result<Vec<Vec<String>>, WorldError> {
        self.events.iter().map(|ev| nouns.dump(ev)).collect()
    }
}
