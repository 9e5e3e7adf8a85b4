/// Action engine — matches authored rules against nouns and runs them.
use tracing::trace;

use crate::core::log::EventLog;
use crate::core::world::{World, WorldError};
use crate::schema::event::StoryEvent;
use crate::schema::noun::{NounId, Pattern};

/// Result of running a rule body or the initialization routine.
pub type BodyResult = Result<Vec<StoryEvent>, WorldError>;

type Guard1 = Box<dyn Fn(&World, NounId) -> bool>;
type Body1 = Box<dyn Fn(&mut World, NounId) -> BodyResult>;
type Guard2 = Box<dyn Fn(&World, NounId, NounId) -> bool>;
type Body2 = Box<dyn Fn(&mut World, NounId, NounId) -> BodyResult>;

enum Rule {
    Unary {
        pattern: Pattern,
        when: Guard1,
        then: Body1,
    },
    Binary {
        patterns: (Pattern, Pattern),
        when: Guard2,
        then: Body2,
    },
}

/// An authored rule: one or two match patterns, a guard, and a body.
///
/// The body returns the events it produced, in order, and applies its
/// mutations to the world directly.
pub struct Action {
    name: Option<String>,
    rule: Rule,
}

impl Action {
    /// A rule matched against single nouns.
    pub fn unary<W, T>(pattern: impl Into<Pattern>, when: W, then: T) -> Self
    where
        W: Fn(&World, NounId) -> bool + 'static,
        T: Fn(&mut World, NounId) -> BodyResult + 'static,
    {
        Self {
            name: None,
            rule: Rule::Unary {
                pattern: pattern.into(),
                when: Box::new(when),
                then: Box::new(then),
            },
        }
    }

    /// A rule matched against ordered pairs of distinct nouns.
    pub fn binary<W, T>(a: impl Into<Pattern>, b: impl Into<Pattern>, when: W, then: T) -> Self
    where
        W: Fn(&World, NounId, NounId) -> bool + 'static,
        T: Fn(&mut World, NounId, NounId) -> BodyResult + 'static,
    {
        Self {
            name: None,
            rule: Rule::Binary {
                patterns: (a.into(), b.into()),
                when: Box::new(when),
                then: Box::new(then),
            },
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn arity(&self) -> usize {
        match self.rule {
            Rule::Unary { .. } => 1,
            Rule::Binary { .. } => 2,
        }
    }

    /// Apply this rule to every matching noun (or pair), in registry order.
    ///
    /// Each guard is evaluated right before its body would run, so it sees
    /// every mutation made earlier in the pass.
    fn apply(&self, world: &mut World, out: &mut Vec<StoryEvent>) -> Result<(), WorldError> {
        match &self.rule {
            Rule::Unary { pattern, when, then } => {
                for a in world.nouns().matching(pattern) {
                    if when(&*world, a) {
                        trace!(action = self.label(), subject = a.0, "rule fired");
                        out.extend(then(&mut *world, a)?);
                    }
                }
            }
            Rule::Binary {
                patterns: (pa, pb),
                when,
                then,
            } => {
                let candidates_a = world.nouns().matching(pa);
                let candidates_b = world.nouns().matching(pb);
                for &a in &candidates_a {
                    for &b in &candidates_b {
                        if a == b {
                            continue;
                        }
                        if when(&*world, a, b) {
                            trace!(
                                action = self.label(),
                                subject = a.0,
                                object = b.0,
                                "rule fired"
                            );
                            out.extend(then(&mut *world, a, b)?);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}

/// The ordered rule list of a story. Order is evaluation order.
#[derive(Debug, Default)]
pub struct ActionEngine {
    actions: Vec<Action>,
}

impl ActionEngine {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Run one full pass over every rule, strictly sequentially.
    ///
    /// Events are returned in the order they were produced and appended
    /// to `log` once the whole pass has succeeded. A body error aborts the
    /// pass and leaves `log` untouched; world mutations made before the
    /// failing body are not rolled back.
    pub fn run(&self, world: &mut World, log: &mut EventLog) -> Result<Vec<StoryEvent>, WorldError> {
        let mut events = Vec::new();
        for action in &self.actions {
            action.apply(world, &mut events)?;
        }
        for event in &events {
            log.push(event.clone());
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::noun::Noun;

    fn make_world() -> World {
        World::new(
            vec![
                Noun::new("hall").tag("room"),
                Noun::new("Ann").tag("person").property("awake", false),
                Noun::new("Bo").tag("person").property("awake", false),
                Noun::new("Cy").tag("person").property("awake", true),
            ],
            1,
        )
        .unwrap()
    }

    #[test]
    fn unary_rule_runs_in_registry_order_when_guard_holds() {
        let mut world = make_world();
        let mut log = EventLog::new();
        let engine = ActionEngine::new(vec![Action::unary(
            "#person",
            |w, a| w.property_is(a, "awake", false),
            |w, a| {
                w.set_property(a, "awake", true)?;
                Ok(vec![StoryEvent::unary("wakes", a)])
            },
        )
        .named("wake")]);

        let events = engine.run(&mut world, &mut log).unwrap();
        let names: Vec<_> = events
            .iter()
            .map(|e| world.dump(e).unwrap().join(" "))
            .collect();
        assert_eq!(names, vec!["Ann wakes", "Bo wakes"]);
        assert_eq!(log.events(), events.as_slice());
    }

    #[test]
    fn binary_rule_skips_identical_pairs_and_nests_a_outer() {
        let mut world = make_world();
        let mut log = EventLog::new();
        let engine = ActionEngine::new(vec![Action::binary(
            "#person",
            "#person",
            |_, _, _| true,
            |_, a, b| Ok(vec![StoryEvent::binary("greets", a, b)]),
        )]);

        let events = engine.run(&mut world, &mut log).unwrap();
        let pairs: Vec<_> = events
            .iter()
            .map(|e| (e.subject().unwrap().0, e.object().unwrap().0))
            .collect();
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 1), (2, 3), (3, 1), (3, 2)]);
    }

    #[test]
    fn later_pairs_observe_earlier_mutations() {
        let mut world = make_world();
        let mut log = EventLog::new();
        // Only the first sleeper may be woken: the guard checks that
        // nobody was woken yet in this pass.
        let engine = ActionEngine::new(vec![Action::binary(
            "Cy",
            "#person",
            |w, _, b| w.property_is(b, "awake", false) && w.by_property("woken", &true.into()).is_empty(),
            |w, _, b| {
                w.set_property(b, "awake", true)?;
                w.set_property(b, "woken", true)?;
                Ok(vec![StoryEvent::unary("woken", b)])
            },
        )]);

        let events = engine.run(&mut world, &mut log).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject(), Some(NounId(1)));
    }

    #[test]
    fn later_rules_observe_earlier_rules() {
        let mut world = make_world();
        let mut log = EventLog::new();
        let engine = ActionEngine::new(vec![
            Action::unary(
                "Ann",
                |_, _| true,
                |w, a| {
                    w.set_property(a, "awake", true)?;
                    Ok(vec![])
                },
            ),
            Action::unary(
                "Ann",
                |w, a| w.property_is(a, "awake", true),
                |_, a| Ok(vec![StoryEvent::unary("stretches", a)]),
            ),
        ]);

        let events = engine.run(&mut world, &mut log).unwrap();
        assert_eq!(events, vec![StoryEvent::unary("stretches", NounId(1))]);
    }

    #[test]
    fn body_error_propagates() {
        let mut world = make_world();
        let mut log = EventLog::new();
        let engine = ActionEngine::new(vec![Action::unary(
            "#room",
            |_, _| true,
            |w, _| {
                let garden = w.noun("garden")?;
                Ok(vec![StoryEvent::unary("bloom", garden)])
            },
        )]);
        assert!(matches!(
            engine.run(&mut world, &mut log),
            Err(WorldError::NounNotFound(_))
        ));
    }

    #[test]
    fn failed_pass_logs_nothing() {
        let mut world = make_world();
        let mut log = EventLog::new();
        let engine = ActionEngine::new(vec![
            Action::unary("hall", |_, _| true, |_, h| Ok(vec![StoryEvent::unary("echoes", h)])),
            Action::unary(
                "hall",
                |_, _| true,
                |w, _| {
                    let garden = w.noun("garden")?;
                    Ok(vec![StoryEvent::unary("bloom", garden)])
                },
            ),
        ]);
        assert!(engine.run(&mut world, &mut log).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn action_metadata() {
        let action = Action::binary("#a", "#b", |_, _, _| false, |_, _, _| Ok(vec![])).named("noop");
        assert_eq!(action.name(), Some("noop"));
        assert_eq!(action.arity(), 2);
    }
}
