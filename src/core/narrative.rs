/// The step scheduler: initialization, rule passes, convergence, and rendering.
///
/// A caller builds a `Narrative` and drives `step()` in a loop until the
/// returned events end with the terminal sentinel.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::action::{Action, ActionEngine, BodyResult};
use crate::core::fingerprint::{fingerprint, Fingerprint};
use crate::core::grammar::{GrammarError, GrammarSet};
use crate::core::log::EventLog;
use crate::core::world::{World, WorldError};
use crate::schema::event::StoryEvent;
use crate::schema::noun::{Noun, NounId};

/// Offset between the simulation seed and the rendering seed, so prose
/// generation never consumes the simulation's random sequence.
const RENDER_SEED_OFFSET: u64 = 7919;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("world error: {0}")]
    World(#[from] WorldError),
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("narrative halted after a failed step")]
    Halted,
}

/// The one-time routine run by the first `step()`.
pub type Initializer = Box<dyn Fn(&mut World) -> BodyResult>;

/// Lifecycle of a run. Transitions are linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Initializing,
    Running,
    Terminated,
    /// A step returned an error. The world may hold partial mutations,
    /// so every later `step()` refuses to run.
    Failed,
}

/// When a run counts as converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Convergence {
    /// End when a step produces no events, or when the world fingerprint
    /// is unchanged from the previous step.
    #[default]
    NoEventsOrStableState,
    /// End only when a step produces no events. Non-mutating event cycles
    /// keep narrating until the caller stops stepping.
    NoEventsOnly,
}

/// A running story world.
pub struct Narrative {
    world: World,
    engine: ActionEngine,
    initialize: Option<Initializer>,
    discourse: GrammarSet,
    convergence: Convergence,
    log: EventLog,
    state_history: Vec<Fingerprint>,
    step_count: u64,
    phase: Phase,
    render_rng: StdRng,
}

/// Builder for constructing a `Narrative`.
pub struct NarrativeBuilder {
    nouns: Vec<Noun>,
    nouns_ron: Vec<String>,
    nouns_paths: Vec<PathBuf>,
    actions: Vec<Action>,
    initialize: Option<Initializer>,
    discourse: GrammarSet,
    discourse_ron: Vec<String>,
    discourse_paths: Vec<PathBuf>,
    convergence: Convergence,
    seed: u64,
    rng: Option<Box<dyn RngCore>>,
}

impl Narrative {
    pub fn builder() -> NarrativeBuilder {
        NarrativeBuilder {
            nouns: Vec::new(),
            nouns_ron: Vec::new(),
            nouns_paths: Vec::new(),
            actions: Vec::new(),
            initialize: None,
            discourse: GrammarSet::default(),
            discourse_ron: Vec::new(),
            discourse_paths: Vec::new(),
            convergence: Convergence::default(),
            seed: 0,
            rng: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for callers that set up or poke at state
    /// between steps.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn events(&self) -> &EventLog {
        &self.log
    }

    pub fn state_history(&self) -> &[Fingerprint] {
        &self.state_history
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn discourse(&self) -> &GrammarSet {
        &self.discourse
    }

    /// True once the terminal sentinel is the last logged event.
    pub fn is_over(&self) -> bool {
        self.log.is_ended()
    }

    /// Advance the story by one step and return the events it produced.
    ///
    /// The first call runs the initialization routine if there is one.
    /// After termination every call returns an empty list. After an error
    /// the run is `Failed` and every call returns `NarrativeError::Halted`.
    pub fn step(&mut self) -> Result<Vec<StoryEvent>, NarrativeError> {
        if self.phase == Phase::Failed {
            return Err(NarrativeError::Halted);
        }
        if self.is_over() {
            return Ok(Vec::new());
        }

        let result = self.advance();
        if let Err(err) = &result {
            warn!(step = self.step_count, error = %err, "step failed");
            self.phase = Phase::Failed;
        }
        result
    }

    fn advance(&mut self) -> Result<Vec<StoryEvent>, NarrativeError> {
        if self.step_count == 0 {
            if let Some(init) = &self.initialize {
                self.phase = Phase::Initializing;
                let events = init(&mut self.world)?;
                for event in &events {
                    self.log.push(event.clone());
                }
                self.step_count += 1;
                self.phase = Phase::Running;
                debug!(events = events.len(), "initialized");
                return Ok(events);
            }
        }
        self.phase = Phase::Running;

        let mut events = self.engine.run(&mut self.world, &mut self.log)?;

        let print = fingerprint(self.world.nouns(), self.world.relations());
        let unchanged = self.state_history.last() == Some(&print);
        self.state_history.push(print);
        self.step_count += 1;
        debug!(
            step = self.step_count,
            events = events.len(),
            fingerprint = %print,
            "step complete"
        );

        let stable = unchanged && self.convergence == Convergence::NoEventsOrStableState;
        if events.is_empty() || stable {
            info!(
                step = self.step_count,
                no_events = events.is_empty(),
                "narrative converged"
            );
            self.log.push(StoryEvent::end());
            events.push(StoryEvent::end());
            self.phase = Phase::Terminated;
        }

        Ok(events)
    }

    /// Serialize an event as a name tuple.
    pub fn dump(&self, event: &StoryEvent) -> Result<Vec<String>, NarrativeError> {
        Ok(self.world.dump(event)?)
    }

    /// Bindings handed to the discourse grammar for one event:
    /// `subject`, `subject_<prop>`, `object`, `object_<prop>`.
    pub fn bindings(&self, event: &StoryEvent) -> Result<HashMap<String, String>, NarrativeError> {
        let mut bindings = HashMap::new();
        let roles = [("subject", event.subject()), ("object", event.object())];
        for (role, id) in roles {
            if let Some(id) = id {
                self.bind_noun(&mut bindings, role, id)?;
            }
        }
        Ok(bindings)
    }

    fn bind_noun(
        &self,
        bindings: &mut HashMap<String, String>,
        role: &str,
        id: NounId,
    ) -> Result<(), NarrativeError> {
        let noun = self.world.get(id)?;
        bindings.insert(role.to_string(), noun.name.clone());
        for (key, value) in &noun.properties {
            bindings.insert(format!("{}_{}", role, key), value.to_string());
        }
        Ok(())
    }

    /// Render an event to prose through the discourse grammar, using the
    /// verb as the entry rule.
    pub fn render(&mut self, event: &StoryEvent) -> Result<String, NarrativeError> {
        let bindings = self.bindings(event)?;
        Ok(self
            .discourse
            .expand(event.verb(), &bindings, &mut self.render_rng)?)
    }

    pub fn render_all(&mut self, events: &[StoryEvent]) -> Result<Vec<String>, NarrativeError> {
        events.iter().map(|ev| self.render(ev)).collect()
    }

    /// `step()` followed by `render()` on each produced event.
    pub fn step_and_render(&mut self) -> Result<Vec<String>, NarrativeError> {
        let events = self.step()?;
        self.render_all(&events)
    }
}

impl std::fmt::Debug for Narrative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Narrative")
            .field("world", &self.world)
            .field("engine", &self.engine)
            .field("phase", &self.phase)
            .field("step_count", &self.step_count)
            .field("events", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl NarrativeBuilder {
    pub fn noun(mut self, noun: Noun) -> Self {
        self.nouns.push(noun);
        self
    }

    pub fn with_nouns(mut self, nouns: impl IntoIterator<Item = Noun>) -> Self {
        self.nouns.extend(nouns);
        self
    }

    /// Nouns as a RON list, appended after directly provided nouns.
    pub fn nouns_from_ron(mut self, ron: &str) -> Self {
        self.nouns_ron.push(ron.to_string());
        self
    }

    pub fn nouns_ron_file(mut self, path: impl AsRef<Path>) -> Self {
        self.nouns_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Append a rule. Rules run in the order they are added.
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn initialize<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut World) -> BodyResult + 'static,
    {
        self.initialize = Some(Box::new(init));
        self
    }

    pub fn with_discourse(mut self, grammar: GrammarSet) -> Self {
        self.discourse.merge(grammar);
        self
    }

    /// Discourse rules as RON; later sources override earlier ones.
    pub fn discourse_from_ron(mut self, ron: &str) -> Self {
        self.discourse_ron.push(ron.to_string());
        self
    }

    pub fn discourse_ron_file(mut self, path: impl AsRef<Path>) -> Self {
        self.discourse_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn convergence(mut self, convergence: Convergence) -> Self {
        self.convergence = convergence;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the seeded random source behind `World::choice`.
    pub fn rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn build(self) -> Result<Narrative, NarrativeError> {
        let mut nouns = self.nouns;
        for ron in &self.nouns_ron {
            let parsed: Vec<Noun> = ron::from_str(ron)?;
            nouns.extend(parsed);
        }
        for path in &self.nouns_paths {
            let contents = std::fs::read_to_string(path)?;
            let parsed: Vec<Noun> = ron::from_str(&contents)?;
            nouns.extend(parsed);
        }

        let mut discourse = self.discourse;
        for ron in &self.discourse_ron {
            discourse.merge(GrammarSet::parse_ron(ron)?);
        }
        for path in &self.discourse_paths {
            discourse.merge(GrammarSet::load_from_ron(path)?);
        }

        let rng: Box<dyn RngCore> = match self.rng {
            Some(rng) => rng,
            None => Box::new(StdRng::seed_from_u64(self.seed)),
        };
        let world = World::with_rng(nouns, rng)?;
        debug!(
            nouns = world.nouns().len(),
            actions = self.actions.len(),
            rules = discourse.rules.len(),
            "narrative built"
        );

        Ok(Narrative {
            world,
            engine: ActionEngine::new(self.actions),
            initialize: self.initialize,
            discourse,
            convergence: self.convergence,
            log: EventLog::new(),
            state_history: Vec::new(),
            step_count: 0,
            phase: Phase::NotStarted,
            render_rng: StdRng::seed_from_u64(self.seed.wrapping_add(RENDER_SEED_OFFSET)),
        })
    }
}
