//! Narrative World — a rule-driven discrete-event story simulator.
//!
//! A fixed cast of tagged, property-bearing nouns is linked by directed
//! named relations. Authored actions match nouns by name or tag, fire when
//! their guards hold, mutate the world, and emit story events. Stepping
//! repeats until the world converges, and each event can be rendered to
//! prose through a discourse grammar.

pub mod core;
pub mod schema;

pub use crate::core::action::{Action, ActionEngine, BodyResult};
pub use crate::core::narrative::{Convergence, Narrative, NarrativeBuilder, NarrativeError, Phase};
pub use crate::core::world::{World, WorldError};
pub use crate::schema::event::{StoryEvent, END_VERB};
pub use crate::schema::noun::{Noun, NounId, Pattern, Value};
