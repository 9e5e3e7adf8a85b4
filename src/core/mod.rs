pub mod action;
pub mod fingerprint;
pub mod grammar;
pub mod log;
pub mod narrative;
pub mod registry;
pub mod relations;
pub mod world;
