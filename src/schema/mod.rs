pub mod event;
pub mod noun;
pub mod relation;
