//! Event domain entities.

pub mod model;

pub use model::Event;
