//! Typed domain model for tasks and projects.
//!
//! # Responsibility
//! - Define canonical records used by store, engine and service layers.
//! - Keep lifecycle transitions next to the data they guard.
//!
//! # Invariants
//! - Ids are numeric, assigned once and never reused.
//! - Derived scores (urgency/importance) are not part of persisted records.

pub mod dates;
pub mod project;
pub mod task;
