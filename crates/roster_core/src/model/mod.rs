//! Roster domain model.
//!
//! # Responsibility
//! - Define flat entity records for students and classes.
//! - Define relationship read models keyed by the other endpoint's identity.
//!
//! # Invariants
//! - Entities never own or reference each other; navigation is an explicit
//!   repository load through the bridge table.

pub mod class;
pub mod enrollment;
pub mod student;
