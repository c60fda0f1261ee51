//! Named-query registry and executor.
//!
//! # Responsibility
//! - Map symbolic query names (`Class.findClassByCode`, ...) to compiled,
//!   parameterized statements.
//! - Execute a query given its name and a parameter map.
//!
//! # Invariants
//! - The registry is a closed enum resolved at compile time; names cannot be
//!   registered at runtime.
//! - Single-result queries fail on zero rows (`NotFound`) and on more than one
//!   row (`MultipleResults`).

pub mod named;
pub mod params;
pub mod runner;

pub use named::{Cardinality, EntityKind, NamedQuery, ParamKind, ParamSpec, QueryDefinition};
pub use params::{QueryParams, QueryValue};
pub use runner::{Entity, NamedQueryRunner, QueryResult};
