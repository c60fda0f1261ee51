//! Student entity.
//!
//! # Invariants
//! - `id` is assigned by the store on insert and never reused.
//! - A `Student` value always carries a persisted id; unsaved input is a
//!   [`NewStudent`].

use serde::{Deserialize, Serialize};

/// Store-assigned surrogate key of a student row.
pub type StudentId = i64;

/// Unsaved student input. Persisting it yields a [`Student`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
}

impl NewStudent {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// Persisted student snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
}

impl Student {
    /// Attaches a store-assigned id to an unsaved student.
    pub(crate) fn from_new(id: StudentId, draft: &NewStudent) -> Self {
        Self {
            id,
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
        }
    }

    /// `"<first> <last>"`, used by CLI listings.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
