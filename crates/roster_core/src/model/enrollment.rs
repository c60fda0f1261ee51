//! Relationship read models over the `class_students` bridge.
//!
//! # Invariants
//! - Related keys are listed in bridge insertion order (`seq ASC`).
//! - Read models hold keys of the other endpoint, never embedded entities,
//!   so no value ever points back at its owner.

use super::class::{Class, ClassCode};
use super::student::{Student, StudentId};
use serde::{Deserialize, Serialize};

/// Student snapshot together with the codes of the classes it is enrolled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentWithClasses {
    pub student: Student,
    pub class_codes: Vec<ClassCode>,
}

/// Class snapshot together with the ids of its enrolled students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassWithStudents {
    pub class: Class,
    pub student_ids: Vec<StudentId>,
}
