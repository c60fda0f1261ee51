//! Class entity keyed by its natural `code`.

use serde::{Deserialize, Serialize};

/// Caller-assigned class code, e.g. `math17`.
pub type ClassCode = String;

/// Class row. The same shape is used for insert input and loaded snapshots
/// because the identity is supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub code: ClassCode,
    pub name: String,
}

impl Class {
    pub fn new(code: impl Into<ClassCode>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}
