//! Tag domain types

use serde::{Deserialize, Serialize};

/// A release marker
///
/// Only the name is needed; the host returns more fields which are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
