//! Navigation locations

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node id plus a character offset within the node's content
///
/// Offset 0 means the whole node. An empty id means "no location".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationLocation {
    pub id: String,
    pub offset: usize,
}

impl NavigationLocation {
    pub fn new(id: impl Into<String>, offset: usize) -> Self {
        Self {
            id: id.into(),
            offset,
        }
    }

    /// Location of a whole node
    pub fn node(id: impl Into<String>) -> Self {
        Self::new(id, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

impl fmt::Display for NavigationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.offset)
    }
}
