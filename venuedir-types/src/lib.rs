//! Shared types for venuedir
//!
//! This crate provides the identifier types used to address venues and labels
//! inside a loaded directory. Identifiers are arena indices, so the graph of
//! venues and labels never holds owning pointers in both directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a venue in the directory's venue list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VenueId(pub usize);

impl VenueId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for VenueId {
    fn from(index: usize) -> Self {
        VenueId(index)
    }
}

/// Index of a label in its registry (categories and tags are separate arenas)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub usize);

impl LabelId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for LabelId {
    fn from(index: usize) -> Self {
        LabelId(index)
    }
}

/// Kind of grouping a label represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Category,
    Tag,
}

impl LabelKind {
    /// Path segment used in slugs ("category", "tag")
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelKind::Category => "category",
            LabelKind::Tag => "tag",
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_kind_names() {
        assert_eq!(LabelKind::Category.as_str(), "category");
        assert_eq!(LabelKind::Tag.to_string(), "tag");
    }

    #[test]
    fn ids_order_by_index() {
        assert!(VenueId::new(1) < VenueId::new(2));
        assert_eq!(LabelId::from(3).index(), 3);
    }
}
