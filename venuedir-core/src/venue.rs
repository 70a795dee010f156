//! A single directory entry.

use crate::geo::GeoPoint;
use crate::models::{Html, Link};
use crate::slug::normalize;
use serde::Serialize;
use venuedir_types::LabelId;

/// A venue as loaded from one record file
///
/// `category` and `tags` point into the directory's label registries.
/// `tags` holds each label at most once, ordered by ascending tag slug.
#[derive(Debug, Clone, Serialize)]
pub struct Venue {
    pub name: String,
    pub address: String,
    pub coordinates: GeoPoint,
    pub description: Html,
    pub links: Vec<Link>,
    pub category: LabelId,
    pub tags: Vec<LabelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl Venue {
    /// `"venue/{normalized name}"`
    pub fn slug(&self) -> String {
        format!("venue/{}", normalize(&self.name))
    }

    /// Whether the venue can be placed on a map
    pub fn has_location(&self) -> bool {
        self.coordinates.is_valid()
    }

    pub fn has_tag(&self, tag: LabelId) -> bool {
        self.tags.contains(&tag)
    }
}
