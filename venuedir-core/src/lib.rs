//! # venuedir-core
//!
//! Core library for the venuedir directory generator.
//!
//! This crate loads declarative category and venue records, resolves their
//! cross-references into a deduplicated graph of venues, categories and tags,
//! and derives the stable slugs a renderer uses for output paths and URLs.

pub mod config;
pub mod coords;
pub mod directory;
pub mod geo;
pub mod label;
pub mod models;
pub mod records;
pub mod sitemap;
pub mod slug;
pub mod venue;

pub use config::Config;
pub use directory::{Directory, DirectoryBuilder, DirectoryLoader, LoadError};
pub use geo::{distance, GeoPoint};
pub use label::{Label, LabelRegistry};
pub use models::{Diagnostic, Html, Link};
pub use records::{CategoryRecord, RecordError, VenueRecord};
pub use sitemap::{canonical_url, Sitemap};
pub use slug::normalize;
pub use venue::Venue;
pub use venuedir_types::{LabelId, LabelKind, VenueId};
