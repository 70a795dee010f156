//! Directory loading - reads category and venue records and builds the
//! cross-referenced, sorted graph of venues, categories and tags.

use crate::{
    config::Config,
    geo::{distance, GeoPoint},
    label::{Label, LabelRegistry},
    models::{Diagnostic, Html, Link},
    records::{CategoryRecord, RecordError, VenueRecord},
    slug::normalize,
    venue::Venue,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use venuedir_types::{LabelId, LabelKind, VenueId};
use walkdir::WalkDir;

pub const CATEGORIES_DIR: &str = "categories";
pub const VENUES_DIR: &str = "venues";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to list records in {}: {source}", .dir.display())]
    Enumerate {
        dir: PathBuf,
        source: walkdir::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {source}", .path.display())]
    Decode { path: PathBuf, source: RecordError },
}

impl LoadError {
    /// File or folder that caused the failure
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Enumerate { dir, .. } => dir,
            LoadError::Read { path, .. } | LoadError::Decode { path, .. } => path,
        }
    }
}

/// Fully resolved, sorted graph of venues, categories and tags
///
/// Built once per run and read-only afterwards. Venues, categories and tags
/// are each ordered by ascending slug, as is every label's venue list.
#[derive(Debug, Clone, Serialize)]
pub struct Directory {
    venues: Vec<Venue>,
    categories: LabelRegistry,
    tags: LabelRegistry,
    #[serde(skip)]
    diagnostics: Vec<Diagnostic>,
}

impl Directory {
    /// Load `categories/` and `venues/` below `data_dir`
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self, LoadError> {
        DirectoryLoader::new(data_dir.as_ref()).load()
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    pub fn categories(&self) -> &[Label] {
        self.categories.labels()
    }

    pub fn tags(&self) -> &[Label] {
        self.tags.labels()
    }

    pub fn category_registry(&self) -> &LabelRegistry {
        &self.categories
    }

    pub fn tag_registry(&self) -> &LabelRegistry {
        &self.tags
    }

    pub fn venue(&self, id: VenueId) -> Option<&Venue> {
        self.venues.get(id.index())
    }

    pub fn category(&self, id: LabelId) -> Option<&Label> {
        self.categories.get(id)
    }

    pub fn tag(&self, id: LabelId) -> Option<&Label> {
        self.tags.get(id)
    }

    /// Find a category by any spelling that normalizes to its id
    pub fn find_category(&self, raw_name: &str) -> Option<&Label> {
        self.categories.find(raw_name).and_then(|id| self.category(id))
    }

    /// Find a tag by any spelling that normalizes to its id
    pub fn find_tag(&self, raw_name: &str) -> Option<&Label> {
        self.tags.find(raw_name).and_then(|id| self.tag(id))
    }

    /// Find a venue by its slug (`venue/...`)
    pub fn find_venue(&self, slug: &str) -> Option<&Venue> {
        self.venues
            .binary_search_by(|v| v.slug().as_str().cmp(slug))
            .ok()
            .and_then(|i| self.venues.get(i))
    }

    pub fn category_of(&self, venue: &Venue) -> Option<&Label> {
        self.category(venue.category)
    }

    pub fn tags_of<'a>(&'a self, venue: &'a Venue) -> impl Iterator<Item = &'a Label> + 'a {
        venue.tags.iter().filter_map(move |id| self.tag(*id))
    }

    pub fn venues_of<'a>(&'a self, label: &'a Label) -> impl Iterator<Item = &'a Venue> + 'a {
        label.venues.iter().filter_map(move |id| self.venue(*id))
    }

    /// Venues with a valid location within `radius_km` of `origin`, nearest first
    pub fn venues_near(&self, origin: &GeoPoint, radius_km: f64) -> Vec<(&Venue, f64)> {
        if !origin.is_valid() {
            return Vec::new();
        }
        let mut hits: Vec<(&Venue, f64)> = self
            .venues
            .iter()
            .filter(|v| v.has_location())
            .map(|v| (v, distance(origin, &v.coordinates)))
            .filter(|(_, d)| *d <= radius_km)
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }

    /// Non-fatal problems found while loading (e.g. unparsable coordinates)
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Serialize the whole graph for an external renderer
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Single writer that accumulates records into a [`Directory`]
///
/// Labels enter the registries only through `resolve_or_insert` /
/// `resolve_or_create`, for declared categories and venue references alike.
#[derive(Debug)]
pub struct DirectoryBuilder {
    venues: Vec<Venue>,
    categories: LabelRegistry,
    tags: LabelRegistry,
    diagnostics: Vec<Diagnostic>,
}

impl Default for DirectoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryBuilder {
    pub fn new() -> Self {
        Self {
            venues: Vec::new(),
            categories: LabelRegistry::new(LabelKind::Category),
            tags: LabelRegistry::new(LabelKind::Tag),
            diagnostics: Vec::new(),
        }
    }

    /// Register a declared category
    ///
    /// A category already created from a venue reference adopts the declared
    /// metadata. A second declaration of the same id is ignored with a warning.
    pub fn add_category(&mut self, record: CategoryRecord, source: Option<&Path>) -> LabelId {
        let source_path = source.map(|p| p.display().to_string());
        let id = normalize(&record.id);

        let Some(existing_id) = self.categories.lookup(&id) else {
            let (inserted, _) = self.categories.resolve_or_insert(Label {
                kind: LabelKind::Category,
                id,
                name: record.name,
                names: record.names,
                description: Html::from(record.description),
                venues: Vec::new(),
                implicit: false,
                source_path,
            });
            return inserted;
        };

        if let Some(existing) = self.categories.get_mut(existing_id) {
            if existing.is_implicit() {
                tracing::debug!("Category {} declared after first use", existing.slug());
                existing.name = record.name;
                existing.names = record.names;
                existing.description = Html::from(record.description);
                existing.implicit = false;
                existing.source_path = source_path;
            } else {
                tracing::warn!(
                    "Duplicate category {} in {:?}; keeping the one from {:?}",
                    existing.slug(),
                    source_path,
                    existing.source_path
                );
            }
        }
        existing_id
    }

    /// Resolve a venue record's references and append it
    pub fn add_venue(&mut self, record: VenueRecord, source: Option<&Path>) -> VenueId {
        let venue_id = VenueId::new(self.venues.len());
        let source_path = source.map(|p| p.display().to_string());

        let (coordinates, coords_error) = GeoPoint::parse_or_invalid(&record.coordinates);
        if let Some(err) = coords_error {
            tracing::warn!(
                "Error parsing coordinates for venue {}: {} ({:?})",
                record.name,
                err,
                record.coordinates
            );
            self.diagnostics.push(Diagnostic {
                code: "venue.coordinates".to_string(),
                message: format!("Coordinates of '{}' could not be parsed: {}", record.name, err),
                venue_slug: Some(format!("venue/{}", normalize(&record.name))),
                source_path: source_path.clone(),
                context: Some(record.coordinates.clone()),
            });
        }

        let (category, created) = self.categories.resolve_or_create(&record.category);
        if created {
            tracing::debug!("Created category '{}' from venue {}", record.category, record.name);
        }
        if let Some(label) = self.categories.get_mut(category) {
            label.venues.push(venue_id);
        }

        let mut tags: Vec<LabelId> = Vec::with_capacity(record.tags.len());
        for raw in &record.tags {
            if normalize(raw).is_empty() {
                tracing::debug!("Skipping blank tag on venue {}", record.name);
                continue;
            }
            let (tag, created) = self.tags.resolve_or_create(raw);
            if created {
                tracing::debug!("Created tag '{}' from venue {}", raw, record.name);
            }
            if tags.contains(&tag) {
                continue;
            }
            tags.push(tag);
            if let Some(label) = self.tags.get_mut(tag) {
                label.venues.push(venue_id);
            }
        }
        let registry = &self.tags;
        tags.sort_by_cached_key(|id| registry.get(*id).map(Label::slug).unwrap_or_default());

        self.venues.push(Venue {
            name: record.name,
            address: record.address,
            coordinates,
            description: Html::from(record.description),
            links: record
                .links
                .into_iter()
                .map(|l| Link {
                    title: l.title,
                    url: l.url,
                })
                .collect(),
            category,
            tags,
            source_path,
        });

        venue_id
    }

    /// Sort every collection by slug and hand out the read-only directory
    pub fn finish(mut self) -> Directory {
        let category_remap = self.categories.sort_by_slug();
        let tag_remap = self.tags.sort_by_slug();

        let mut indexed: Vec<(usize, String, Venue)> = std::mem::take(&mut self.venues)
            .into_iter()
            .enumerate()
            .map(|(i, venue)| (i, venue.slug(), venue))
            .collect();
        indexed.sort_by(|a, b| a.1.cmp(&b.1));

        let mut venue_remap = vec![VenueId::new(0); indexed.len()];
        let mut venues = Vec::with_capacity(indexed.len());
        for (new_index, (old_index, _, mut venue)) in indexed.into_iter().enumerate() {
            venue_remap[old_index] = VenueId::new(new_index);
            venue.category = category_remap[venue.category.index()];
            // Remapping preserves slug order, so tags stay sorted
            for tag in &mut venue.tags {
                *tag = tag_remap[tag.index()];
            }
            venues.push(venue);
        }

        for label in self.categories.labels_mut().chain(self.tags.labels_mut()) {
            for venue in &mut label.venues {
                *venue = venue_remap[venue.index()];
            }
            // New venue ids follow slug order, ties in insertion order
            label.venues.sort();
        }

        tracing::info!(
            "Built directory with {} venues, {} categories, {} tags",
            venues.len(),
            self.categories.len(),
            self.tags.len()
        );

        Directory {
            venues,
            categories: self.categories,
            tags: self.tags,
            diagnostics: self.diagnostics,
        }
    }
}

/// Reads record files from a data folder and feeds them to a [`DirectoryBuilder`]
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    data_dir: PathBuf,
    extensions: Vec<String>,
}

impl DirectoryLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            extensions: vec!["yaml".to_string(), "yml".to_string()],
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir(),
            extensions: config.record_extensions.clone(),
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Load all categories, then all venues, and finalize
    pub fn load(&self) -> Result<Directory, LoadError> {
        let mut builder = DirectoryBuilder::new();

        let category_files = self.discover_records(&self.data_dir.join(CATEGORIES_DIR))?;
        tracing::info!("Found {} category records", category_files.len());
        for (path, record) in decode_all(&category_files, CategoryRecord::from_yaml)? {
            builder.add_category(record, Some(&path));
        }

        let venue_files = self.discover_records(&self.data_dir.join(VENUES_DIR))?;
        tracing::info!("Found {} venue records", venue_files.len());
        for (path, record) in decode_all(&venue_files, VenueRecord::from_yaml)? {
            builder.add_venue(record, Some(&path));
        }

        Ok(builder.finish())
    }

    /// List record files directly inside `dir`, in file-name order
    fn discover_records(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| LoadError::Enumerate {
                dir: dir.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if !self.is_record_file(entry.path()) {
                tracing::debug!("Skipping {:?}: not a record file", entry.path());
                continue;
            }
            files.push(entry.into_path());
        }

        Ok(files)
    }

    fn is_record_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Read and decode files in parallel, keeping enumeration order
fn decode_all<T, F>(paths: &[PathBuf], decode: F) -> Result<Vec<(PathBuf, T)>, LoadError>
where
    T: Send,
    F: Fn(&str) -> Result<T, RecordError> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;
            let record = decode(&content).map_err(|source| LoadError::Decode {
                path: path.clone(),
                source,
            })?;
            Ok((path.clone(), record))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slugs(labels: &[Label]) -> Vec<String> {
        labels.iter().map(Label::slug).collect()
    }

    fn venue_slugs<'a>(dir: &'a Directory, label: &'a Label) -> Vec<String> {
        dir.venues_of(label).map(Venue::slug).collect()
    }

    #[test]
    fn test_gym_scenario() {
        let mut builder = DirectoryBuilder::new();
        builder.add_category(CategoryRecord::new("gym", "Gym"), None);
        builder.add_venue(
            VenueRecord::new("Beta", "gym").with_tags(["Pilates"]),
            None,
        );
        builder.add_venue(
            VenueRecord::new("Alpha", "Gym").with_tags(["Yoga", "yoga "]),
            None,
        );
        let dir = builder.finish();

        assert_eq!(slugs(dir.categories()), vec!["category/gym"]);
        let gym = &dir.categories()[0];
        assert_eq!(venue_slugs(&dir, gym), vec!["venue/alpha", "venue/beta"]);

        assert_eq!(slugs(dir.tags()), vec!["tag/pilates", "tag/yoga"]);
        let yoga = dir.find_tag("YOGA").unwrap();
        assert_eq!(venue_slugs(&dir, yoga), vec!["venue/alpha"]);

        let alpha = dir.find_venue("venue/alpha").unwrap();
        assert_eq!(alpha.tags.len(), 1);
        assert_eq!(dir.category_of(alpha).unwrap().slug(), "category/gym");
    }

    #[test]
    fn test_implicit_category_created_once() {
        let mut builder = DirectoryBuilder::new();
        builder.add_venue(VenueRecord::new("One", "Climbing Hall"), None);
        builder.add_venue(VenueRecord::new("Two", "climbing  hall"), None);
        let dir = builder.finish();

        assert_eq!(dir.categories().len(), 1);
        let hall = &dir.categories()[0];
        assert_eq!(hall.id, "climbing-hall");
        assert_eq!(hall.name, "Climbing Hall");
        assert!(hall.is_implicit());
        assert_eq!(hall.venues.len(), 2);
    }

    #[test]
    fn test_declared_after_implicit_adopts_metadata() {
        let mut builder = DirectoryBuilder::new();
        builder.add_venue(VenueRecord::new("One", "swimming"), None);
        let mut record = CategoryRecord::new("Swimming", "Schwimmbad");
        record.description = "<p>Hallen- und Freibäder</p>".into();
        builder.add_category(record, Some(Path::new("categories/swimming.yaml")));
        let dir = builder.finish();

        assert_eq!(dir.categories().len(), 1);
        let swimming = &dir.categories()[0];
        assert_eq!(swimming.name, "Schwimmbad");
        assert!(!swimming.is_implicit());
        assert_eq!(swimming.venues.len(), 1);
    }

    #[test]
    fn test_duplicate_declaration_keeps_first() {
        let mut builder = DirectoryBuilder::new();
        let first = builder.add_category(CategoryRecord::new("gym", "Gym"), None);
        let second = builder.add_category(CategoryRecord::new("GYM", "Fitness"), None);
        assert_eq!(first, second);
        let dir = builder.finish();
        assert_eq!(dir.categories().len(), 1);
        assert_eq!(dir.categories()[0].name, "Gym");
    }

    #[test]
    fn test_bad_coordinates_are_not_fatal() {
        let mut builder = DirectoryBuilder::new();
        builder.add_venue(
            VenueRecord::new("Nowhere", "Park").with_coordinates("somewhere"),
            Some(Path::new("venues/nowhere.yaml")),
        );
        let dir = builder.finish();

        let venue = &dir.venues()[0];
        assert_eq!(venue.coordinates, GeoPoint::INVALID);
        assert!(!venue.has_location());

        let diags = dir.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "venue.coordinates");
        assert_eq!(diags[0].venue_slug.as_deref(), Some("venue/nowhere"));
        assert_eq!(diags[0].source_path.as_deref(), Some("venues/nowhere.yaml"));
    }

    #[test]
    fn test_venue_tags_sorted_and_remapped() {
        let mut builder = DirectoryBuilder::new();
        builder.add_venue(
            VenueRecord::new("Gamma", "Gym").with_tags(["Zumba", "Aerobic", "Sauna", "zumba"]),
            None,
        );
        builder.add_venue(VenueRecord::new("Delta", "Gym").with_tags(["Boxen"]), None);
        let dir = builder.finish();

        let gamma = dir.find_venue("venue/gamma").unwrap();
        let tag_slugs: Vec<String> = dir.tags_of(gamma).map(Label::slug).collect();
        assert_eq!(tag_slugs, vec!["tag/aerobic", "tag/sauna", "tag/zumba"]);

        assert_eq!(
            slugs(dir.tags()),
            vec!["tag/aerobic", "tag/boxen", "tag/sauna", "tag/zumba"]
        );
        for tag in dir.tags() {
            for venue in dir.venues_of(tag) {
                assert!(dir.tags_of(venue).any(|t| t == tag));
            }
        }
    }

    #[test]
    fn test_duplicate_venue_slugs_keep_input_order() {
        let mut builder = DirectoryBuilder::new();
        let mut first = VenueRecord::new("Same Name", "Gym");
        first.address = "first".into();
        let mut second = VenueRecord::new("same name", "Gym");
        second.address = "second".into();
        builder.add_venue(first, None);
        builder.add_venue(second, None);
        let dir = builder.finish();

        let addresses: Vec<&str> = dir.venues().iter().map(|v| v.address.as_str()).collect();
        assert_eq!(addresses, vec!["first", "second"]);
        let gym = &dir.categories()[0];
        let in_category: Vec<&str> = dir
            .venues_of(gym)
            .map(|v| v.address.as_str())
            .collect();
        assert_eq!(in_category, vec!["first", "second"]);
    }

    #[test]
    fn test_venues_near() {
        let mut builder = DirectoryBuilder::new();
        builder.add_venue(
            VenueRecord::new("Center", "Gym").with_coordinates("47.9960, 7.8494"),
            None,
        );
        builder.add_venue(
            VenueRecord::new("Basel", "Gym").with_coordinates("47.5596, 7.5886"),
            None,
        );
        builder.add_venue(VenueRecord::new("Unknown", "Gym"), None);
        let dir = builder.finish();

        let origin = GeoPoint::new(47.9990, 7.8421);
        let near: Vec<&str> = dir
            .venues_near(&origin, 10.0)
            .into_iter()
            .map(|(v, _)| v.name.as_str())
            .collect();
        assert_eq!(near, vec!["Center"]);

        let all = dir.venues_near(&origin, 100.0);
        assert_eq!(all.len(), 2);
        assert!(all[0].1 <= all[1].1);

        assert!(dir.venues_near(&GeoPoint::INVALID, 1e9).is_empty());
    }

    #[test]
    fn test_to_json_contains_slugs_and_ids() {
        let mut builder = DirectoryBuilder::new();
        builder.add_venue(VenueRecord::new("Alpha", "Gym").with_tags(["Yoga"]), None);
        let json = builder.finish().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["venues"][0]["name"], "Alpha");
        assert_eq!(value["categories"]["labels"][0]["id"], "gym");
        assert_eq!(value["tags"]["labels"][0]["venues"][0], 0);
    }
}
