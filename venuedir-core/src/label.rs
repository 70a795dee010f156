//! Categories and tags: named groupings of venues.

use crate::models::Html;
use crate::slug::normalize;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use venuedir_types::{LabelId, LabelKind, VenueId};

/// A category or tag
///
/// `venues` is a back-reference list filled in by the loader; labels never
/// own venues.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub kind: LabelKind,
    /// Normalized identifier, unique within `kind`
    pub id: String,
    /// Display name
    pub name: String,
    /// Alternate names used for search
    pub names: String,
    pub description: Html,
    pub venues: Vec<VenueId>,
    /// Created from a venue reference rather than declared by a record
    pub implicit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl Label {
    /// Label created the first time a venue refers to an unknown name
    ///
    /// The referenced name is used verbatim for display.
    pub fn implicit(kind: LabelKind, raw_name: &str) -> Self {
        let name = raw_name.to_string();
        Self {
            kind,
            id: normalize(raw_name),
            names: name.clone(),
            name,
            description: Html::default(),
            venues: Vec::new(),
            implicit: true,
            source_path: None,
        }
    }

    /// `"{kind}/{id}"`, used as output path and sort key
    pub fn slug(&self) -> String {
        format!("{}/{}", self.kind, self.id)
    }

    pub fn is_implicit(&self) -> bool {
        self.implicit
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.id.hash(state);
    }
}

/// Arena of labels of one kind, indexed by normalized id
#[derive(Debug, Clone, Serialize)]
pub struct LabelRegistry {
    kind: LabelKind,
    labels: Vec<Label>,
    #[serde(skip)]
    index: HashMap<String, LabelId>,
}

impl LabelRegistry {
    pub fn new(kind: LabelKind) -> Self {
        Self {
            kind,
            labels: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn get(&self, id: LabelId) -> Option<&Label> {
        self.labels.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: LabelId) -> Option<&mut Label> {
        self.labels.get_mut(id.index())
    }

    /// Look up by an already-normalized id
    pub fn lookup(&self, id: &str) -> Option<LabelId> {
        self.index.get(id).copied()
    }

    /// Look up by display name; the name is normalized first
    pub fn find(&self, raw_name: &str) -> Option<LabelId> {
        self.lookup(&normalize(raw_name))
    }

    /// Return the label whose id `label.id` matches, inserting `label` if none exists.
    ///
    /// The second value is `true` when a new label was inserted. This is the
    /// only way labels enter a registry, for explicit and implicit labels alike.
    pub fn resolve_or_insert(&mut self, label: Label) -> (LabelId, bool) {
        debug_assert_eq!(label.kind, self.kind);
        if let Some(existing) = self.lookup(&label.id) {
            return (existing, false);
        }
        let id = LabelId::new(self.labels.len());
        self.index.insert(label.id.clone(), id);
        self.labels.push(label);
        (id, true)
    }

    /// Resolve a raw name, creating an implicit label on first sight
    pub fn resolve_or_create(&mut self, raw_name: &str) -> (LabelId, bool) {
        let id = normalize(raw_name);
        if let Some(existing) = self.lookup(&id) {
            return (existing, false);
        }
        self.resolve_or_insert(Label::implicit(self.kind, raw_name))
    }

    /// Reorder labels by ascending slug (stable for equal slugs)
    ///
    /// Returns the remapping table: `remap[old.index()]` is the new id.
    pub(crate) fn sort_by_slug(&mut self) -> Vec<LabelId> {
        let mut indexed: Vec<(usize, String, Label)> = std::mem::take(&mut self.labels)
            .into_iter()
            .enumerate()
            .map(|(i, label)| (i, label.slug(), label))
            .collect();
        indexed.sort_by(|a, b| a.1.cmp(&b.1));

        let mut remap = vec![LabelId::new(0); indexed.len()];
        self.index.clear();
        for (new_index, (old_index, _, label)) in indexed.into_iter().enumerate() {
            remap[old_index] = LabelId::new(new_index);
            self.index.insert(label.id.clone(), LabelId::new(new_index));
            self.labels.push(label);
        }
        remap
    }

    pub(crate) fn labels_mut(&mut self) -> impl Iterator<Item = &mut Label> {
        self.labels.iter_mut()
    }
}
