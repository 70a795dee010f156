//! Typed category and venue records decoded from YAML files.

use crate::slug::normalize;
use serde::{de, Deserialize, Deserializer};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {field} normalizes to an empty id: {value:?}")]
    EmptyId { field: &'static str, value: String },
}

/// A category declared in `categories/*.yaml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    /// Raw id; normalized by the loader
    pub id: String,
    pub name: String,
    /// Alternate names used for search
    pub names: String,
    pub description: String,
}

/// A venue declared in `venues/*.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VenueRecord {
    pub name: String,
    pub address: String,
    pub coordinates: String,
    pub description: String,
    pub links: Vec<LinkRecord>,
    pub category: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkRecord {
    #[serde(default)]
    pub title: String,
    pub url: String,
}

#[derive(Deserialize)]
struct RawCategory {
    #[serde(default, deserialize_with = "scalar_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    names: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    description: Option<String>,
}

#[derive(Deserialize)]
struct RawVenue {
    #[serde(default, deserialize_with = "scalar_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    location: RawLocation,
    #[serde(default, deserialize_with = "scalar_string")]
    description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    links: Vec<LinkRecord>,
    #[serde(default, deserialize_with = "scalar_string")]
    category: Option<String>,
    #[serde(default, deserialize_with = "scalar_strings")]
    tags: Vec<String>,
}

#[derive(Deserialize, Default)]
struct RawLocation {
    #[serde(default, deserialize_with = "scalar_string")]
    address: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    coordinates: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept any YAML scalar where a string is expected (`name: 1860`, `coordinates: 47.9`)
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    value.map(scalar_to_string).transpose().map_err(de::Error::custom)
}

fn scalar_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_yaml::Value>>::deserialize(deserializer)?.unwrap_or_default();
    values
        .into_iter()
        .map(scalar_to_string)
        .collect::<Result<Vec<_>, _>>()
        .map_err(de::Error::custom)
}

fn scalar_to_string(value: serde_yaml::Value) -> Result<String, String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok(String::new()),
        other => Err(format!("expected a scalar, found {other:?}")),
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, RecordError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RecordError::MissingField(field)),
    }
}

fn normalizable(value: String, field: &'static str) -> Result<String, RecordError> {
    if normalize(&value).is_empty() {
        return Err(RecordError::EmptyId { field, value });
    }
    Ok(value)
}

impl CategoryRecord {
    /// Decode and validate a category record
    ///
    /// `name` is required; `id` falls back to `name` and `names` to `name`.
    ///
    /// ```
    /// use venuedir_core::records::CategoryRecord;
    ///
    /// let record = CategoryRecord::from_yaml("id: gym\nname: Gym\n").unwrap();
    /// assert_eq!(record.id, "gym");
    /// assert_eq!(record.names, "Gym");
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self, RecordError> {
        let raw: RawCategory = serde_yaml::from_str(content)?;
        let name = required(raw.name, "name")?;
        let id = match raw.id {
            Some(id) if !id.trim().is_empty() => normalizable(id, "id")?,
            _ => normalizable(name.clone(), "name")?,
        };
        let names = raw
            .names
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| name.clone());

        Ok(Self {
            id,
            name,
            names,
            description: raw.description.unwrap_or_default(),
        })
    }

    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            names: name.clone(),
            name,
            description: String::new(),
        }
    }
}

impl VenueRecord {
    /// Decode and validate a venue record
    ///
    /// `name` and `category` are required; everything else defaults to empty.
    pub fn from_yaml(content: &str) -> Result<Self, RecordError> {
        let raw: RawVenue = serde_yaml::from_str(content)?;
        let name = normalizable(required(raw.name, "name")?, "name")?;
        let category = normalizable(required(raw.category, "category")?, "category")?;

        Ok(Self {
            name,
            address: raw.location.address.unwrap_or_default(),
            coordinates: raw.location.coordinates.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            links: raw.links,
            category,
            tags: raw.tags,
        })
    }

    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_coordinates(mut self, coordinates: impl Into<String>) -> Self {
        self.coordinates = coordinates.into();
        self
    }
}
