use crate::model::JSON_API_VERSION;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

/// Ordered `name -> url` link object (`links` at any level)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Links(Vec<(String, String)>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, url: impl Into<String>) -> Self {
        self.insert(name, url);
        self
    }

    /// Insert or replace a link, keeping first-insertion order
    pub fn insert(&mut self, name: &str, url: impl Into<String>) {
        let url = url.into();
        match self.0.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = url,
            None => self.0.push((name.to_string(), url)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, url)| url.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, url)| (name.as_str(), url.as_str()))
    }
}

impl Serialize for Links {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, url) in &self.0 {
            map.serialize_entry(name, url)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

/// Resource linkage of a relationship
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Linkage {
    /// Link-only relationship, no `data` member
    #[default]
    Omitted,
    Null,
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

impl Linkage {
    pub fn is_omitted(&self) -> bool {
        matches!(self, Linkage::Omitted)
    }
}

impl Serialize for Linkage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Linkage::Omitted | Linkage::Null => serializer.serialize_unit(),
            Linkage::One(identifier) => identifier.serialize(serializer),
            Linkage::Many(identifiers) => identifiers.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipObject {
    pub links: Links,
    #[serde(skip_serializing_if = "Linkage::is_omitted")]
    pub data: Linkage,
}

/// Ordered relationships of one resource
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationships(pub Vec<(String, RelationshipObject)>);

impl Relationships {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RelationshipObject> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, relationship)| relationship)
    }
}

impl Serialize for Relationships {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, relationship) in &self.0 {
            map.serialize_entry(name, relationship)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "Relationships::is_empty")]
    pub relationships: Relationships,
    #[serde(skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

impl ResourceObject {
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier {
            resource_type: self.resource_type.clone(),
            id: self.id.clone(),
        }
    }

    /// Keep only the whitelisted attributes and relationships
    pub fn retain_fields(&mut self, fields: &[String]) {
        self.attributes.retain(|key, _| fields.contains(key));
        self.relationships
            .0
            .retain(|(name, _)| fields.contains(name));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    One(ResourceObject),
    Many(Vec<ResourceObject>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonApiObject {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl JsonApiObject {
    pub fn new(meta: Option<Map<String, Value>>) -> Self {
        Self {
            version: JSON_API_VERSION.to_string(),
            meta,
        }
    }
}

/// A JSON:API error object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorObject {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Top-level JSON:API document
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<JsonApiObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
}

impl Document {
    pub fn from_errors(errors: Vec<ErrorObject>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }

    /// True when there is nothing at all to render
    pub fn is_empty(&self) -> bool {
        self.jsonapi.is_none()
            && self.meta.is_none()
            && self.links.is_empty()
            && self.data.is_none()
            && self.included.is_empty()
            && self.errors.is_empty()
            && self.query.is_none()
    }
}
