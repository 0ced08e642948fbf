use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Concrete class of a record as reported by the data-access layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityClass {
    /// A name-bearing entity class (e.g. "Country")
    Named(String),
    /// The generic untyped entity; no resource type can be inferred from it
    Generic,
}

impl EntityClass {
    pub fn is_generic(&self) -> bool {
        matches!(self, EntityClass::Generic)
    }

    pub fn name(&self) -> &str {
        match self {
            EntityClass::Named(name) => name,
            EntityClass::Generic => "Entity",
        }
    }
}

/// A single domain record fetched from a repository, with whatever
/// associations were loaded alongside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Name of the repository the record was fetched from (e.g. "Countries")
    pub source: String,
    pub class: EntityClass,
    /// Column values in column order
    pub fields: Map<String, Value>,
    /// Fields that must never be rendered
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden: Vec<String>,
    /// Loaded associations keyed by association property (e.g. "currency")
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub associated: HashMap<String, Related>,
}

/// Data loaded for one association of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related {
    One(Box<Record>),
    Many(Vec<Record>),
    /// The association was loaded but nothing matched
    Empty,
}

impl Related {
    pub fn records(&self) -> Vec<&Record> {
        match self {
            Related::One(record) => vec![record.as_ref()],
            Related::Many(records) => records.iter().collect(),
            Related::Empty => Vec::new(),
        }
    }
}

impl Record {
    pub fn new(source: impl Into<String>, class: EntityClass) -> Self {
        Self {
            source: source.into(),
            class,
            fields: Map::new(),
            hidden: Vec::new(),
            associated: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_one(mut self, property: impl Into<String>, record: Record) -> Self {
        self.associated
            .insert(property.into(), Related::One(Box::new(record)));
        self
    }

    pub fn with_many(mut self, property: impl Into<String>, records: Vec<Record>) -> Self {
        self.associated.insert(property.into(), Related::Many(records));
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn is_generic(&self) -> bool {
        self.class.is_generic()
    }

    /// Visible fields in column order
    pub fn visible_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields
            .iter()
            .filter(move |(name, _)| !self.hidden.iter().any(|hidden| hidden == *name))
    }
}

/// The value handed to the encoder as primary data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    One(Record),
    Many(Vec<Record>),
}

impl Payload {
    pub fn records(&self) -> Vec<&Record> {
        match self {
            Payload::One(record) => vec![record],
            Payload::Many(records) => records.iter().collect(),
        }
    }

    /// Repository of the primary records; `None` for an empty collection
    pub fn source(&self) -> Option<&str> {
        match self {
            Payload::One(record) => Some(record.source.as_str()),
            Payload::Many(records) => records.first().map(|r| r.source.as_str()),
        }
    }
}

impl From<Record> for Payload {
    fn from(record: Record) -> Self {
        Payload::One(record)
    }
}

impl From<Vec<Record>> for Payload {
    fn from(records: Vec<Record>) -> Self {
        Payload::Many(records)
    }
}
