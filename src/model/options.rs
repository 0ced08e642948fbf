use crate::model::{Environment, Inflection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Emission of the top-level `jsonapi` node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionOption {
    Flag(bool),
    /// Enabled, with the mapping emitted as `jsonapi.meta`
    WithMeta(Map<String, Value>),
}

impl Default for VersionOption {
    fn default() -> Self {
        VersionOption::Flag(false)
    }
}

/// Top-level `meta` payload supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaOption {
    /// `false` suppresses the caller's meta entirely
    Flag(bool),
    Payload(Map<String, Value>),
}

impl Default for MetaOption {
    fn default() -> Self {
        MetaOption::Payload(Map::new())
    }
}

impl MetaOption {
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        match self {
            MetaOption::Payload(map) if !map.is_empty() => Some(map),
            _ => None,
        }
    }
}

/// Base JSON encoding flags, either one integer or a list to OR together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonOptions {
    Bits(u32),
    List(Vec<u32>),
}

impl Default for JsonOptions {
    fn default() -> Self {
        JsonOptions::List(Vec::new())
    }
}

impl JsonOptions {
    pub fn bits(&self) -> u32 {
        match self {
            JsonOptions::Bits(bits) => *bits,
            JsonOptions::List(list) => list.iter().fold(0, |acc, flag| acc | flag),
        }
    }
}

/// Everything that shapes one encode pass. Immutable once handed to the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationOptions {
    /// Prefixed to every relative link
    pub url_prefix: Option<String>,
    pub with_json_api_version: VersionOption,
    pub meta: MetaOption,
    /// Emit links against `full_base_url` instead of relative paths
    pub absolute_links: bool,
    /// Relationship-link style for to-one relationships
    pub json_api_belongs_to_links: bool,
    /// Relationship paths allowed into `included`; empty means every contained path
    pub include: Vec<String>,
    /// Sparse fieldsets keyed by resource type
    pub field_sets: BTreeMap<String, Vec<String>>,
    pub json_options: JsonOptions,
    pub debug_pretty_print: bool,
    pub inflect: Inflection,
    pub environment: Environment,
    pub full_base_url: String,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            url_prefix: None,
            with_json_api_version: VersionOption::default(),
            meta: MetaOption::default(),
            absolute_links: false,
            json_api_belongs_to_links: false,
            include: Vec::new(),
            field_sets: BTreeMap::new(),
            json_options: JsonOptions::default(),
            debug_pretty_print: true,
            inflect: Inflection::Dasherize,
            environment: Environment::Debug,
            full_base_url: "http://localhost".to_string(),
        }
    }
}
