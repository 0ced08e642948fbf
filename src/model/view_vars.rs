use crate::model::{Payload, Record};
use serde_json::Value;

/// Leading character that marks a variable as configuration rather than data
pub const SPECIAL_VAR_MARKER: char = '_';

/// Variable set by the query-log listener; rendered as `query`, never as data
pub const QUERY_LOG_VAR: &str = "queryLog";

/// A single named value handed to the view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewVar {
    Value(Value),
    Records(Payload),
}

impl From<Value> for ViewVar {
    fn from(value: Value) -> Self {
        ViewVar::Value(value)
    }
}

impl From<&str> for ViewVar {
    fn from(value: &str) -> Self {
        ViewVar::Value(Value::String(value.to_string()))
    }
}

impl From<bool> for ViewVar {
    fn from(value: bool) -> Self {
        ViewVar::Value(Value::Bool(value))
    }
}

impl From<Record> for ViewVar {
    fn from(record: Record) -> Self {
        ViewVar::Records(Payload::One(record))
    }
}

impl From<Vec<Record>> for ViewVar {
    fn from(records: Vec<Record>) -> Self {
        ViewVar::Records(Payload::Many(records))
    }
}

impl From<Payload> for ViewVar {
    fn from(payload: Payload) -> Self {
        ViewVar::Records(payload)
    }
}

/// Insertion-ordered bag of view variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewVars {
    entries: Vec<(String, ViewVar)>,
}

impl ViewVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<ViewVar>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a variable; an existing name keeps its position
    pub fn set(&mut self, name: &str, value: impl Into<ViewVar>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ViewVar> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Plain JSON value of a variable, if it holds one
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.get(name) {
            Some(ViewVar::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ViewVar)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
