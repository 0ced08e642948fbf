use serde::{Deserialize, Serialize};

/// JSON:API version advertised in the top-level `jsonapi` node
pub const JSON_API_VERSION: &str = "1.1";

/// Media type used for every rendered document
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// How member names (types, attribute keys, relationship names) are inflected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inflection {
    /// `national_capitals` -> `national-capitals`
    #[default]
    Dasherize,
    /// `NationalCapitals` -> `national_capitals`
    Underscore,
    /// `national_capitals` -> `nationalCapitals`
    Variable,
    /// Keys are emitted exactly as stored
    None,
}

/// Process mode. Pretty printing is only ever added in `Debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Debug,
    Production,
}

impl Environment {
    pub fn is_debug(&self) -> bool {
        matches!(self, Environment::Debug)
    }
}
