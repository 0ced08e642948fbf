//! Errors raised while turning view data into a document.

use crate::model::ErrorObject;
use thiserror::Error;

/// Every failure aborts the whole encode; no partial document is produced.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The serialize directive (or another view variable) has an unsupported shape.
    #[error("{0}")]
    Configuration(String),

    /// No resource schema can be built for a record.
    #[error("{0}")]
    Schema(String),

    /// A contained association or its target repository cannot be resolved.
    #[error("{0}")]
    AssociationResolution(String),

    /// A special view variable could not be read as the expected type.
    #[error("Invalid value for view variable \"{name}\": {reason}")]
    InvalidOption { name: String, reason: String },

    /// The variable selected as data is neither a record nor a collection.
    #[error("View variable \"{0}\" does not hold a record or a collection of records")]
    UnsupportedData(String),

    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EncodeError>;

impl EncodeError {
    pub fn generic_entity(repository: &str) -> Self {
        EncodeError::Schema(format!(
            "Entity classes must not be the generic \"Entity\" class for repository \"{}\"",
            repository
        ))
    }

    pub fn object_serialize_directive() -> Self {
        EncodeError::Configuration(
            "Assigning an object to JsonApiListener \"_serialize\" is deprecated, assign the object to its own variable and assign \"_serialize\" = true instead."
                .to_string(),
        )
    }

    /// HTTP status the caller should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            EncodeError::Configuration(_)
            | EncodeError::InvalidOption { .. }
            | EncodeError::UnsupportedData(_) => 400,
            EncodeError::Schema(_)
            | EncodeError::AssociationResolution(_)
            | EncodeError::Serialization(_) => 500,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            EncodeError::Configuration(_) => "configuration_error",
            EncodeError::Schema(_) => "schema_error",
            EncodeError::AssociationResolution(_) => "association_resolution_error",
            EncodeError::InvalidOption { .. } => "invalid_option",
            EncodeError::UnsupportedData(_) => "unsupported_data",
            EncodeError::Serialization(_) => "serialization_error",
        }
    }

    pub fn to_error_object(&self) -> ErrorObject {
        let title = match self.status_code() {
            400 => "Bad Request",
            _ => "Internal Server Error",
        };
        ErrorObject {
            status: self.status_code().to_string(),
            code: Some(self.code().to_string()),
            title: title.to_string(),
            detail: Some(self.to_string()),
        }
    }
}
