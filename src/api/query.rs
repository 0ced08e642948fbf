use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::Response,
};
use std::collections::{BTreeMap, HashMap};

use crate::api::handlers::error_response;
use crate::model::{EncodeError, PresentationOptions};

/// Default page size when only `page` is given
pub const DEFAULT_PAGE_LIMIT: u64 = 20;

/// JSON:API query parameters of a fetch request
///
/// - `include=currency,cultures.country`
/// - `fields[countries]=name,code`
/// - `page=2&limit=10`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonApiQuery {
    pub include: Vec<String>,
    pub fields: BTreeMap<String, Vec<String>>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl JsonApiQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, EncodeError> {
        let mut query = JsonApiQuery::default();

        for (key, value) in params {
            if key == "include" {
                query.include = split_list(value);
            } else if key == "page" {
                query.page = Some(parse_number(key, value)?);
            } else if key == "limit" {
                query.limit = Some(parse_number(key, value)?);
            } else if let Some(resource_type) = key
                .strip_prefix("fields[")
                .and_then(|rest| rest.strip_suffix(']'))
            {
                query
                    .fields
                    .insert(resource_type.to_string(), split_list(value));
            }
        }

        Ok(query)
    }

    pub fn is_paginated(&self) -> bool {
        self.page.is_some() || self.limit.is_some()
    }

    /// Presentation options for this request, starting from `base`
    pub fn apply(&self, base: &PresentationOptions) -> PresentationOptions {
        let mut options = base.clone();
        if !self.include.is_empty() {
            options.include = self.include.clone();
        }
        options.field_sets.extend(
            self.fields
                .iter()
                .map(|(resource_type, fields)| (resource_type.clone(), fields.clone())),
        );
        options
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_number(name: &str, value: &str) -> Result<u64, EncodeError> {
    value.parse().map_err(|_| EncodeError::InvalidOption {
        name: name.to_string(),
        reason: format!("expected a positive integer, got \"{}\"", value),
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for JsonApiQuery
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                error_response(&EncodeError::InvalidOption {
                    name: "query".to_string(),
                    reason: rejection.body_text(),
                })
            })?;

        JsonApiQuery::from_params(&params).map_err(|e| error_response(&e))
    }
}
