use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::query::{JsonApiQuery, DEFAULT_PAGE_LIMIT};
use crate::logic::associations::contain_for_include;
use crate::logic::json_format::{to_json_string, JsonFlags};
use crate::logic::pagination::paginate;
use crate::logic::{JsonApiEncoder, SchemaResolver};
use crate::model::{
    Document, EncodeError, ErrorObject, PresentationOptions, Repository, ViewVars,
    JSON_API_MEDIA_TYPE,
};
use crate::store::traits::{FindQuery, RecordStore};

/// Shared request state: the data-access layer plus one encoder
#[derive(Debug)]
pub struct ViewState<S> {
    pub store: Arc<S>,
    pub encoder: JsonApiEncoder,
    /// Base presentation options every request starts from
    pub options: PresentationOptions,
}

impl<S: RecordStore> ViewState<S> {
    pub fn new(store: Arc<S>, options: PresentationOptions) -> Self {
        let resolver = SchemaResolver::new(store.registry());
        Self {
            store,
            encoder: JsonApiEncoder::new(Arc::new(resolver)),
            options,
        }
    }

    fn repository(&self, table: &str) -> Result<Arc<Repository>, Response> {
        self.store.registry().by_table(table).ok_or_else(|| {
            not_found(format!("No resource collection is exposed at /{}", table))
        })
    }
}

pub type AppState<S> = Arc<ViewState<S>>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

fn json_api_body(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, JSON_API_MEDIA_TYPE)], body).into_response()
}

fn error_document(status: StatusCode, error: ErrorObject) -> Response {
    let document = Document::from_errors(vec![error]);
    match to_json_string(&document, JsonFlags::NONE) {
        Ok(body) => json_api_body(status, body),
        Err(e) => {
            log::error!("Failed to serialize error document: {}", e);
            status.into_response()
        }
    }
}

/// Translate an encode failure into a JSON:API error document
pub fn error_response(error: &EncodeError) -> Response {
    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        log::error!("Failed to render response: {}", error);
    } else {
        log::warn!("Rejected request: {}", error);
    }
    error_document(status, error.to_error_object())
}

fn not_found(detail: String) -> Response {
    error_document(
        StatusCode::NOT_FOUND,
        ErrorObject {
            status: "404".to_string(),
            code: Some("not_found".to_string()),
            title: "Not Found".to_string(),
            detail: Some(detail),
        },
    )
}

fn store_failure(error: anyhow::Error) -> Response {
    log::error!("Store lookup failed: {}", error);
    error_document(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorObject {
            status: "500".to_string(),
            code: Some("store_error".to_string()),
            title: "Internal Server Error".to_string(),
            detail: Some(error.to_string()),
        },
    )
}

fn render<S>(state: &ViewState<S>, vars: &ViewVars, options: &PresentationOptions) -> Response {
    match state.encoder.render_view_vars(vars, options) {
        Ok(Some(body)) => json_api_body(StatusCode::OK, body),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// Contain paths requested through `include`. Unknown relationships are a
/// client error here, not an encode failure.
fn requested_contain<S: RecordStore>(
    state: &ViewState<S>,
    repository: &Repository,
    query: &JsonApiQuery,
    options: &PresentationOptions,
) -> Result<Vec<String>, Response> {
    contain_for_include(
        &state.store.registry(),
        &repository.name,
        &query.include,
        options.inflect,
    )
    .map_err(|e| {
        error_response(&EncodeError::InvalidOption {
            name: "include".to_string(),
            reason: e.to_string(),
        })
    })
}

pub async fn list_records<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(table): Path<String>,
    query: JsonApiQuery,
) -> Result<Response, Response> {
    let repository = state.repository(&table)?;
    let options = query.apply(&state.options);
    let contain = requested_contain(&state, &repository, &query, &options)?;

    let limit = query
        .is_paginated()
        .then(|| query.limit.unwrap_or(DEFAULT_PAGE_LIMIT));
    let find = FindQuery {
        contain: contain.clone(),
        page: query.page,
        limit,
    };
    let found = state
        .store
        .find_all(&repository.name, &find)
        .await
        .map_err(store_failure)?;

    let mut vars = ViewVars::new()
        .with(&repository.table, found.records)
        .with("_contain", json!(contain));

    if let Some(limit) = limit {
        let base_path = format!(
            "{}{}",
            options.url_prefix.as_deref().unwrap_or(""),
            repository.route_style.index_path(&repository.table)
        );
        let pagination = paginate(&base_path, query.page.unwrap_or(1), limit, found.total);
        let pagination = serde_json::to_value(&pagination)
            .map_err(|e| error_response(&EncodeError::from(e)))?;
        vars.set("_pagination", pagination);
    }

    Ok(render(&state, &vars, &options))
}

pub async fn view_record<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path((table, id)): Path<(String, String)>,
    query: JsonApiQuery,
) -> Result<Response, Response> {
    let repository = state.repository(&table)?;
    let options = query.apply(&state.options);
    let contain = requested_contain(&state, &repository, &query, &options)?;

    let record = state
        .store
        .get(&repository.name, &id, &contain)
        .await
        .map_err(store_failure)?
        .ok_or_else(|| {
            not_found(format!(
                "Record not found in table \"{}\" with primary key [{}]",
                repository.table, id
            ))
        })?;

    let vars = ViewVars::new()
        .with(&repository.table, record)
        .with("_contain", json!(contain));

    Ok(render(&state, &vars, &options))
}
