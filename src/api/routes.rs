use axum::{routing::get, Router};

use crate::api::handlers::{self, AppState};
use crate::store::traits::RecordStore;

pub fn create_router<S: RecordStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Collections, e.g. /countries?include=currency&page=2
        .route("/:table", get(handlers::list_records::<S>))
        // Resource routes, e.g. /countries/1
        .route("/:table/:id", get(handlers::view_record::<S>))
        // Controller/action fallback routes, e.g. /national_capitals/view/1
        .route("/:table/view/:id", get(handlers::view_record::<S>))
}
