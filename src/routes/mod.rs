//! HTTP route handlers for the Katalog API.
//!
//! - `buch`: criteria search, CRUD with optimistic locking, file attachment
//! - `bike`: simple CRUD with equality filters and image glue
//! - `health`: health check and version endpoints

use axum::{
    routing::{get, patch},
    Router,
};

use crate::state::AppState;

pub mod bike;
pub mod buch;
pub mod health;

/// Builds the API router; layers (tracing, compression, headers) are added by
/// the binary.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/version", get(health::version))
        .route("/rest/buecher", get(buch::get_buecher).post(buch::post_buch))
        .route(
            "/rest/buecher/{id}",
            get(buch::get_buch_by_id).put(buch::put_buch).delete(buch::delete_buch),
        )
        .route(
            "/rest/buecher/{id}/file",
            get(buch::download_buch_file).post(buch::upload_buch_file),
        )
        .route("/rest/bikes", get(bike::list_bikes).post(bike::post_bike))
        .route("/rest/bikes/image", get(bike::get_bike_image).post(bike::upload_bike_image))
        .route("/rest/bikes/{id}", get(bike::get_bike_by_id).put(bike::put_bike))
        .route("/rest/bikes/{id}/price", patch(bike::patch_bike_price))
        .with_state(state)
}
