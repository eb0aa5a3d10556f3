use std::str::FromStr;

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::info;

use domus_sync_core::domus::{DomusClient, DomusConfig};
use domus_sync_core::store::PgListingStore;
use domus_sync_core::sync::{SyncOptions, SyncRunner};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Sync trigger route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/sync", post(run_sync))
}

#[derive(Debug, Serialize)]
struct SyncResponse {
    message: String,
    total_processed: usize,
    pages_fetched: u32,
}

/// Run one full sync pass: page through Domus, upsert every listing.
///
/// Configuration is validated before anything else — no network or database
/// access happens when the token or connection string is missing or the
/// connection string does not parse.
async fn run_sync(State(state): State<AppState>) -> ApiResult<Json<SyncResponse>> {
    let config = state.config();

    let token = config
        .domus_token
        .clone()
        .ok_or_else(|| ApiError::Config("DOMUS_TOKEN is not set".to_string()))?;
    let database_url = config
        .database_url
        .clone()
        .ok_or_else(|| ApiError::Config("DATABASE_URL is not set".to_string()))?;
    let connect_options = PgConnectOptions::from_str(&database_url)
        .map_err(|err| ApiError::Config(format!("invalid DATABASE_URL: {err}")))?;

    // The client must request exactly the page size the runner checks for
    // its short-page termination, so the options drive both.
    let options = SyncOptions::default();
    let source = DomusClient::new(DomusConfig {
        base_url: config.domus_api_base.clone(),
        token,
        page_size: options.page_size,
        ..DomusConfig::default()
    })
    .map_err(|err| ApiError::Internal(format!("failed to build HTTP client: {err}")))?;

    // One run is strictly sequential, so a single lazily-opened connection is
    // enough; it is checked out per page-transaction and dropped with the
    // pool when the run ends.
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy_with(connect_options);
    let store = PgListingStore::new(pool);

    info!("starting listing sync run");
    let report = SyncRunner::new(source, store, options).run().await?;
    info!(
        total_processed = report.total_processed,
        pages_fetched = report.pages_fetched,
        "listing sync run finished"
    );

    Ok(Json(SyncResponse {
        message: "listing sync completed".to_string(),
        total_processed: report.total_processed,
        pages_fetched: report.pages_fetched,
    }))
}
