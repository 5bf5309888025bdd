use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use listwise_core::catalog::{Catalog, CatalogSummary, SourceStatus};
use listwise_store::InventoryStore;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    pub catalog: Arc<Catalog>,
    pub inventory: Arc<InventoryStore>,
    pub sources: Arc<Vec<SourceStatus>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub tables: CatalogSummary,
    pub inventory_records: usize,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(&state.sources);
    let ready = catalog.status == "ready";
    let inventory_records = state.inventory.read().await.len();

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "listwise-server runtime initialized".to_string(),
        },
        catalog,
        tables: state.catalog.summary(),
        inventory_records,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn catalog_check(sources: &[SourceStatus]) -> HealthCheck {
    let unavailable: Vec<&str> =
        sources.iter().filter(|source| !source.is_loaded()).map(|source| source.source).collect();

    if unavailable.is_empty() {
        HealthCheck { status: "ready", detail: format!("{} data sources loaded", sources.len()) }
    } else {
        HealthCheck {
            status: "degraded",
            detail: format!("unavailable data sources: {}", unavailable.join(", ")),
        }
    }
}
