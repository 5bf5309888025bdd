use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use listwise_core::catalog::Catalog;
use listwise_core::domain::inventory::StoreId;
use listwise_core::domain::list::{ListChange, ListCommand, ListItem, ShoppingList};
use listwise_core::domain::product::ProductId;
use listwise_core::engine::navigation::RoutePlan;
use listwise_core::engine::recommendations::{recommend, Recommendation};
use listwise_core::engine::stock::{StockReport, StockThresholds};
use listwise_core::engine::substitutes::Substitute;
use listwise_core::engine::{ListEvaluation, ListRuntime, ResolvedEvaluation, StoreContext};
use listwise_core::errors::ApplicationError;
use listwise_store::{FulfillmentReport, InventoryStore};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{correlation_id, ApiError};

/// Per-deployment knobs the handlers need, resolved once from config.
#[derive(Clone, Debug)]
pub struct StoreSettings {
    pub default_store_id: StoreId,
    pub thresholds: StockThresholds,
    pub checkout_node: String,
    pub recommendation_limit: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub inventory: Arc<InventoryStore>,
    pub runtime: Arc<dyn ListRuntime>,
    pub settings: Arc<StoreSettings>,
}

impl AppState {
    fn store_id(&self, requested: Option<&str>) -> StoreId {
        match requested.map(str::trim) {
            Some(store_id) if !store_id.is_empty() => StoreId::from(store_id),
            _ => self.settings.default_store_id.clone(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/shopping-list-details", post(shopping_list_details))
        .route("/api/optimize-path", post(optimize_path))
        .route("/api/recommendations", post(recommendations))
        .route("/api/stock/{product_id}", get(stock_status))
        .route("/api/substitutes/{product_id}", get(substitute))
        .route("/api/lists/apply", post(apply_list_command))
        .route("/api/fulfillment", post(fulfill))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ShoppingListRequest {
    #[serde(default)]
    pub shopping_list: Vec<ListItem>,
    #[serde(default)]
    pub store_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OptimizePathRequest {
    #[serde(default)]
    pub shopping_list: Vec<ListItem>,
    #[serde(default)]
    pub start_node: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
pub struct StoreQuery {
    pub store_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub product_id: ProductId,
    pub store_id: StoreId,
    #[serde(flatten)]
    pub report: StockReport,
}

#[derive(Debug, Serialize)]
pub struct SubstituteResponse {
    pub original_product_id: ProductId,
    pub store_id: StoreId,
    pub substitute: Option<Substitute>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyListRequest {
    #[serde(default)]
    pub list: ShoppingList,
    pub command: ListCommand,
    #[serde(default)]
    pub store_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplyListResponse {
    pub list: ShoppingList,
    pub change: ListChange,
    pub resolved: ResolvedEvaluation,
}

#[derive(Debug, Deserialize)]
pub struct FulfillmentRequest {
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn shopping_list_details(
    State(state): State<AppState>,
    Json(request): Json<ShoppingListRequest>,
) -> Result<Json<ListEvaluation>, ApiError> {
    if request.shopping_list.is_empty() {
        return Err(ApiError::bad_request("Shopping list not provided.", correlation_id()));
    }

    let store_id = state.store_id(request.store_id.as_deref());
    let inventory = state.inventory.read().await;
    let context =
        StoreContext::new(&state.catalog, &inventory, state.settings.thresholds, &store_id);
    let evaluation = state.runtime.evaluate_list(&context, &request.shopping_list);

    info!(
        event_name = "api.list_details",
        store_id = %store_id,
        lines = evaluation.lines.len(),
        total = %evaluation.pricing.total_after_discount,
        "shopping list evaluated"
    );
    Ok(Json(evaluation))
}

async fn optimize_path(
    State(state): State<AppState>,
    Json(request): Json<OptimizePathRequest>,
) -> Result<Json<RoutePlan>, ApiError> {
    if request.shopping_list.is_empty() {
        return Err(ApiError::bad_request("Shopping list not provided.", correlation_id()));
    }

    let start_node = match request.start_node.as_deref().map(str::trim) {
        Some(node) if !node.is_empty() => node.to_string(),
        _ => state.catalog.graph().entry_point().to_string(),
    };
    let plan = state.runtime.plan_route(
        &state.catalog,
        &request.shopping_list,
        &start_node,
        &state.settings.checkout_node,
    );

    info!(
        event_name = "api.path_optimized",
        start_node = %plan.start_node,
        stops = plan.stops.len(),
        unrouted = plan.unrouted.len(),
        "pickup route planned"
    );
    Ok(Json(plan))
}

async fn recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> Json<RecommendationResponse> {
    let recommendations =
        recommend(&state.catalog, &request.product_ids, state.settings.recommendation_limit);
    Json(RecommendationResponse { recommendations })
}

async fn stock_status(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(query): Query<StoreQuery>,
) -> Json<StockResponse> {
    let product_id = ProductId(product_id);
    let store_id = state.store_id(query.store_id.as_deref());
    let inventory = state.inventory.read().await;
    let context =
        StoreContext::new(&state.catalog, &inventory, state.settings.thresholds, &store_id);
    let report = context.stock_status(&product_id);

    Json(StockResponse { product_id, store_id, report })
}

async fn substitute(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(query): Query<StoreQuery>,
) -> Json<SubstituteResponse> {
    let product_id = ProductId(product_id);
    let store_id = state.store_id(query.store_id.as_deref());
    let inventory = state.inventory.read().await;
    let context =
        StoreContext::new(&state.catalog, &inventory, state.settings.thresholds, &store_id);
    let substitute = state.runtime.find_substitute(&context, &product_id);

    Json(SubstituteResponse { original_product_id: product_id, store_id, substitute })
}

async fn apply_list_command(
    State(state): State<AppState>,
    Json(request): Json<ApplyListRequest>,
) -> Result<Json<ApplyListResponse>, ApiError> {
    let ApplyListRequest { mut list, command, store_id } = request;
    let change = list.apply(&command).map_err(|error| {
        ApiError::from_application(ApplicationError::from(error), correlation_id())
    })?;

    let store_id = state.store_id(store_id.as_deref());
    let inventory = state.inventory.read().await;
    let context =
        StoreContext::new(&state.catalog, &inventory, state.settings.thresholds, &store_id);
    let resolved = state.runtime.resolve_list(&context, &list.items);

    info!(
        event_name = "api.list_command_applied",
        action = %change.action,
        items = list.items.len(),
        kept = resolved.lines.len(),
        "list command applied"
    );
    Ok(Json(ApplyListResponse { list, change, resolved }))
}

async fn fulfill(
    State(state): State<AppState>,
    Json(request): Json<FulfillmentRequest>,
) -> Result<Json<FulfillmentReport>, ApiError> {
    if request.items.is_empty() {
        return Err(ApiError::bad_request("No items to fulfill.", correlation_id()));
    }

    let store_id = state.store_id(request.store_id.as_deref());
    let report = state
        .inventory
        .fulfill(&store_id, &request.items)
        .await
        .map_err(|error| ApiError::from_application(error.into(), correlation_id()))?;

    Ok(Json(report))
}
