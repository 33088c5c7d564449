use crate::entities::pallet;
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct PalletResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub lot_code: String,
    pub quantity: Decimal,
    pub completeness: String,
    pub active: bool,
    pub slot_id: Option<Uuid>,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
}

impl From<pallet::Model> for PalletResponse {
    fn from(model: pallet::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            lot_code: model.lot_code,
            quantity: model.quantity,
            completeness: model.completeness.to_string(),
            active: model.active,
            slot_id: model.slot_id,
            entered_at: model.entered_at,
            exited_at: model.exited_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PalletFilters {
    pub client_id: Option<Uuid>,
    pub depot_id: Option<Uuid>,
}

/// Create the pallets router
pub fn pallet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pallets))
        .route("/:id", get(get_pallet))
}

#[utoipa::path(
    get,
    path = "/api/v1/pallets",
    params(PalletFilters),
    responses((status = 200, description = "Active pallets, newest ingress first")),
    tag = "pallets"
)]
pub async fn list_pallets(
    State(state): State<AppState>,
    Query(filters): Query<PalletFilters>,
) -> ApiResult<Vec<PalletResponse>> {
    let pallets = state
        .services
        .pallets
        .list_active(filters.client_id, filters.depot_id)
        .await?;
    Ok(Json(ApiResponse::success(
        pallets.into_iter().map(PalletResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/pallets/{id}",
    responses(
        (status = 200, description = "Pallet detail", body = PalletResponse),
        (status = 404, description = "Pallet not found", body = crate::errors::ErrorResponse)
    ),
    tag = "pallets"
)]
pub async fn get_pallet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PalletResponse> {
    let found = state
        .services
        .pallets
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Pallet {} not found", id)))?;
    Ok(Json(ApiResponse::success(found.into())))
}
