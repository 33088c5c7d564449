use crate::entities::movement;
use crate::services::movements::MovePalletInput;
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Json, Query, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementResponse {
    pub id: Uuid,
    pub pallet_id: Uuid,
    pub origin_slot_id: Uuid,
    pub destination_slot_id: Uuid,
    pub operator_id: Uuid,
    pub reason: Option<String>,
    pub moved_at: DateTime<Utc>,
}

impl From<movement::Model> for MovementResponse {
    fn from(model: movement::Model) -> Self {
        Self {
            id: model.id,
            pallet_id: model.pallet_id,
            origin_slot_id: model.origin_slot_id,
            destination_slot_id: model.destination_slot_id,
            operator_id: model.operator_id,
            reason: model.reason,
            moved_at: model.moved_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MovementFilters {
    pub depot_id: Option<Uuid>,
    pub limit: Option<u64>,
}

/// Create the movements router
pub fn movement_routes() -> Router<AppState> {
    Router::new().route("/", get(list_movements).post(move_pallet))
}

#[utoipa::path(
    get,
    path = "/api/v1/movements",
    params(MovementFilters),
    responses((status = 200, description = "Recent movements, newest first")),
    tag = "movements"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(filters): Query<MovementFilters>,
) -> ApiResult<Vec<MovementResponse>> {
    let movements = state
        .services
        .movements
        .list_movements(filters.depot_id, filters.limit)
        .await?;
    Ok(Json(ApiResponse::success(
        movements.into_iter().map(MovementResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/movements",
    request_body = MovePalletInput,
    responses(
        (status = 200, description = "Pallet moved", body = MovementResponse),
        (status = 422, description = "Pallet or destination unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn move_pallet(
    State(state): State<AppState>,
    Json(input): Json<MovePalletInput>,
) -> ApiResult<MovementResponse> {
    let created = state.services.movements.move_pallet(input).await?;
    Ok(Json(ApiResponse::success(created.into())))
}
