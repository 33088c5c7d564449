use crate::entities::{depot, rack, slot};
use crate::errors::ServiceError;
use crate::services::depots::{CreateDepotInput, CreateRackInput, UpdateDepotInput};
use crate::services::occupancy::{OccupancySnapshot, OverviewStats};
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct DepotResponse {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub total_capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<depot::Model> for DepotResponse {
    fn from(model: depot::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            total_capacity: model.total_capacity,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RackResponse {
    pub id: Uuid,
    pub depot_id: Uuid,
    pub code: String,
    pub rows: i32,
    pub columns: i32,
    pub depth: i32,
}

impl From<rack::Model> for RackResponse {
    fn from(model: rack::Model) -> Self {
        Self {
            id: model.id,
            depot_id: model.depot_id,
            code: model.code,
            rows: model.rows,
            columns: model.columns,
            depth: model.depth,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SlotResponse {
    pub id: Uuid,
    pub rack_id: Uuid,
    pub row: i32,
    pub column: i32,
    pub depth: i32,
    pub code: String,
    pub status: String,
    pub pallet_id: Option<Uuid>,
}

impl From<slot::Model> for SlotResponse {
    fn from(model: slot::Model) -> Self {
        Self {
            id: model.id,
            rack_id: model.rack_id,
            row: model.row,
            column: model.column,
            depth: model.depth,
            code: model.code,
            status: model.status.to_string(),
            pallet_id: model.pallet_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RackDetailResponse {
    pub rack: RackResponse,
    pub slots: Vec<SlotResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepotDetailResponse {
    pub depot: DepotResponse,
    pub racks: Vec<RackDetailResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FreeSlotResponse {
    pub rack_code: String,
    pub slot: SlotResponse,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FreeSlotQuery {
    /// Narrow the listing to one rack.
    pub rack_id: Option<Uuid>,
}

/// Create the depots router
pub fn depot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_depots).post(create_depot))
        .route("/:id", get(get_depot).put(update_depot))
        .route("/:id/occupancy", get(depot_occupancy))
        .route("/:id/slots/free", get(free_slots))
        .route("/:id/racks", post(create_rack))
}

/// Rack deletion lives under its own prefix
pub fn rack_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_rack))
}

#[utoipa::path(
    get,
    path = "/api/v1/depots",
    responses(
        (status = 200, description = "Depot list returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "depots"
)]
pub async fn list_depots(State(state): State<AppState>) -> ApiResult<Vec<DepotResponse>> {
    let depots = state.services.depots.list_depots().await?;
    Ok(Json(ApiResponse::success(
        depots.into_iter().map(DepotResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/depots",
    request_body = CreateDepotInput,
    responses(
        (status = 200, description = "Depot created", body = DepotResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "depots"
)]
pub async fn create_depot(
    State(state): State<AppState>,
    Json(input): Json<CreateDepotInput>,
) -> ApiResult<DepotResponse> {
    let created = state.services.depots.create_depot(input).await?;
    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/depots/{id}",
    responses(
        (status = 200, description = "Depot detail with racks and slots", body = DepotDetailResponse),
        (status = 404, description = "Depot not found", body = crate::errors::ErrorResponse)
    ),
    tag = "depots"
)]
pub async fn get_depot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DepotDetailResponse> {
    let detail = state.services.depots.get_depot(id).await?;
    let response = DepotDetailResponse {
        depot: detail.depot.into(),
        racks: detail
            .racks
            .into_iter()
            .map(|r| RackDetailResponse {
                rack: r.rack.into(),
                slots: r.slots.into_iter().map(SlotResponse::from).collect(),
            })
            .collect(),
    };
    Ok(Json(ApiResponse::success(response)))
}

#[utoipa::path(
    put,
    path = "/api/v1/depots/{id}",
    request_body = UpdateDepotInput,
    responses(
        (status = 200, description = "Depot updated", body = DepotResponse),
        (status = 404, description = "Depot not found", body = crate::errors::ErrorResponse)
    ),
    tag = "depots"
)]
pub async fn update_depot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateDepotInput>,
) -> ApiResult<DepotResponse> {
    let updated = state.services.depots.update_depot(id, input).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/depots/{id}/occupancy",
    responses(
        (status = 200, description = "Occupancy snapshot", body = OccupancySnapshot),
        (status = 404, description = "Depot not found", body = crate::errors::ErrorResponse)
    ),
    tag = "depots"
)]
pub async fn depot_occupancy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OccupancySnapshot> {
    let snapshot = state.services.occupancy.occupancy_of(id).await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

#[utoipa::path(
    get,
    path = "/api/v1/depots/{id}/slots/free",
    params(FreeSlotQuery),
    responses(
        (status = 200, description = "Free slots ordered by rack code and coordinates"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "depots"
)]
pub async fn free_slots(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<FreeSlotQuery>,
) -> ApiResult<Vec<FreeSlotResponse>> {
    let free = state.services.locations.find_free(id, query.rack_id).await?;
    Ok(Json(ApiResponse::success(
        free.into_iter()
            .map(|f| FreeSlotResponse {
                rack_code: f.rack_code,
                slot: f.slot.into(),
            })
            .collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/depots/{id}/racks",
    request_body = CreateRackInput,
    responses(
        (status = 200, description = "Rack and slot grid created", body = RackResponse),
        (status = 400, description = "Dimensions out of range", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate rack code", body = crate::errors::ErrorResponse)
    ),
    tag = "depots"
)]
pub async fn create_rack(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateRackInput>,
) -> ApiResult<RackResponse> {
    let created = state.services.depots.create_rack(id, input).await?;
    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/racks/{id}",
    responses(
        (status = 200, description = "Rack deleted, capacity recomputed"),
        (status = 404, description = "Rack not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Rack has occupied slots", body = crate::errors::ErrorResponse)
    ),
    tag = "depots"
)]
pub async fn delete_rack(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    state.services.depots.delete_rack(id).await?;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    get,
    path = "/api/v1/overview",
    responses(
        (status = 200, description = "Installation-wide occupancy roll-up", body = OverviewStats)
    ),
    tag = "depots"
)]
pub async fn overview(State(state): State<AppState>) -> Result<Json<ApiResponse<OverviewStats>>, ServiceError> {
    let stats = state.services.occupancy.overview().await?;
    Ok(Json(ApiResponse::success(stats)))
}
