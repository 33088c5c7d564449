use crate::entities::{shipment, shipment_line};
use crate::services::shipments::{CreateEgressInput, CreateIngressInput, ShipmentFilters};
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentResponse {
    pub id: Uuid,
    pub shipment_type: String,
    pub origin: String,
    pub document_number: String,
    pub status: String,
    pub client_id: Uuid,
    pub depot_id: Uuid,
    pub operator_id: Uuid,
    pub approver_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<shipment::Model> for ShipmentResponse {
    fn from(model: shipment::Model) -> Self {
        Self {
            id: model.id,
            shipment_type: model.shipment_type.to_string(),
            origin: model.origin.to_string(),
            document_number: model.document_number,
            status: model.status.to_string(),
            client_id: model.client_id,
            depot_id: model.depot_id,
            operator_id: model.operator_id,
            approver_id: model.approver_id,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentLineResponse {
    pub id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub lot_code: String,
    pub quantity: Decimal,
    pub pallet_id: Option<Uuid>,
}

impl From<shipment_line::Model> for ShipmentLineResponse {
    fn from(model: shipment_line::Model) -> Self {
        Self {
            id: model.id,
            position: model.position,
            product_id: model.product_id,
            lot_code: model.lot_code,
            quantity: model.quantity,
            pallet_id: model.pallet_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentDetailResponse {
    pub shipment: ShipmentResponse,
    pub lines: Vec<ShipmentLineResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveShipmentRequest {
    pub approver_id: Uuid,
}

/// Create the shipments router
pub fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shipments))
        .route("/:id", get(get_shipment))
        .route("/ingress", post(create_ingress))
        .route("/egress", post(create_egress))
        .route("/:id/approve", post(approve_shipment))
        .route("/:id/void", post(void_shipment))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments",
    params(ShipmentFilters),
    responses((status = 200, description = "Shipments, newest first")),
    tag = "shipments"
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    Query(filters): Query<ShipmentFilters>,
) -> ApiResult<Vec<ShipmentResponse>> {
    let shipments = state.services.shipments.list(filters).await?;
    Ok(Json(ApiResponse::success(
        shipments.into_iter().map(ShipmentResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments/{id}",
    responses(
        (status = 200, description = "Shipment with its ordered lines", body = ShipmentDetailResponse),
        (status = 404, description = "Shipment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ShipmentDetailResponse> {
    let detail = state.services.shipments.get(id).await?;
    Ok(Json(ApiResponse::success(ShipmentDetailResponse {
        shipment: detail.shipment.into(),
        lines: detail
            .lines
            .into_iter()
            .map(ShipmentLineResponse::from)
            .collect(),
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/shipments/ingress",
    request_body = CreateIngressInput,
    responses(
        (status = 200, description = "Pending ingress created; slots reserved, pallets materialized", body = ShipmentResponse),
        (status = 400, description = "Invalid line", body = crate::errors::ErrorResponse),
        (status = 409, description = "A target slot was not free", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn create_ingress(
    State(state): State<AppState>,
    Json(input): Json<CreateIngressInput>,
) -> ApiResult<ShipmentResponse> {
    let created = state.services.shipments.create_ingress(input).await?;
    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/shipments/egress",
    request_body = CreateEgressInput,
    responses(
        (status = 200, description = "Pending egress created; slots untouched until approval", body = ShipmentResponse)
    ),
    tag = "shipments"
)]
pub async fn create_egress(
    State(state): State<AppState>,
    Json(input): Json<CreateEgressInput>,
) -> ApiResult<ShipmentResponse> {
    let created = state.services.shipments.create_egress(input).await?;
    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/shipments/{id}/approve",
    request_body = ApproveShipmentRequest,
    responses(
        (status = 200, description = "Shipment approved", body = ShipmentResponse),
        (status = 409, description = "Shipment is not pending", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn approve_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApproveShipmentRequest>,
) -> ApiResult<ShipmentResponse> {
    let updated = state
        .services
        .shipments
        .approve(id, request.approver_id)
        .await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/shipments/{id}/void",
    responses(
        (status = 200, description = "Shipment voided", body = ShipmentResponse),
        (status = 409, description = "Shipment is not pending", body = crate::errors::ErrorResponse)
    ),
    tag = "shipments"
)]
pub async fn void_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ShipmentResponse> {
    let updated = state.services.shipments.void(id).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}
