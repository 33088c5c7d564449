use crate::entities::client;
use crate::services::clients::{CreateClientInput, UpdateClientInput};
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Json, Path, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientResponse {
    pub id: Uuid,
    pub legal_name: String,
    pub tax_id: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<client::Model> for ClientResponse {
    fn from(model: client::Model) -> Self {
        Self {
            id: model.id,
            legal_name: model.legal_name,
            tax_id: model.tax_id,
            contact_name: model.contact_name,
            phone: model.phone,
            email: model.email,
            active: model.active,
            created_at: model.created_at,
        }
    }
}

/// Create the clients router
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:id",
            get(get_client).put(update_client).delete(deactivate_client),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/clients",
    responses((status = 200, description = "Active clients ordered by legal name")),
    tag = "clients"
)]
pub async fn list_clients(State(state): State<AppState>) -> ApiResult<Vec<ClientResponse>> {
    let clients = state.services.clients.list().await?;
    Ok(Json(ApiResponse::success(
        clients.into_iter().map(ClientResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = CreateClientInput,
    responses(
        (status = 200, description = "Client created", body = ClientResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    Json(input): Json<CreateClientInput>,
) -> ApiResult<ClientResponse> {
    let created = state.services.clients.create(input).await?;
    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    responses(
        (status = 200, description = "Client detail", body = ClientResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse)
    ),
    tag = "clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ClientResponse> {
    let found = state
        .services
        .clients
        .get(id)
        .await?
        .ok_or_else(|| crate::errors::ServiceError::NotFound(format!("Client {} not found", id)))?;
    Ok(Json(ApiResponse::success(found.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}",
    request_body = UpdateClientInput,
    responses(
        (status = 200, description = "Client updated", body = ClientResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse)
    ),
    tag = "clients"
)]
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateClientInput>,
) -> ApiResult<ClientResponse> {
    let updated = state.services.clients.update(id, input).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    responses(
        (status = 200, description = "Client deactivated"),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse)
    ),
    tag = "clients"
)]
pub async fn deactivate_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.clients.deactivate(id).await?;
    Ok(Json(ApiResponse::success(())))
}
