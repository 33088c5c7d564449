use crate::entities::product;
use crate::errors::ServiceError;
use crate::services::products::{CreateProductInput, UpdateProductInput};
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Json, Path, State},
    routing::get,
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub code: String,
    pub description: String,
    pub unit_of_measure: String,
    pub active: bool,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            client_id: model.client_id,
            code: model.code,
            description: model.description,
            unit_of_measure: model.unit_of_measure,
            active: model.active,
        }
    }
}

/// Create the products router
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product)
                .put(update_product)
                .delete(deactivate_product),
        )
        .route("/by-client/:client_id", get(list_products_by_client))
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses((status = 200, description = "Active products ordered by description")),
    tag = "products"
)]
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<ProductResponse>> {
    let products = state.services.products.list().await?;
    Ok(Json(ApiResponse::success(
        products.into_iter().map(ProductResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/by-client/{client_id}",
    responses((status = 200, description = "Active products of one client")),
    tag = "products"
)]
pub async fn list_products_by_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> ApiResult<Vec<ProductResponse>> {
    let products = state.services.products.list_by_client(client_id).await?;
    Ok(Json(ApiResponse::success(
        products.into_iter().map(ProductResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductInput,
    responses(
        (status = 200, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> ApiResult<ProductResponse> {
    let created = state.services.products.create(input).await?;
    Ok(Json(ApiResponse::success(created.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    responses(
        (status = 200, description = "Product detail", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductResponse> {
    let found = state
        .services
        .products
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;
    Ok(Json(ApiResponse::success(found.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> ApiResult<ProductResponse> {
    let updated = state.services.products.update(id, input).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    responses(
        (status = 200, description = "Product deactivated"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn deactivate_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.products.deactivate(id).await?;
    Ok(Json(ApiResponse::success(())))
}
