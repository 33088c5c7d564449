//! Product registry. A product belongs to one client; rows are
//! soft-deleted and reads filter on the `active` flag.

use crate::{
    db::DbPool,
    entities::{client, product},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductInput {
    pub client_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(length(min = 1, max = 256))]
    pub description: String,
    #[validate(length(min = 1, max = 16))]
    pub unit_of_measure: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 64))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 256))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub unit_of_measure: Option<String>,
}

#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(&self, input: CreateProductInput) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let owner = client::Entity::find_by_id(input.client_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Client {} not found", input.client_id))
            })?;
        if !owner.active {
            return Err(ServiceError::ValidationError(format!(
                "client {} is inactive",
                owner.id
            )));
        }

        let created = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(input.client_id),
            code: Set(input.code),
            description: Set(input.description),
            unit_of_measure: Set(input.unit_of_measure),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ProductCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let existing = product::Entity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let mut active: product::ActiveModel = existing.into();
        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(unit_of_measure) = input.unit_of_measure {
            active.unit_of_measure = Set(unit_of_measure);
        }

        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// Active products ordered by description.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        product::Entity::find()
            .filter(product::Column::Active.eq(true))
            .order_by_asc(product::Column::Description)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        product::Entity::find()
            .filter(product::Column::ClientId.eq(client_id))
            .filter(product::Column::Active.eq(true))
            .order_by_asc(product::Column::Description)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, product_id: Uuid) -> Result<Option<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        product::Entity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Soft delete: the row stays for pallets and lines referencing it.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let existing = product::Entity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let mut active: product::ActiveModel = existing.into();
        active.active = Set(false);
        active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ProductDeactivated(product_id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }
}
