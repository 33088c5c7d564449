//! Client registry. Clients are soft-deleted: reads filter on the `active`
//! flag and rows referenced by historical documents are never removed.

use crate::{
    db::DbPool,
    entities::client,
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
pub struct CreateClientInput {
    #[validate(length(min = 1, max = 128))]
    pub legal_name: String,
    #[validate(length(min = 1, max = 32))]
    pub tax_id: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateClientInput {
    #[validate(length(min = 1, max = 128))]
    pub legal_name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub tax_id: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct ClientService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ClientService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input), fields(legal_name = %input.legal_name))]
    pub async fn create(&self, input: CreateClientInput) -> Result<client::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let created = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            legal_name: Set(input.legal_name),
            tax_id: Set(input.tax_id),
            contact_name: Set(input.contact_name),
            phone: Set(input.phone),
            email: Set(input.email),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ClientCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        client_id: Uuid,
        input: UpdateClientInput,
    ) -> Result<client::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let existing = client::Entity::find_by_id(client_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", client_id)))?;

        let mut active: client::ActiveModel = existing.into();
        if let Some(legal_name) = input.legal_name {
            active.legal_name = Set(legal_name);
        }
        if let Some(tax_id) = input.tax_id {
            active.tax_id = Set(tax_id);
        }
        if let Some(contact_name) = input.contact_name {
            active.contact_name = Set(Some(contact_name));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }

        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// Active clients ordered by legal name.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<client::Model>, ServiceError> {
        let db = &*self.db_pool;
        client::Entity::find()
            .filter(client::Column::Active.eq(true))
            .order_by_asc(client::Column::LegalName)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, client_id: Uuid) -> Result<Option<client::Model>, ServiceError> {
        let db = &*self.db_pool;
        client::Entity::find_by_id(client_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Soft delete: the row stays for historical references.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, client_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let existing = client::Entity::find_by_id(client_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", client_id)))?;

        let mut active: client::ActiveModel = existing.into();
        active.active = Set(false);
        active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ClientDeactivated(client_id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }
}
