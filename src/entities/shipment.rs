use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a shipment document: goods arriving or leaving a depot.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, strum::EnumString, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ShipmentType {
    #[sea_orm(string_value = "Ingress")]
    Ingress,
    #[sea_orm(string_value = "Egress")]
    Egress,
}

/// Where the document originated. The tag is opaque to the engine.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ShipmentOrigin {
    #[sea_orm(string_value = "ExternalSystem")]
    ExternalSystem,
    #[sea_orm(string_value = "Manual")]
    Manual,
}

/// Document state machine: Pending is initial, Approved and Voided are
/// terminal.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, strum::EnumString, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ShipmentStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Voided")]
    Voided,
}

/// A remito: the document recording goods entering or leaving a depot for
/// a client, with its ordered lines.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shipment_type: ShipmentType,
    pub origin: ShipmentOrigin,
    pub document_number: String,
    pub status: ShipmentStatus,
    pub client_id: Uuid,
    pub depot_id: Uuid,
    /// Operator who created the document. Supplied by the caller; the
    /// engine trusts it was already authorized.
    pub operator_id: Uuid,
    /// Operator who approved the document, stamped at approval.
    pub approver_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::depot::Entity",
        from = "Column::DepotId",
        to = "super::depot::Column::Id"
    )]
    Depot,
    #[sea_orm(has_many = "super::shipment_line::Entity")]
    Lines,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::depot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Depot.def()
    }
}

impl Related<super::shipment_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(Utc::now());
            }
        }

        Ok(active_model)
    }
}
