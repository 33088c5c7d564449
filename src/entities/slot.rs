use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Occupancy state of a slot.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SlotStatus {
    #[sea_orm(string_value = "Free")]
    Free,
    #[sea_orm(string_value = "Reserved")]
    Reserved,
    #[sea_orm(string_value = "Occupied")]
    Occupied,
}

/// An addressable storage position within a rack.
///
/// `pallet_id` is the occupant reference: it must be non-null exactly when
/// the status is not `Free`, and the referenced pallet's `slot_id` must
/// point back at this slot after every commit. Both columns are written in
/// the same statement as the status change to keep the agreement.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "slots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub rack_id: Uuid,
    pub row: i32,
    pub column: i32,
    pub depth: i32,
    /// Deterministic code: `"{rackCode}-F{row}-C{column}-P{depth}"`.
    pub code: String,
    pub status: SlotStatus,
    pub pallet_id: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rack::Entity",
        from = "Column::RackId",
        to = "super::rack::Column::Id"
    )]
    Rack,
}

impl Related<super::rack::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rack.def()
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
        } else {
            active_model.updated_at = Set(Some(Utc::now()));
        }

        Ok(active_model)
    }
}
