use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable audit row for an internal pallet relocation. Append-only:
/// movement rows are never updated or deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pallet_id: Uuid,
    pub origin_slot_id: Uuid,
    pub destination_slot_id: Uuid,
    pub operator_id: Uuid,
    pub reason: Option<String>,
    pub moved_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pallet::Entity",
        from = "Column::PalletId",
        to = "super::pallet::Column::Id"
    )]
    Pallet,
    #[sea_orm(
        belongs_to = "super::slot::Entity",
        from = "Column::OriginSlotId",
        to = "super::slot::Column::Id"
    )]
    OriginSlot,
    #[sea_orm(
        belongs_to = "super::slot::Entity",
        from = "Column::DestinationSlotId",
        to = "super::slot::Column::Id"
    )]
    DestinationSlot,
}

impl Related<super::pallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pallet.def()
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
            if let ActiveValue::NotSet = active_model.moved_at {
                active_model.moved_at = Set(Utc::now());
            }
        }

        Ok(active_model)
    }
}
