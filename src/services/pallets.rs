//! Pallet registry: pallet identity, quantity, lot, completeness and the
//! active/inactive lifecycle.
//!
//! The write helpers here run on the caller's transaction: a pallet is
//! never created, deactivated or relocated without the matching ledger
//! transition committing in the same unit, so slot state and pallet state
//! cannot disagree.

use crate::{
    db::DbPool,
    entities::{
        pallet::{self, PalletCompleteness},
        product, rack, slot,
    },
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Service exposing the read side of the registry.
#[derive(Clone)]
pub struct PalletService {
    db_pool: Arc<DbPool>,
}

impl PalletService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, pallet_id: Uuid) -> Result<Option<pallet::Model>, ServiceError> {
        let db = &*self.db_pool;
        pallet::Entity::find_by_id(pallet_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Active pallets, optionally narrowed to one client and/or the depot
    /// they are currently resident in, newest ingress first.
    #[instrument(skip(self))]
    pub async fn list_active(
        &self,
        client_id: Option<Uuid>,
        depot_id: Option<Uuid>,
    ) -> Result<Vec<pallet::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = pallet::Entity::find().filter(pallet::Column::Active.eq(true));

        if let Some(client_id) = client_id {
            query = query
                .join(JoinType::InnerJoin, pallet::Relation::Product.def())
                .filter(product::Column::ClientId.eq(client_id));
        }

        if let Some(depot_id) = depot_id {
            query = query
                .join(JoinType::InnerJoin, pallet::Relation::Slot.def())
                .join(JoinType::InnerJoin, slot::Relation::Rack.def())
                .filter(rack::Column::DepotId.eq(depot_id));
        }

        query
            .order_by_desc(pallet::Column::EnteredAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }
}

/// Attributes of a pallet materialized by an ingress line.
#[derive(Debug, Clone)]
pub(crate) struct NewPallet {
    pub product_id: Uuid,
    pub lot_code: String,
    pub quantity: Decimal,
    pub completeness: PalletCompleteness,
    pub slot_id: Uuid,
}

/// Inserts an active pallet referencing its slot. The caller must reserve
/// or occupy that slot in the same transaction.
pub(crate) async fn create_on<C>(conn: &C, new: NewPallet) -> Result<pallet::Model, ServiceError>
where
    C: ConnectionTrait,
{
    pallet::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(new.product_id),
        lot_code: Set(new.lot_code),
        quantity: Set(new.quantity),
        completeness: Set(new.completeness),
        active: Set(true),
        slot_id: Set(Some(new.slot_id)),
        entered_at: Set(Utc::now()),
        exited_at: Set(None),
    }
    .insert(conn)
    .await
    .map_err(ServiceError::db_error)
}

/// Marks a pallet as having left the warehouse: inactive, egress-stamped,
/// slot reference cleared. The caller must free the slot (if any) in the
/// same transaction.
pub(crate) async fn deactivate_on<C>(
    conn: &C,
    pallet: pallet::Model,
) -> Result<pallet::Model, ServiceError>
where
    C: ConnectionTrait,
{
    let mut active: pallet::ActiveModel = pallet.into();
    active.active = Set(false);
    active.exited_at = Set(Some(Utc::now()));
    active.slot_id = Set(None);
    active.update(conn).await.map_err(ServiceError::db_error)
}

/// Points a pallet at its new slot. The caller must claim the destination
/// and release the origin in the same transaction.
pub(crate) async fn relocate_on<C>(
    conn: &C,
    pallet: pallet::Model,
    new_slot_id: Uuid,
) -> Result<pallet::Model, ServiceError>
where
    C: ConnectionTrait,
{
    let mut active: pallet::ActiveModel = pallet.into();
    active.slot_id = Set(Some(new_slot_id));
    active.update(conn).await.map_err(ServiceError::db_error)
}
