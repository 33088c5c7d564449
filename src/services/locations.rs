//! Location ledger: the single source of truth for slot state and the
//! slot/pallet association.
//!
//! Every transition is a guarded conditional UPDATE that re-checks the
//! expected current state at commit time, so a writer that lost a race
//! observes a typed error instead of silently overwriting. The occupant
//! reference is written in the same statement as the status change.

use crate::{
    db::DbPool,
    entities::{
        rack,
        slot::{self, SlotStatus},
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// A free slot together with the code of the rack holding it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FreeSlot {
    pub slot: slot::Model,
    pub rack_code: String,
}

/// Read side of the ledger.
#[derive(Clone)]
pub struct LocationService {
    db_pool: Arc<DbPool>,
}

impl LocationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Free slots of a depot (optionally narrowed to one rack), ordered by
    /// rack code, row, column, depth. The ordering is deterministic so the
    /// UI and allocation callers see a reproducible list.
    #[instrument(skip(self))]
    pub async fn find_free(
        &self,
        depot_id: Uuid,
        rack_id: Option<Uuid>,
    ) -> Result<Vec<FreeSlot>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = slot::Entity::find()
            .find_also_related(rack::Entity)
            .filter(slot::Column::Status.eq(SlotStatus::Free))
            .filter(rack::Column::DepotId.eq(depot_id));

        if let Some(rack_id) = rack_id {
            query = query.filter(slot::Column::RackId.eq(rack_id));
        }

        let rows = query
            .order_by_asc(rack::Column::Code)
            .order_by_asc(slot::Column::Row)
            .order_by_asc(slot::Column::Column)
            .order_by_asc(slot::Column::Depth)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|(slot, rack)| {
                rack.map(|rack| FreeSlot {
                    slot,
                    rack_code: rack.code,
                })
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_slot(&self, slot_id: Uuid) -> Result<Option<slot::Model>, ServiceError> {
        let db = &*self.db_pool;
        slot::Entity::find_by_id(slot_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }
}

/// How a transition affects the occupant reference.
#[derive(Debug, Clone, Copy)]
enum OccupantChange {
    Keep,
    Set(Uuid),
    Clear,
}

/// Applies `expected -> next` to one slot if and only if the slot currently
/// holds `expected`. Returns whether the guarded write matched a row.
async fn set_status_if<C>(
    conn: &C,
    slot_id: Uuid,
    expected: SlotStatus,
    next: SlotStatus,
    occupant: OccupantChange,
) -> Result<bool, ServiceError>
where
    C: ConnectionTrait,
{
    let mut update = slot::Entity::update_many()
        .col_expr(slot::Column::Status, Expr::value(next))
        .col_expr(slot::Column::UpdatedAt, Expr::value(Utc::now()));

    match occupant {
        OccupantChange::Keep => {}
        OccupantChange::Set(pallet_id) => {
            update = update.col_expr(slot::Column::PalletId, Expr::value(Some(pallet_id)));
        }
        OccupantChange::Clear => {
            update = update.col_expr(slot::Column::PalletId, Expr::value(Option::<Uuid>::None));
        }
    }

    let result = update
        .filter(slot::Column::Id.eq(slot_id))
        .filter(slot::Column::Status.eq(expected))
        .exec(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(result.rows_affected > 0)
}

/// Free -> Reserved, setting the occupant. Used when an ingress line is
/// created; must run in the same transaction as the pallet insert.
pub(crate) async fn reserve<C>(conn: &C, slot_id: Uuid, pallet_id: Uuid) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    if set_status_if(
        conn,
        slot_id,
        SlotStatus::Free,
        SlotStatus::Reserved,
        OccupantChange::Set(pallet_id),
    )
    .await?
    {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "slot {} is not free",
            slot_id
        )))
    }
}

/// Reserved -> Occupied, keeping the occupant. Used at ingress approval.
pub(crate) async fn occupy<C>(conn: &C, slot_id: Uuid) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    if set_status_if(
        conn,
        slot_id,
        SlotStatus::Reserved,
        SlotStatus::Occupied,
        OccupantChange::Keep,
    )
    .await?
    {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "slot {} is not reserved",
            slot_id
        )))
    }
}

/// Occupied -> Free, clearing the occupant. Used at egress approval and
/// when a movement releases its origin slot.
pub(crate) async fn release<C>(conn: &C, slot_id: Uuid) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    if set_status_if(
        conn,
        slot_id,
        SlotStatus::Occupied,
        SlotStatus::Free,
        OccupantChange::Clear,
    )
    .await?
    {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "slot {} is not occupied",
            slot_id
        )))
    }
}

/// Free -> Occupied: the movement destination claim. Returns whether the
/// claim won; the caller turns a lost claim into its own precondition
/// error.
pub(crate) async fn claim<C>(conn: &C, slot_id: Uuid, pallet_id: Uuid) -> Result<bool, ServiceError>
where
    C: ConnectionTrait,
{
    set_status_if(
        conn,
        slot_id,
        SlotStatus::Free,
        SlotStatus::Occupied,
        OccupantChange::Set(pallet_id),
    )
    .await
}

/// Reserved or Occupied -> Free. Used when a pending ingress is voided and
/// every slot it touched must return to Free regardless of how far the
/// document had progressed. Returns whether a row was updated.
pub(crate) async fn release_any<C>(conn: &C, slot_id: Uuid) -> Result<bool, ServiceError>
where
    C: ConnectionTrait,
{
    let result = slot::Entity::update_many()
        .col_expr(slot::Column::Status, Expr::value(SlotStatus::Free))
        .col_expr(slot::Column::PalletId, Expr::value(Option::<Uuid>::None))
        .col_expr(slot::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(slot::Column::Id.eq(slot_id))
        .filter(slot::Column::Status.is_in([SlotStatus::Reserved, SlotStatus::Occupied]))
        .exec(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(result.rows_affected > 0)
}
