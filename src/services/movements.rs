//! Movement protocol: relocating an active pallet from its occupied slot
//! to a free one, atomically, with an immutable audit row.

use crate::{
    db::DbPool,
    entities::{movement, pallet, rack, slot},
    errors::{Precondition, ServiceError},
    events::{Event, EventSender},
    services::{locations, pallets},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

const DEFAULT_HISTORY_LIMIT: u64 = 100;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MovePalletInput {
    pub pallet_id: Uuid,
    pub destination_slot_id: Uuid,
    pub operator_id: Uuid,
    pub reason: Option<String>,
}

/// Service for relocating pallets between slots within a depot.
#[derive(Clone)]
pub struct MovementService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl MovementService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Moves a pallet to a free slot. Origin release, destination claim,
    /// pallet relocation and the audit row are one atomic unit; on any
    /// failed precondition the transaction rolls back with zero side
    /// effects and the error tells the caller which side was unavailable.
    #[instrument(skip(self, input), fields(pallet_id = %input.pallet_id, destination = %input.destination_slot_id))]
    pub async fn move_pallet(
        &self,
        input: MovePalletInput,
    ) -> Result<movement::Model, ServiceError> {
        let db = &*self.db_pool;
        let MovePalletInput {
            pallet_id,
            destination_slot_id,
            operator_id,
            reason,
        } = input;

        let created = db
            .transaction::<_, movement::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let pallet = pallet::Entity::find_by_id(pallet_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let pallet = match pallet {
                        Some(p) if p.active => p,
                        _ => {
                            return Err(ServiceError::PreconditionFailed(
                                Precondition::PalletUnavailable(pallet_id),
                            ))
                        }
                    };
                    let origin_slot_id = match pallet.slot_id {
                        Some(id) => id,
                        None => {
                            return Err(ServiceError::PreconditionFailed(
                                Precondition::PalletUnavailable(pallet_id),
                            ))
                        }
                    };

                    // Claim the destination first: the guarded Free->Occupied
                    // write is the commit-time check that the slot is still
                    // free. Losing the claim aborts before anything else moved.
                    if !locations::claim(txn, destination_slot_id, pallet_id).await? {
                        return Err(ServiceError::PreconditionFailed(
                            Precondition::SlotUnavailable(destination_slot_id),
                        ));
                    }

                    locations::release(txn, origin_slot_id).await?;
                    pallets::relocate_on(txn, pallet, destination_slot_id).await?;

                    let movement = movement::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        pallet_id: Set(pallet_id),
                        origin_slot_id: Set(origin_slot_id),
                        destination_slot_id: Set(destination_slot_id),
                        operator_id: Set(operator_id),
                        reason: Set(reason),
                        moved_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    Ok(movement)
                })
            })
            .await
            .map_err(ServiceError::from_transaction)?;

        self.event_sender
            .send(Event::PalletMoved {
                pallet_id: created.pallet_id,
                origin_slot_id: created.origin_slot_id,
                destination_slot_id: created.destination_slot_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Recent movements, newest first, optionally scoped to the depot the
    /// origin slot belongs to.
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        depot_id: Option<Uuid>,
        limit: Option<u64>,
    ) -> Result<Vec<movement::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = movement::Entity::find();

        if let Some(depot_id) = depot_id {
            query = query
                .join(JoinType::InnerJoin, movement::Relation::OriginSlot.def())
                .join(JoinType::InnerJoin, slot::Relation::Rack.def())
                .filter(rack::Column::DepotId.eq(depot_id));
        }

        query
            .order_by_desc(movement::Column::MovedAt)
            .limit(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }
}
