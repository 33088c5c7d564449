//! Depot registry and the slot grid generator.
//!
//! Rack creation deterministically materializes the full `rows x columns x
//! depth` grid of free slots; rack deletion is the mirror operation. Both
//! recompute the depot's derived capacity from a COUNT over its slots so
//! the figure self-heals from any prior drift.

use crate::{
    db::DbPool,
    entities::{
        depot, rack,
        slot::{self, SlotStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Deterministic slot code scheme: `"{rackCode}-F{row}-C{column}-P{depth}"`.
fn slot_code(rack_code: &str, row: i32, column: i32, depth: i32) -> String {
    format!("{}-F{}-C{}-P{}", rack_code, row, column, depth)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDepotInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateDepotInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Rack dimensions are policy-bounded; out-of-range values are rejected
/// before any state change.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRackInput {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    #[validate(range(min = 1, max = 10))]
    pub rows: i32,
    #[validate(range(min = 1, max = 20))]
    pub columns: i32,
    #[validate(range(min = 1, max = 10))]
    pub depth: i32,
}

/// A rack and its slots, ordered by coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct RackDetail {
    pub rack: rack::Model,
    pub slots: Vec<slot::Model>,
}

/// A depot with its full rack/slot layout.
#[derive(Debug, Clone, Serialize)]
pub struct DepotDetail {
    pub depot: depot::Model,
    pub racks: Vec<RackDetail>,
}

/// Service for managing depots and their rack structure.
#[derive(Clone)]
pub struct DepotService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl DepotService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_depot(&self, input: CreateDepotInput) -> Result<depot::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let created = depot::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            address: Set(input.address),
            total_capacity: Set(0),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::DepotCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_depot(
        &self,
        depot_id: Uuid,
        input: UpdateDepotInput,
    ) -> Result<depot::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let existing = depot::Entity::find_by_id(depot_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Depot {} not found", depot_id)))?;

        let mut active: depot::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::DepotUpdated(updated.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn list_depots(&self) -> Result<Vec<depot::Model>, ServiceError> {
        let db = &*self.db_pool;
        depot::Entity::find()
            .order_by_asc(depot::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Full layout of one depot: racks by code, slots by coordinates.
    #[instrument(skip(self))]
    pub async fn get_depot(&self, depot_id: Uuid) -> Result<DepotDetail, ServiceError> {
        let db = &*self.db_pool;

        let depot = depot::Entity::find_by_id(depot_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Depot {} not found", depot_id)))?;

        let racks = rack::Entity::find()
            .filter(rack::Column::DepotId.eq(depot_id))
            .order_by_asc(rack::Column::Code)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let slots = slot::Entity::find()
            .join(JoinType::InnerJoin, slot::Relation::Rack.def())
            .filter(rack::Column::DepotId.eq(depot_id))
            .order_by_asc(slot::Column::Row)
            .order_by_asc(slot::Column::Column)
            .order_by_asc(slot::Column::Depth)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut by_rack: HashMap<Uuid, Vec<slot::Model>> = HashMap::new();
        for s in slots {
            by_rack.entry(s.rack_id).or_default().push(s);
        }

        let racks = racks
            .into_iter()
            .map(|rack| {
                let slots = by_rack.remove(&rack.id).unwrap_or_default();
                RackDetail { rack, slots }
            })
            .collect();

        Ok(DepotDetail { depot, racks })
    }

    /// Creates a rack and its entire slot grid atomically, then recomputes
    /// the depot's capacity. Either all slots plus the capacity update are
    /// committed, or none are.
    #[instrument(skip(self, input), fields(depot_id = %depot_id, code = %input.code))]
    pub async fn create_rack(
        &self,
        depot_id: Uuid,
        input: CreateRackInput,
    ) -> Result<rack::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        depot::Entity::find_by_id(depot_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Depot {} not found", depot_id)))?;

        let slot_count = (input.rows * input.columns * input.depth) as u32;

        let created = db
            .transaction::<_, rack::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let duplicates = rack::Entity::find()
                        .filter(rack::Column::DepotId.eq(depot_id))
                        .filter(rack::Column::Code.eq(input.code.clone()))
                        .count(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if duplicates > 0 {
                        return Err(ServiceError::Conflict(format!(
                            "rack code {} already exists in depot {}",
                            input.code, depot_id
                        )));
                    }

                    let rack = rack::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        depot_id: Set(depot_id),
                        code: Set(input.code.clone()),
                        rows: Set(input.rows),
                        columns: Set(input.columns),
                        depth: Set(input.depth),
                        created_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let mut slots =
                        Vec::with_capacity((input.rows * input.columns * input.depth) as usize);
                    for row in 1..=input.rows {
                        for column in 1..=input.columns {
                            for depth in 1..=input.depth {
                                slots.push(slot::ActiveModel {
                                    id: Set(Uuid::new_v4()),
                                    rack_id: Set(rack.id),
                                    row: Set(row),
                                    column: Set(column),
                                    depth: Set(depth),
                                    code: Set(slot_code(&rack.code, row, column, depth)),
                                    status: Set(SlotStatus::Free),
                                    pallet_id: Set(None),
                                    updated_at: Set(None),
                                });
                            }
                        }
                    }

                    slot::Entity::insert_many(slots)
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    recompute_capacity(txn, depot_id).await?;

                    Ok(rack)
                })
            })
            .await
            .map_err(ServiceError::from_transaction)?;

        self.event_sender
            .send(Event::RackCreated {
                rack_id: created.id,
                depot_id,
                slot_count,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Deletes a rack and its slots atomically; refused while any slot is
    /// occupied. Capacity is recomputed on success.
    #[instrument(skip(self))]
    pub async fn delete_rack(&self, rack_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let rack = rack::Entity::find_by_id(rack_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Rack {} not found", rack_id)))?;
        let depot_id = rack.depot_id;

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                let occupied = slot::Entity::find()
                    .filter(slot::Column::RackId.eq(rack_id))
                    .filter(slot::Column::Status.eq(SlotStatus::Occupied))
                    .count(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                if occupied > 0 {
                    return Err(ServiceError::Conflict(format!(
                        "rack {} still holds {} occupied slot(s)",
                        rack_id, occupied
                    )));
                }

                slot::Entity::delete_many()
                    .filter(slot::Column::RackId.eq(rack_id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                rack::Entity::delete_by_id(rack_id)
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                recompute_capacity(txn, depot_id).await?;

                Ok(())
            })
        })
        .await
        .map_err(ServiceError::from_transaction)?;

        self.event_sender
            .send(Event::RackDeleted { rack_id, depot_id })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }
}

/// Recomputes a depot's capacity as the count of all slots across its
/// racks. Runs inside the caller's transaction.
pub(crate) async fn recompute_capacity<C>(conn: &C, depot_id: Uuid) -> Result<i32, ServiceError>
where
    C: ConnectionTrait,
{
    let total = slot::Entity::find()
        .join(JoinType::InnerJoin, slot::Relation::Rack.def())
        .filter(rack::Column::DepotId.eq(depot_id))
        .count(conn)
        .await
        .map_err(ServiceError::db_error)?;

    depot::Entity::update_many()
        .col_expr(depot::Column::TotalCapacity, Expr::value(total as i32))
        .col_expr(depot::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(depot::Column::Id.eq(depot_id))
        .exec(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(total as i32)
}
