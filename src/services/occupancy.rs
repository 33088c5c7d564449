//! Capacity accountant: pure read side. Occupancy figures are counted on
//! demand from current slot states and never cached, so they cannot drift
//! from the ledger's truth.

use crate::{
    db::DbPool,
    entities::{
        client, depot, product, rack, shipment,
        slot::{self, SlotStatus},
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Occupancy of one depot at the time of the query.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct OccupancySnapshot {
    pub total: u64,
    pub occupied: u64,
    pub reserved: u64,
    pub free: u64,
    /// Occupied share of total, rounded to the nearest percent.
    pub percentage: u8,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepotOccupancy {
    pub depot_id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub occupancy: OccupancySnapshot,
}

/// Dashboard roll-up across the whole installation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OverviewStats {
    pub depots: Vec<DepotOccupancy>,
    pub active_clients: u64,
    pub active_products: u64,
    pub shipments_today: u64,
}

#[derive(Clone)]
pub struct OccupancyService {
    db_pool: Arc<DbPool>,
}

impl OccupancyService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn occupancy_of(&self, depot_id: Uuid) -> Result<OccupancySnapshot, ServiceError> {
        let db = &*self.db_pool;

        depot::Entity::find_by_id(depot_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Depot {} not found", depot_id)))?;

        self.snapshot(depot_id).await
    }

    #[instrument(skip(self))]
    pub async fn overview(&self) -> Result<OverviewStats, ServiceError> {
        let db = &*self.db_pool;

        let depots = depot::Entity::find()
            .order_by_asc(depot::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut stats = Vec::with_capacity(depots.len());
        for d in depots {
            let occupancy = self.snapshot(d.id).await?;
            stats.push(DepotOccupancy {
                depot_id: d.id,
                name: d.name,
                occupancy,
            });
        }

        let active_clients = client::Entity::find()
            .filter(client::Column::Active.eq(true))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let active_products = product::Entity::find()
            .filter(product::Column::Active.eq(true))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        let today = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or_else(Utc::now);
        let shipments_today = shipment::Entity::find()
            .filter(shipment::Column::CreatedAt.gte(today))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(OverviewStats {
            depots: stats,
            active_clients,
            active_products,
            shipments_today,
        })
    }

    async fn snapshot(&self, depot_id: Uuid) -> Result<OccupancySnapshot, ServiceError> {
        let total = self.count_slots(depot_id, None).await?;
        let occupied = self.count_slots(depot_id, Some(SlotStatus::Occupied)).await?;
        let reserved = self.count_slots(depot_id, Some(SlotStatus::Reserved)).await?;
        let free = total.saturating_sub(occupied).saturating_sub(reserved);

        Ok(OccupancySnapshot {
            total,
            occupied,
            reserved,
            free,
            percentage: percentage(occupied, total),
        })
    }

    async fn count_slots(
        &self,
        depot_id: Uuid,
        status: Option<SlotStatus>,
    ) -> Result<u64, ServiceError> {
        let db = &*self.db_pool;

        let mut query = slot::Entity::find()
            .join(JoinType::InnerJoin, slot::Relation::Rack.def())
            .filter(rack::Column::DepotId.eq(depot_id));
        if let Some(status) = status {
            query = query.filter(slot::Column::Status.eq(status));
        }

        query.count(db).await.map_err(ServiceError::db_error)
    }
}

/// Occupied share of total, rounded to the nearest percent. Empty depots
/// report 0.
fn percentage(occupied: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((occupied as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(0, 30), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(30, 30), 100);
    }
}
