pub mod clients;
pub mod depots;
pub mod movements;
pub mod pallets;
pub mod products;
pub mod shipments;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub depots: Arc<crate::services::depots::DepotService>,
    pub locations: Arc<crate::services::locations::LocationService>,
    pub pallets: Arc<crate::services::pallets::PalletService>,
    pub movements: Arc<crate::services::movements::MovementService>,
    pub shipments: Arc<crate::services::shipments::ShipmentService>,
    pub occupancy: Arc<crate::services::occupancy::OccupancyService>,
    pub clients: Arc<crate::services::clients::ClientService>,
    pub products: Arc<crate::services::products::ProductService>,
}

impl AppServices {
    /// Build the AppServices container over one shared pool and event
    /// channel.
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        let depots = Arc::new(crate::services::depots::DepotService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let locations = Arc::new(crate::services::locations::LocationService::new(
            db_pool.clone(),
        ));
        let pallets = Arc::new(crate::services::pallets::PalletService::new(db_pool.clone()));
        let movements = Arc::new(crate::services::movements::MovementService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let shipments = Arc::new(crate::services::shipments::ShipmentService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let occupancy = Arc::new(crate::services::occupancy::OccupancyService::new(
            db_pool.clone(),
        ));
        let clients = Arc::new(crate::services::clients::ClientService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let products = Arc::new(crate::services::products::ProductService::new(
            db_pool,
            event_sender,
        ));

        Self {
            depots,
            locations,
            pallets,
            movements,
            shipments,
            occupancy,
            clients,
            products,
        }
    }
}
