//! Seeds a demo depot, rack, client and product so a fresh installation
//! has something to look at.

use clap::Parser;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use embalse_api as api;
use embalse_api::services::depots::{CreateDepotInput, CreateRackInput};

#[derive(Parser, Debug)]
#[command(name = "seed-data", about = "Seed demo data into the embalse database")]
struct Args {
    /// Database URL; falls back to the configured one
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut cfg = api::config::load_config()?;
    if let Some(url) = args.database_url {
        cfg.database_url = url;
    }
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    api::db::run_migrations(&db_pool).await?;

    let db_arc = Arc::new(db_pool);
    let (event_tx, event_rx) = mpsc::channel(64);
    let event_sender = api::events::EventSender::new(event_tx);
    tokio::spawn(api::events::process_events(event_rx));

    let services = api::handlers::AppServices::new(db_arc, event_sender);

    let depot = services
        .depots
        .create_depot(CreateDepotInput {
            name: "Depósito Central".to_string(),
            address: Some("Ruta 5 km 12".to_string()),
        })
        .await?;
    info!(depot_id = %depot.id, "seeded depot");

    let rack = services
        .depots
        .create_rack(
            depot.id,
            CreateRackInput {
                code: "RK-A".to_string(),
                rows: 3,
                columns: 5,
                depth: 2,
            },
        )
        .await?;
    info!(rack_id = %rack.id, "seeded rack with 30 slots");

    let client = services
        .clients
        .create(api::services::clients::CreateClientInput {
            legal_name: "Alimentos del Sur S.A.".to_string(),
            tax_id: "30-12345678-9".to_string(),
            contact_name: Some("María Pérez".to_string()),
            phone: None,
            email: Some("compras@alimentosdelsur.example".to_string()),
        })
        .await?;
    info!(client_id = %client.id, "seeded client");

    let product = services
        .products
        .create(api::services::products::CreateProductInput {
            client_id: client.id,
            code: "AZ-001".to_string(),
            description: "Azúcar refinada 25kg".to_string(),
            unit_of_measure: "bolsa".to_string(),
        })
        .await?;
    info!(product_id = %product.id, "seeded product");

    println!("Seed complete: depot {}, rack {}, client {}, product {}",
        depot.id, rack.id, client.id, product.id);

    Ok(())
}
