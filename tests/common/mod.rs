// Not every test binary exercises every helper.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use embalse_api::{
    config::AppConfig,
    db,
    entities::{
        pallet,
        slot::{self, SlotStatus},
    },
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::path::PathBuf;
use std::sync::Arc;

/// Helper harness for spinning up an application state backed by a
/// throwaway SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    db_file: PathBuf,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    ///
    /// The pool is limited to a single connection so concurrent service
    /// calls serialize at the store, mirroring a serializable-isolation
    /// backend.
    pub async fn new() -> Self {
        let db_file =
            std::env::temp_dir().join(format!("embalse_test_{}.db", Uuid::new_v4().simple()));

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_file.display()),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), event_sender.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", embalse_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            db_file,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    // --- seeding helpers --------------------------------------------------

    pub async fn create_depot(&self, name: &str) -> Uuid {
        let response = self
            .request(
                Method::POST,
                "/api/v1/depots",
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(response.status(), 200, "depot creation should succeed");
        id_of(body_json(response).await)
    }

    pub async fn create_rack(&self, depot_id: Uuid, code: &str, rows: i32, columns: i32, depth: i32) -> Uuid {
        let response = self
            .request(
                Method::POST,
                &format!("/api/v1/depots/{}/racks", depot_id),
                Some(json!({ "code": code, "rows": rows, "columns": columns, "depth": depth })),
            )
            .await;
        assert_eq!(response.status(), 200, "rack creation should succeed");
        id_of(body_json(response).await)
    }

    pub async fn create_client(&self, legal_name: &str) -> Uuid {
        let response = self
            .request(
                Method::POST,
                "/api/v1/clients",
                Some(json!({ "legal_name": legal_name, "tax_id": "30-00000000-0" })),
            )
            .await;
        assert_eq!(response.status(), 200, "client creation should succeed");
        id_of(body_json(response).await)
    }

    pub async fn create_product(&self, client_id: Uuid, code: &str) -> Uuid {
        let response = self
            .request(
                Method::POST,
                "/api/v1/products",
                Some(json!({
                    "client_id": client_id,
                    "code": code,
                    "description": format!("Product {}", code),
                    "unit_of_measure": "unit",
                })),
            )
            .await;
        assert_eq!(response.status(), 200, "product creation should succeed");
        id_of(body_json(response).await)
    }

    /// Free slot ids of a depot in the ledger's deterministic order.
    pub async fn free_slot_ids(&self, depot_id: Uuid) -> Vec<Uuid> {
        let response = self
            .request(
                Method::GET,
                &format!("/api/v1/depots/{}/slots/free", depot_id),
                None,
            )
            .await;
        assert_eq!(response.status(), 200);
        let body = body_json(response).await;
        body["data"]
            .as_array()
            .expect("free slot listing should be an array")
            .iter()
            .map(|entry| {
                entry["slot"]["id"]
                    .as_str()
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .expect("slot id should be a uuid")
            })
            .collect()
    }

    /// Creates a pending ingress with one line per given slot.
    pub async fn create_ingress(
        &self,
        client_id: Uuid,
        depot_id: Uuid,
        product_id: Uuid,
        operator_id: Uuid,
        slot_ids: &[Uuid],
    ) -> (axum::http::StatusCode, Value) {
        let lines: Vec<Value> = slot_ids
            .iter()
            .enumerate()
            .map(|(i, slot_id)| {
                json!({
                    "product_id": product_id,
                    "lot_code": format!("LOT-{}", i + 1),
                    "quantity": "10",
                    "completeness": "Complete",
                    "slot_id": slot_id,
                })
            })
            .collect();

        let response = self
            .request(
                Method::POST,
                "/api/v1/shipments/ingress",
                Some(json!({
                    "client_id": client_id,
                    "depot_id": depot_id,
                    "origin": "Manual",
                    "document_number": format!("ING-{}", Uuid::new_v4().simple()),
                    "operator_id": operator_id,
                    "lines": lines,
                })),
            )
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn approve_shipment(&self, shipment_id: &str, approver_id: Uuid) -> axum::http::StatusCode {
        self.request(
            Method::POST,
            &format!("/api/v1/shipments/{}/approve", shipment_id),
            Some(json!({ "approver_id": approver_id })),
        )
        .await
        .status()
    }

    pub async fn slot_by_id(&self, slot_id: Uuid) -> slot::Model {
        slot::Entity::find_by_id(slot_id)
            .one(&*self.state.db)
            .await
            .expect("slot query should succeed")
            .expect("slot should exist")
    }

    pub async fn pallet_by_id(&self, pallet_id: Uuid) -> Option<pallet::Model> {
        pallet::Entity::find_by_id(pallet_id)
            .one(&*self.state.db)
            .await
            .expect("pallet query should succeed")
    }

    /// The invariant that keeps the warehouse physically unambiguous: an
    /// occupied or reserved slot is referenced by exactly one active pallet
    /// whose slot reference points back; a free slot is referenced by none.
    pub async fn assert_slot_pallet_agreement(&self) {
        let slots = slot::Entity::find()
            .all(&*self.state.db)
            .await
            .expect("slot scan should succeed");
        let active_pallets = pallet::Entity::find()
            .filter(pallet::Column::Active.eq(true))
            .all(&*self.state.db)
            .await
            .expect("pallet scan should succeed");

        for s in &slots {
            let holders: Vec<_> = active_pallets
                .iter()
                .filter(|p| p.slot_id == Some(s.id))
                .collect();
            match s.status {
                SlotStatus::Free => {
                    assert!(
                        s.pallet_id.is_none(),
                        "free slot {} still carries an occupant reference",
                        s.code
                    );
                    assert!(
                        holders.is_empty(),
                        "free slot {} is referenced by an active pallet",
                        s.code
                    );
                }
                SlotStatus::Reserved | SlotStatus::Occupied => {
                    assert_eq!(
                        holders.len(),
                        1,
                        "slot {} ({:?}) should be held by exactly one active pallet",
                        s.code,
                        s.status
                    );
                    assert_eq!(
                        s.pallet_id,
                        Some(holders[0].id),
                        "slot {} occupant reference disagrees with the pallet's slot reference",
                        s.code
                    );
                }
            }
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
        let _ = std::fs::remove_file(&self.db_file);
    }
}

/// Extract the JSON body of a response.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body should be json")
}

/// Pulls `data.id` out of an ApiResponse body.
pub fn id_of(body: Value) -> Uuid {
    body["data"]["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("response data should carry an id")
}
