mod common;

use assert_matches::assert_matches;
use axum::http::Method;
use common::{body_json, TestApp};
use embalse_api::entities::slot::SlotStatus;
use embalse_api::errors::{Precondition, ServiceError};
use embalse_api::services::movements::MovePalletInput;
use serde_json::json;
use uuid::Uuid;

struct Fixture {
    app: TestApp,
    depot_id: Uuid,
    operator: Uuid,
    /// Slots of the one rack, ledger order.
    slots: Vec<Uuid>,
    /// Pallets resident in the leading slots, one per approved ingress line.
    pallets: Vec<Uuid>,
}

/// One rack of four slots with `occupied` pallets resident in the first
/// slots, the rest free.
async fn fixture(occupied: usize) -> Fixture {
    let app = TestApp::new().await;
    let depot_id = app.create_depot("Central").await;
    app.create_rack(depot_id, "RK1", 1, 4, 1).await;
    let client_id = app.create_client("Cliente SA").await;
    let product_id = app.create_product(client_id, "P-1").await;
    let operator = Uuid::new_v4();

    let slots = app.free_slot_ids(depot_id).await;
    let (status, body) = app
        .create_ingress(client_id, depot_id, product_id, operator, &slots[..occupied])
        .await;
    assert_eq!(status, 200);
    let shipment_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(app.approve_shipment(&shipment_id, operator).await, 200);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/shipments/{}", shipment_id),
            None,
        )
        .await;
    let detail = body_json(response).await;
    let pallets = detail["data"]["lines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| Uuid::parse_str(line["pallet_id"].as_str().unwrap()).unwrap())
        .collect();

    Fixture {
        app,
        depot_id,
        operator,
        slots,
        pallets,
    }
}

#[tokio::test]
async fn moving_a_pallet_swaps_slot_states_and_appends_one_audit_row() {
    let f = fixture(1).await;
    let origin = f.slots[0];
    let destination = f.slots[3];

    let response = f
        .app
        .request(
            Method::POST,
            "/api/v1/movements",
            Some(json!({
                "pallet_id": f.pallets[0],
                "destination_slot_id": destination,
                "operator_id": f.operator,
                "reason": "reorganization",
            })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let origin_slot = f.app.slot_by_id(origin).await;
    assert_eq!(origin_slot.status, SlotStatus::Free);
    assert!(origin_slot.pallet_id.is_none());

    let destination_slot = f.app.slot_by_id(destination).await;
    assert_eq!(destination_slot.status, SlotStatus::Occupied);
    assert_eq!(destination_slot.pallet_id, Some(f.pallets[0]));

    let pallet = f.app.pallet_by_id(f.pallets[0]).await.unwrap();
    assert_eq!(pallet.slot_id, Some(destination));

    let response = f
        .app
        .request(
            Method::GET,
            &format!("/api/v1/movements?depot_id={}", f.depot_id),
            None,
        )
        .await;
    let body = body_json(response).await;
    let movements = body["data"].as_array().unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0]["origin_slot_id"], origin.to_string());
    assert_eq!(movements[0]["destination_slot_id"], destination.to_string());
    assert_eq!(movements[0]["reason"], "reorganization");

    f.app.assert_slot_pallet_agreement().await;
}

#[tokio::test]
async fn moving_to_an_unavailable_slot_changes_nothing() {
    let f = fixture(2).await;

    // Destination is occupied by the second pallet.
    let response = f
        .app
        .request(
            Method::POST,
            "/api/v1/movements",
            Some(json!({
                "pallet_id": f.pallets[0],
                "destination_slot_id": f.slots[1],
                "operator_id": f.operator,
            })),
        )
        .await;
    assert_eq!(response.status(), 422);

    // Zero side effects: both pallets where they were, no audit row.
    assert_eq!(f.app.slot_by_id(f.slots[0]).await.status, SlotStatus::Occupied);
    assert_eq!(f.app.slot_by_id(f.slots[1]).await.status, SlotStatus::Occupied);
    assert_eq!(
        f.app.pallet_by_id(f.pallets[0]).await.unwrap().slot_id,
        Some(f.slots[0])
    );

    let response = f.app.request(Method::GET, "/api/v1/movements", None).await;
    assert!(body_json(response).await["data"]
        .as_array()
        .unwrap()
        .is_empty());
    f.app.assert_slot_pallet_agreement().await;
}

#[tokio::test]
async fn an_inactive_or_unknown_pallet_cannot_be_moved() {
    let f = fixture(1).await;

    // Unknown pallet id.
    let response = f
        .app
        .request(
            Method::POST,
            "/api/v1/movements",
            Some(json!({
                "pallet_id": Uuid::new_v4(),
                "destination_slot_id": f.slots[3],
                "operator_id": f.operator,
            })),
        )
        .await;
    assert_eq!(response.status(), 422);

    // Deactivate the pallet through an approved egress, then try to move it.
    let client_id = f.app.create_client("Otro").await;
    let response = f
        .app
        .request(
            Method::POST,
            "/api/v1/shipments/egress",
            Some(json!({
                "client_id": client_id,
                "depot_id": f.depot_id,
                "origin": "Manual",
                "document_number": "EGR-X",
                "operator_id": f.operator,
                "pallet_ids": [f.pallets[0]],
            })),
        )
        .await;
    let egress_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(f.app.approve_shipment(&egress_id, f.operator).await, 200);

    let response = f
        .app
        .request(
            Method::POST,
            "/api/v1/movements",
            Some(json!({
                "pallet_id": f.pallets[0],
                "destination_slot_id": f.slots[3],
                "operator_id": f.operator,
            })),
        )
        .await;
    assert_eq!(response.status(), 422);
    assert_eq!(f.app.slot_by_id(f.slots[3]).await.status, SlotStatus::Free);
}

#[tokio::test]
async fn concurrent_moves_to_one_destination_have_exactly_one_winner() {
    let f = fixture(2).await;
    let destination = f.slots[3];

    let movements = f.app.state.services.movements.clone();
    let first = movements.move_pallet(MovePalletInput {
        pallet_id: f.pallets[0],
        destination_slot_id: destination,
        operator_id: f.operator,
        reason: None,
    });
    let second = movements.move_pallet(MovePalletInput {
        pallet_id: f.pallets[1],
        destination_slot_id: destination,
        operator_id: f.operator,
        reason: None,
    });

    let (first, second) = tokio::join!(first, second);
    let (winner, loser) = match (first, second) {
        (Ok(m), Err(e)) => (m, e),
        (Err(e), Ok(m)) => (m, e),
        other => panic!("expected exactly one winner, got {:?}", other),
    };

    assert_matches!(
        loser,
        ServiceError::PreconditionFailed(Precondition::SlotUnavailable(id)) if id == destination
    );

    let destination_slot = f.app.slot_by_id(destination).await;
    assert_eq!(destination_slot.status, SlotStatus::Occupied);
    assert_eq!(destination_slot.pallet_id, Some(winner.pallet_id));

    // Exactly one pallet claims the destination; the loser stayed put.
    let loser_pallet_id = if winner.pallet_id == f.pallets[0] {
        f.pallets[1]
    } else {
        f.pallets[0]
    };
    let loser_pallet = f.app.pallet_by_id(loser_pallet_id).await.unwrap();
    assert_ne!(loser_pallet.slot_id, Some(destination));

    f.app.assert_slot_pallet_agreement().await;
}
