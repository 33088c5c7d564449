mod common;

use axum::http::Method;
use common::{body_json, TestApp};
use embalse_api::entities::slot::SlotStatus;
use serde_json::json;
use uuid::Uuid;

struct Fixture {
    app: TestApp,
    depot_id: Uuid,
    client_id: Uuid,
    product_id: Uuid,
    operator: Uuid,
}

async fn fixture() -> Fixture {
    let app = TestApp::new().await;
    let depot_id = app.create_depot("Central").await;
    app.create_rack(depot_id, "RK1", 2, 3, 1).await;
    let client_id = app.create_client("Cliente SA").await;
    let product_id = app.create_product(client_id, "P-1").await;
    Fixture {
        app,
        depot_id,
        client_id,
        product_id,
        operator: Uuid::new_v4(),
    }
}

impl Fixture {
    async fn pallet_ids_of(&self, shipment_id: &str) -> Vec<Uuid> {
        let response = self
            .app
            .request(
                Method::GET,
                &format!("/api/v1/shipments/{}", shipment_id),
                None,
            )
            .await;
        let body = body_json(response).await;
        body["data"]["lines"]
            .as_array()
            .unwrap()
            .iter()
            .map(|line| Uuid::parse_str(line["pallet_id"].as_str().unwrap()).unwrap())
            .collect()
    }
}

#[tokio::test]
async fn ingress_creation_reserves_slots_and_materializes_pallets() {
    let f = fixture().await;
    let slots = f.app.free_slot_ids(f.depot_id).await;

    let (status, body) = f
        .app
        .create_ingress(f.client_id, f.depot_id, f.product_id, f.operator, &slots[..2])
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "Pending");
    assert_eq!(body["data"]["shipment_type"], "Ingress");
    let shipment_id = body["data"]["id"].as_str().unwrap().to_string();

    for slot_id in &slots[..2] {
        let slot = f.app.slot_by_id(*slot_id).await;
        assert_eq!(slot.status, SlotStatus::Reserved);
        assert!(slot.pallet_id.is_some());
    }

    let pallets = f.pallet_ids_of(&shipment_id).await;
    assert_eq!(pallets.len(), 2);
    for pallet_id in pallets {
        let pallet = f.app.pallet_by_id(pallet_id).await.expect("pallet exists");
        assert!(pallet.active);
        assert!(pallet.slot_id.is_some());
        assert!(pallet.exited_at.is_none());
    }

    f.app.assert_slot_pallet_agreement().await;
}

#[tokio::test]
async fn ingress_creation_aborts_whole_document_when_a_slot_is_taken() {
    let f = fixture().await;
    let slots = f.app.free_slot_ids(f.depot_id).await;

    // First document reserves slot 0.
    let (status, _) = f
        .app
        .create_ingress(f.client_id, f.depot_id, f.product_id, f.operator, &slots[..1])
        .await;
    assert_eq!(status, 200);

    // Second document wants slots 0 and 1; slot 0 is reserved, so the whole
    // creation aborts and slot 1 stays free.
    let (status, _) = f
        .app
        .create_ingress(
            f.client_id,
            f.depot_id,
            f.product_id,
            f.operator,
            &[slots[0], slots[1]],
        )
        .await;
    assert_eq!(status, 409);

    assert_eq!(f.app.slot_by_id(slots[1]).await.status, SlotStatus::Free);

    let response = f.app.request(Method::GET, "/api/v1/shipments", None).await;
    let body = body_json(response).await;
    assert_eq!(
        body["data"].as_array().unwrap().len(),
        1,
        "aborted creation must not leave a document behind"
    );
    f.app.assert_slot_pallet_agreement().await;
}

#[tokio::test]
async fn ingress_lines_with_bad_quantities_are_rejected_up_front() {
    let f = fixture().await;
    let slots = f.app.free_slot_ids(f.depot_id).await;

    let response = f
        .app
        .request(
            Method::POST,
            "/api/v1/shipments/ingress",
            Some(json!({
                "client_id": f.client_id,
                "depot_id": f.depot_id,
                "origin": "Manual",
                "document_number": "ING-BAD",
                "operator_id": f.operator,
                "lines": [{
                    "product_id": f.product_id,
                    "lot_code": "L-1",
                    "quantity": "0",
                    "completeness": "Complete",
                    "slot_id": slots[0],
                }],
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(f.app.slot_by_id(slots[0]).await.status, SlotStatus::Free);
}

#[tokio::test]
async fn ingress_approval_occupies_every_reserved_slot() {
    let f = fixture().await;
    let slots = f.app.free_slot_ids(f.depot_id).await;

    let (_, body) = f
        .app
        .create_ingress(f.client_id, f.depot_id, f.product_id, f.operator, &slots[..3])
        .await;
    let shipment_id = body["data"]["id"].as_str().unwrap().to_string();

    let approver = Uuid::new_v4();
    assert_eq!(f.app.approve_shipment(&shipment_id, approver).await, 200);

    for slot_id in &slots[..3] {
        assert_eq!(f.app.slot_by_id(*slot_id).await.status, SlotStatus::Occupied);
    }

    let response = f
        .app
        .request(
            Method::GET,
            &format!("/api/v1/shipments/{}", shipment_id),
            None,
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["shipment"]["status"], "Approved");
    assert_eq!(
        body["data"]["shipment"]["approver_id"],
        approver.to_string()
    );

    // Approving again is an invalid state transition and changes nothing.
    assert_eq!(f.app.approve_shipment(&shipment_id, approver).await, 409);
    for slot_id in &slots[..3] {
        assert_eq!(f.app.slot_by_id(*slot_id).await.status, SlotStatus::Occupied);
    }
    f.app.assert_slot_pallet_agreement().await;
}

#[tokio::test]
async fn voiding_a_pending_ingress_erases_its_pallets_and_frees_slots() {
    let f = fixture().await;
    let slots = f.app.free_slot_ids(f.depot_id).await;

    let (_, body) = f
        .app
        .create_ingress(f.client_id, f.depot_id, f.product_id, f.operator, &slots[..2])
        .await;
    let shipment_id = body["data"]["id"].as_str().unwrap().to_string();
    let pallets = f.pallet_ids_of(&shipment_id).await;

    let response = f
        .app
        .request(
            Method::POST,
            &format!("/api/v1/shipments/{}/void", shipment_id),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);

    // The ingress never happened: no pallet trace, slots back to free,
    // structure untouched.
    for pallet_id in pallets {
        assert!(f.app.pallet_by_id(pallet_id).await.is_none());
    }
    for slot_id in &slots[..2] {
        let slot = f.app.slot_by_id(*slot_id).await;
        assert_eq!(slot.status, SlotStatus::Free);
        assert!(slot.pallet_id.is_none());
    }
    let response = f
        .app
        .request(Method::GET, &format!("/api/v1/depots/{}", f.depot_id), None)
        .await;
    assert_eq!(body_json(response).await["data"]["depot"]["total_capacity"], 6);
    f.app.assert_slot_pallet_agreement().await;
}

#[tokio::test]
async fn voiding_requires_a_pending_document() {
    let f = fixture().await;
    let slots = f.app.free_slot_ids(f.depot_id).await;

    let (_, body) = f
        .app
        .create_ingress(f.client_id, f.depot_id, f.product_id, f.operator, &slots[..1])
        .await;
    let shipment_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(f.app.approve_shipment(&shipment_id, f.operator).await, 200);

    let response = f
        .app
        .request(
            Method::POST,
            &format!("/api/v1/shipments/{}/void", shipment_id),
            None,
        )
        .await;
    assert_eq!(response.status(), 409);
    assert_eq!(f.app.slot_by_id(slots[0]).await.status, SlotStatus::Occupied);
}

#[tokio::test]
async fn egress_flow_frees_slots_and_deactivates_pallets_only_at_approval() {
    let f = fixture().await;
    let slots = f.app.free_slot_ids(f.depot_id).await;

    let (_, body) = f
        .app
        .create_ingress(f.client_id, f.depot_id, f.product_id, f.operator, &slots[..2])
        .await;
    let ingress_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(f.app.approve_shipment(&ingress_id, f.operator).await, 200);
    let pallets = f.pallet_ids_of(&ingress_id).await;

    // Unknown ids are skipped leniently; real pallets get one line each.
    let ghost = Uuid::new_v4();
    let response = f
        .app
        .request(
            Method::POST,
            "/api/v1/shipments/egress",
            Some(json!({
                "client_id": f.client_id,
                "depot_id": f.depot_id,
                "origin": "ExternalSystem",
                "document_number": "EGR-1",
                "operator_id": f.operator,
                "pallet_ids": [pallets[0], ghost, pallets[1]],
            })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    let egress_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = f
        .app
        .request(
            Method::GET,
            &format!("/api/v1/shipments/{}", egress_id),
            None,
        )
        .await;
    let detail = body_json(response).await;
    let lines = detail["data"]["lines"].as_array().unwrap().clone();
    assert_eq!(lines.len(), 2, "the ghost pallet id must be skipped");
    assert!(lines.iter().all(|l| l["lot_code"].as_str().unwrap().starts_with("LOT-")));

    // Creation does not touch slot state.
    for slot_id in &slots[..2] {
        assert_eq!(f.app.slot_by_id(*slot_id).await.status, SlotStatus::Occupied);
    }

    let approver = Uuid::new_v4();
    assert_eq!(f.app.approve_shipment(&egress_id, approver).await, 200);

    for slot_id in &slots[..2] {
        let slot = f.app.slot_by_id(*slot_id).await;
        assert_eq!(slot.status, SlotStatus::Free);
        assert!(slot.pallet_id.is_none());
    }
    for pallet_id in &pallets {
        let pallet = f.app.pallet_by_id(*pallet_id).await.expect("still recorded");
        assert!(!pallet.active);
        assert!(pallet.exited_at.is_some());
        assert!(pallet.slot_id.is_none());
    }
    f.app.assert_slot_pallet_agreement().await;
}

#[tokio::test]
async fn voiding_a_pending_egress_only_flips_the_document() {
    let f = fixture().await;
    let slots = f.app.free_slot_ids(f.depot_id).await;

    let (_, body) = f
        .app
        .create_ingress(f.client_id, f.depot_id, f.product_id, f.operator, &slots[..1])
        .await;
    let ingress_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(f.app.approve_shipment(&ingress_id, f.operator).await, 200);
    let pallets = f.pallet_ids_of(&ingress_id).await;

    let response = f
        .app
        .request(
            Method::POST,
            "/api/v1/shipments/egress",
            Some(json!({
                "client_id": f.client_id,
                "depot_id": f.depot_id,
                "origin": "Manual",
                "document_number": "EGR-2",
                "operator_id": f.operator,
                "pallet_ids": [pallets[0]],
            })),
        )
        .await;
    let egress_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = f
        .app
        .request(
            Method::POST,
            &format!("/api/v1/shipments/{}/void", egress_id),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "Voided");

    // Egress never reserved anything, so there is nothing physical to undo.
    assert_eq!(f.app.slot_by_id(slots[0]).await.status, SlotStatus::Occupied);
    let pallet = f.app.pallet_by_id(pallets[0]).await.unwrap();
    assert!(pallet.active);
    f.app.assert_slot_pallet_agreement().await;
}

#[tokio::test]
async fn shipment_listing_filters_by_type_and_status() {
    let f = fixture().await;
    let slots = f.app.free_slot_ids(f.depot_id).await;

    let (_, body) = f
        .app
        .create_ingress(f.client_id, f.depot_id, f.product_id, f.operator, &slots[..1])
        .await;
    let first = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(f.app.approve_shipment(&first, f.operator).await, 200);

    let (_, _) = f
        .app
        .create_ingress(f.client_id, f.depot_id, f.product_id, f.operator, &slots[1..2])
        .await;

    let response = f
        .app
        .request(Method::GET, "/api/v1/shipments?status=Pending", None)
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = f
        .app
        .request(
            Method::GET,
            "/api/v1/shipments?shipment_type=Ingress&status=Approved",
            None,
        )
        .await;
    let body = body_json(response).await;
    let docs = body["data"].as_array().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["id"], first);
}
