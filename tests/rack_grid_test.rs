mod common;

use axum::http::Method;
use common::{body_json, TestApp};
use std::collections::HashSet;
use uuid::Uuid;

#[tokio::test]
async fn rack_creation_generates_the_full_slot_grid() {
    let app = TestApp::new().await;
    let depot_id = app.create_depot("Central").await;
    app.create_rack(depot_id, "RK1", 3, 5, 2).await;

    let response = app
        .request(Method::GET, &format!("/api/v1/depots/{}", depot_id), None)
        .await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;

    // 3 x 5 x 2 = 30 slots, all free, codes unique, capacity recomputed.
    assert_eq!(body["data"]["depot"]["total_capacity"], 30);
    let racks = body["data"]["racks"].as_array().unwrap();
    assert_eq!(racks.len(), 1);
    let slots = racks[0]["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 30);

    let codes: HashSet<&str> = slots
        .iter()
        .map(|s| s["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes.len(), 30, "slot codes must be unique");
    assert!(codes.contains("RK1-F1-C1-P1"));
    assert!(codes.contains("RK1-F3-C5-P2"));
    assert!(slots.iter().all(|s| s["status"] == "Free"));

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/depots/{}/occupancy", depot_id),
            None,
        )
        .await;
    let occupancy = body_json(response).await;
    assert_eq!(occupancy["data"]["total"], 30);
    assert_eq!(occupancy["data"]["occupied"], 0);
    assert_eq!(occupancy["data"]["free"], 30);
    assert_eq!(occupancy["data"]["percentage"], 0);
}

#[tokio::test]
async fn out_of_range_dimensions_are_rejected_before_any_state_change() {
    let app = TestApp::new().await;
    let depot_id = app.create_depot("Central").await;

    for bad in [
        serde_json::json!({ "code": "RK1", "rows": 0, "columns": 5, "depth": 2 }),
        serde_json::json!({ "code": "RK1", "rows": 3, "columns": 21, "depth": 2 }),
        serde_json::json!({ "code": "RK1", "rows": 11, "columns": 5, "depth": 2 }),
    ] {
        let response = app
            .request(
                Method::POST,
                &format!("/api/v1/depots/{}/racks", depot_id),
                Some(bad),
            )
            .await;
        assert_eq!(response.status(), 400);
    }

    // Nothing was created and the capacity is untouched.
    let response = app
        .request(Method::GET, &format!("/api/v1/depots/{}", depot_id), None)
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["depot"]["total_capacity"], 0);
    assert!(body["data"]["racks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_rack_codes_conflict_within_a_depot() {
    let app = TestApp::new().await;
    let depot_id = app.create_depot("Central").await;
    app.create_rack(depot_id, "RK1", 1, 1, 1).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/depots/{}/racks", depot_id),
            Some(serde_json::json!({ "code": "RK1", "rows": 1, "columns": 1, "depth": 1 })),
        )
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn deleting_an_empty_rack_recomputes_capacity() {
    let app = TestApp::new().await;
    let depot_id = app.create_depot("Central").await;
    let _keep = app.create_rack(depot_id, "KEEP", 1, 2, 1).await;
    let doomed = app.create_rack(depot_id, "DOOMED", 3, 5, 2).await;

    let response = app
        .request(Method::DELETE, &format!("/api/v1/racks/{}", doomed), None)
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .request(Method::GET, &format!("/api/v1/depots/{}", depot_id), None)
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["depot"]["total_capacity"], 2);
    assert_eq!(body["data"]["racks"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_a_rack_with_occupied_slots_conflicts() {
    let app = TestApp::new().await;
    let depot_id = app.create_depot("Central").await;
    let rack_id = app.create_rack(depot_id, "RK1", 1, 2, 1).await;
    let client_id = app.create_client("Cliente SA").await;
    let product_id = app.create_product(client_id, "P-1").await;
    let operator = Uuid::new_v4();

    let slots = app.free_slot_ids(depot_id).await;
    let (status, body) = app
        .create_ingress(client_id, depot_id, product_id, operator, &slots[..1])
        .await;
    assert_eq!(status, 200);
    let shipment_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(app.approve_shipment(&shipment_id, operator).await, 200);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/racks/{}", rack_id), None)
        .await;
    assert_eq!(response.status(), 409);

    // The rack and its slots survived the refused deletion.
    let response = app
        .request(Method::GET, &format!("/api/v1/depots/{}", depot_id), None)
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["depot"]["total_capacity"], 2);
    app.assert_slot_pallet_agreement().await;
}

#[tokio::test]
async fn free_slots_are_ordered_by_rack_code_then_coordinates() {
    let app = TestApp::new().await;
    let depot_id = app.create_depot("Central").await;
    // Created out of code order on purpose.
    app.create_rack(depot_id, "B", 1, 2, 1).await;
    app.create_rack(depot_id, "A", 2, 1, 1).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/depots/{}/slots/free", depot_id),
            None,
        )
        .await;
    let body = body_json(response).await;
    let codes: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["slot"]["code"].as_str().unwrap())
        .collect();

    assert_eq!(
        codes,
        vec!["A-F1-C1-P1", "A-F2-C1-P1", "B-F1-C1-P1", "B-F1-C2-P1"]
    );
}
