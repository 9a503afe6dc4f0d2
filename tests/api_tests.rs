// HTTP API tests for Surplus Match

use actix_web::{test, web, App};
use serde_json::json;
use std::sync::Arc;
use surplus_match::config::ScenarioSettings;
use surplus_match::core::AllocationPipeline;
use surplus_match::models::{AllocationRunResponse, ErrorResponse, HealthResponse, ScenarioListResponse};
use surplus_match::routes::{self, AppState};
use surplus_match::services::RunStore;

fn app_state() -> AppState {
    AppState {
        pipeline: AllocationPipeline::default(),
        run_store: Arc::new(RunStore::new(16, 60)),
        scenarios: ScenarioSettings {
            seed: Some(7),
            mock_lot_count: 15,
        },
    }
}

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: HealthResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.status, "healthy");
    assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(body.stored_runs, 0);
}

#[actix_web::test]
async fn test_run_allocation_and_fetch() {
    let app = init_app!();

    let payload = json!({
        "today": "2024-06-01",
        "lots": [
            {"id": "D1", "item": "Milk", "quantity": 1000, "expiryDate": "2024-06-02"},
            {"id": "D2", "item": "Bread", "quantity": 50, "expiryDate": "2024-06-21"}
        ],
        "recipients": [
            {"id": "C10", "name": "Small Pantry", "capacityLimit": 100, "needs": {"Milk": 50, "Bread": 20}},
            {"id": "C11", "name": "Milk Only Center", "capacityLimit": 50, "needs": {"Milk": 40}}
        ]
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/allocations/run")
        .set_json(&payload)
        .to_request();
    let run: AllocationRunResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(run.total_distributed, 110);
    assert_eq!(run.total_wasted, 940);
    assert!(run.report.conserved);
    assert_eq!(run.prioritized_lots[0].id, "D1");
    assert!(run.scenario.is_none());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/allocations/{}", run.run_id))
        .to_request();
    let fetched: AllocationRunResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(fetched.run_id, run.run_id);
    assert_eq!(fetched.ledger, run.ledger);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let health: HealthResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(health.stored_runs, 1);
}

#[actix_web::test]
async fn test_negative_quantity_rejected() {
    let app = init_app!();

    let payload = json!({
        "today": "2024-06-01",
        "lots": [{"id": "D1", "item": "Milk", "quantity": -10, "expiryDate": "2024-06-02"}],
        "recipients": []
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/allocations/run")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.status_code, 400);
}

#[actix_web::test]
async fn test_duplicate_lot_ids_rejected() {
    let app = init_app!();

    let payload = json!({
        "today": "2024-06-01",
        "lots": [
            {"id": "D1", "item": "Milk", "quantity": 10, "expiryDate": "2024-06-02"},
            {"id": "D1", "item": "Milk", "quantity": 10, "expiryDate": "2024-06-03"}
        ],
        "recipients": []
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/allocations/run")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.message, "duplicate lot id: D1");
}

#[actix_web::test]
async fn test_unknown_run_is_404() {
    let app = init_app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/allocations/does-not-exist")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn test_list_scenarios() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/v1/scenarios").to_request();
    let body: ScenarioListResponse = test::call_and_read_body_json(&app, req).await;

    let names: Vec<&str> = body.scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["standard", "oversupply", "no_match", "exact_fit", "contention"]);
}

#[actix_web::test]
async fn test_run_fixed_scenario() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/scenarios/no_match/run")
        .set_json(json!({"today": "2024-06-01"}))
        .to_request();
    let run: AllocationRunResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(run.scenario.as_deref(), Some("no_match"));
    assert_eq!(run.seed, None);
    assert_eq!(run.total_distributed, 0);
    assert_eq!(run.total_wasted, 200);
}

#[actix_web::test]
async fn test_run_standard_scenario_uses_configured_seed() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/scenarios/standard/run")
        .set_json(json!({"today": "2024-06-01"}))
        .to_request();
    let run: AllocationRunResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(run.seed, Some(7));
    assert_eq!(run.prioritized_lots.len(), 15);
    assert!(run.report.conserved);
}

#[actix_web::test]
async fn test_unknown_scenario_is_404() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/scenarios/famine/run")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn test_malformed_scenario_body_rejected() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/scenarios/standard/run")
        .set_json(json!({"today": "2024-13-45", "seed": "forty-two"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "invalid_json");
    assert_eq!(body.status_code, 400);
}

#[actix_web::test]
async fn test_scenario_without_body_uses_defaults() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/scenarios/exact_fit/run")
        .to_request();
    let run: AllocationRunResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(run.scenario.as_deref(), Some("exact_fit"));
    assert_eq!(run.total_distributed, 60);
    assert_eq!(run.seed, None);
}
