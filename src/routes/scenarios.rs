use actix_web::{web, HttpResponse, Responder};

use crate::models::{AllocationRunResponse, RunScenarioRequest, ScenarioInfo, ScenarioListResponse};
use crate::routes::allocations::{error_response, publish_run, AppState};
use crate::scenarios::Scenario;

/// Configure scenario routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/scenarios", web::get().to(list_scenarios))
        .route("/scenarios/{name}/run", web::post().to(run_scenario));
}

/// List built-in scenarios
///
/// GET /api/v1/scenarios
async fn list_scenarios() -> impl Responder {
    let scenarios = Scenario::ALL
        .iter()
        .map(|s| ScenarioInfo {
            name: s.name().to_string(),
            description: s.description().to_string(),
        })
        .collect();

    HttpResponse::Ok().json(ScenarioListResponse { scenarios })
}

fn parse_scenario_request(body: &[u8]) -> Result<RunScenarioRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunScenarioRequest::default());
    }
    serde_json::from_slice(body)
}

/// Run a built-in scenario
///
/// POST /api/v1/scenarios/{name}/run
///
/// Optional request body:
/// ```json
/// { "today": "2024-06-01", "seed": 42 }
/// ```
///
/// An empty body runs with defaults; a body that does not parse is a 400.
async fn run_scenario(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    let name = path.into_inner();
    let scenario = match name.parse::<Scenario>() {
        Ok(scenario) => scenario,
        Err(e) => {
            return HttpResponse::NotFound().json(error_response(404, "Unknown scenario", e));
        }
    };

    let req = match parse_scenario_request(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!("Invalid scenario request body: {}", e);
            return HttpResponse::BadRequest()
                .json(error_response(400, "invalid_json", format!("Invalid JSON: {}", e)));
        }
    };
    let today = req.today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let seed = req
        .seed
        .or(state.scenarios.seed)
        .unwrap_or_else(rand::random);

    let (lots, recipients) = match scenario.build(today, seed, state.scenarios.mock_lot_count) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!("Failed to build scenario {}: {}", scenario, e);
            return HttpResponse::InternalServerError()
                .json(error_response(500, "Failed to build scenario", e));
        }
    };

    tracing::info!("Running scenario {} (today: {}, seed: {})", scenario, today, seed);

    let run = match state.pipeline.run(lots, recipients, today) {
        Ok(run) => run,
        Err(e) => {
            tracing::error!("Scenario {} produced invalid input: {}", scenario, e);
            return HttpResponse::InternalServerError()
                .json(error_response(500, "Failed to run scenario", e));
        }
    };

    let seed = scenario.is_random().then_some(seed);
    let response = AllocationRunResponse::from_run(run).with_scenario(scenario.name(), seed);
    publish_run(&state, response).await
}
