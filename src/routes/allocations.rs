use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::ScenarioSettings;
use crate::core::{AllocationPipeline, AllocationRun};
use crate::models::{AllocationRunResponse, ErrorResponse, HealthResponse, RunAllocationRequest};
use crate::services::{RunStore, RunStoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: AllocationPipeline,
    pub run_store: Arc<RunStore>,
    pub scenarios: ScenarioSettings,
}

/// Configure health and allocation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/allocations/run", web::post().to(run_allocation))
        .route("/allocations/{run_id}", web::get().to(get_run));
}

pub(crate) fn error_response(status_code: u16, error: &str, message: impl ToString) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code,
    }
}

/// Store a finished run and answer with it
pub(crate) async fn publish_run(state: &AppState, response: AllocationRunResponse) -> HttpResponse {
    let stored = state.run_store.insert(response).await;
    HttpResponse::Ok().json(stored.as_ref())
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        stored_runs: state.run_store.stats().await.entries,
        timestamp: chrono::Utc::now(),
    })
}

/// Run allocation endpoint
///
/// POST /api/v1/allocations/run
///
/// Request body:
/// ```json
/// {
///   "today": "2024-06-01",
///   "lots": [{"id": "D001", "item": "Milk", "quantity": 40, "expiryDate": "2024-06-03"}],
///   "recipients": [{"id": "C001", "name": "Central Kitchen", "capacityLimit": 300,
///                   "currentStockCount": 0, "needs": {"Milk": 50}}]
/// }
/// ```
async fn run_allocation(
    state: web::Data<AppState>,
    req: web::Json<RunAllocationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::warn!("Validation failed for run_allocation request: {}", errors);
        return HttpResponse::BadRequest().json(error_response(400, "Validation failed", errors));
    }

    let req = req.into_inner();
    let today = req.today.unwrap_or_else(|| chrono::Local::now().date_naive());

    let (lots, recipients) = match req.into_domain() {
        Ok(batch) => batch,
        Err(e) => {
            tracing::warn!("Rejected allocation input: {}", e);
            return HttpResponse::BadRequest().json(error_response(400, "Invalid input", e));
        }
    };

    tracing::info!(
        "Running allocation for {} lots and {} recipients (today: {})",
        lots.len(),
        recipients.len(),
        today
    );

    let run: AllocationRun = match state.pipeline.run(lots, recipients, today) {
        Ok(run) => run,
        Err(e) => {
            tracing::warn!("Rejected allocation input: {}", e);
            return HttpResponse::BadRequest().json(error_response(400, "Invalid input", e));
        }
    };

    publish_run(&state, AllocationRunResponse::from_run(run)).await
}

/// Fetch a completed run
///
/// GET /api/v1/allocations/{run_id}
async fn get_run(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let run_id = path.into_inner();

    match state.run_store.get(&run_id).await {
        Ok(run) => HttpResponse::Ok().json(run.as_ref()),
        Err(e @ RunStoreError::NotFound(_)) => {
            tracing::debug!("Run lookup failed: {}", e);
            HttpResponse::NotFound().json(error_response(404, "Run not found", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_fields() {
        let response = error_response(404, "Run not found", "Run not found: abc");
        assert_eq!(response.status_code, 404);
        assert_eq!(response.message, "Run not found: abc");
    }
}
