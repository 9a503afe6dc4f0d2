use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use surplus_match::config::Settings;
use surplus_match::core::AllocationPipeline;
use surplus_match::logging;
use surplus_match::routes::{self, AppState};
use surplus_match::services::RunStore;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init(&Default::default());
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    logging::init(&settings.logging);

    info!("Starting Surplus Match allocation service...");
    info!("Configuration loaded successfully");

    let pipeline = AllocationPipeline::new(
        settings.allocation.urgency_horizon_days,
        settings.allocation.expired_policy,
    );

    info!(
        "Allocation pipeline initialized (horizon: {} days, expired lots: {:?})",
        settings.allocation.urgency_horizon_days, settings.allocation.expired_policy
    );

    let run_store = Arc::new(RunStore::new(
        settings.run_store.max_runs,
        settings.run_store.ttl_secs,
    ));

    info!(
        "Run store initialized (max: {} runs, TTL: {}s)",
        settings.run_store.max_runs, settings.run_store.ttl_secs
    );

    // Build application state
    let app_state = AppState {
        pipeline,
        run_store,
        scenarios: settings.scenarios.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
