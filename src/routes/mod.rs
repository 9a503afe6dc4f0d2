// Route exports
pub mod allocations;
pub mod scenarios;

use actix_web::web;

pub use allocations::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(allocations::configure)
            .configure(scenarios::configure),
    );
}
