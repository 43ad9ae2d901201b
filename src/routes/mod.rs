// Route exports
pub mod pairings;

pub use pairings::AppState;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(pairings::configure),
    );
}
