use actix_web::web::ServiceConfig;

mod health;

pub use health::{health_route, index_route};

/// Register every route of the front-end
pub fn routes(cfg: &mut ServiceConfig) {
    cfg.service(index_route).service(health_route);
}
