use actix_web::{HttpResponse, Responder, get, web};
use chrono::Utc;
use healthcheck::types::format_timestamp;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    timestamp: String,
    results: Vec<ResultEntry>,
}

#[derive(Debug, Serialize)]
struct ResultEntry {
    url: String,
    status: String,
}

#[derive(Debug, Serialize)]
struct IndexResponse {
    message: &'static str,
    routes: [&'static str; 1],
}

/// Run one check pass and report every endpoint's status
#[get("/health")]
pub async fn health_route(state: web::Data<AppState>) -> impl Responder {
    let results = state.orchestrator.run_checks(&state.config.endpoints).await;

    HttpResponse::Ok().json(HealthResponse {
        timestamp: format_timestamp(&Utc::now()),
        results: results
            .into_iter()
            .map(|result| ResultEntry {
                url: result.endpoint.to_string(),
                status: result.status.to_string(),
            })
            .collect(),
    })
}

/// Route listing
#[get("/")]
pub async fn index_route() -> impl Responder {
    HttpResponse::Ok().json(IndexResponse { message: "Health Checker", routes: ["/health"] })
}
