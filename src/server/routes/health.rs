//! Health snapshot, liveness and metrics endpoints

use crate::monitoring::health::{HealthCheck, HealthState};
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::WatchError;
use actix_web::{HttpResponse, web};
use std::borrow::Cow;
use tracing::debug;

type HandlerResult = Result<HttpResponse, WatchError>;

/// Configure health routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/health")
            .route("", web::get().to(health_status))
            .route("/checks", web::get().to(list_checks))
            .route("/checks/{name}", web::get().to(get_check)),
    )
    .route("/livez", web::get().to(livez))
    .route("/metrics", web::get().to(metrics));
}

/// Overall health plus the latest result of every probe
#[derive(Debug, Clone, serde::Serialize)]
struct HealthSummary {
    status: HealthState,
    timestamp: chrono::DateTime<chrono::Utc>,
    version: Cow<'static, str>,
    checks: Vec<HealthCheck>,
}

/// Overall health status
///
/// Answers 503 while any probe is unhealthy so load balancers can act on it.
async fn health_status(state: web::Data<AppState>) -> HandlerResult {
    debug!("Health status requested");

    let summary = HealthSummary {
        status: state.system.overall_status(),
        timestamp: chrono::Utc::now(),
        version: Cow::Borrowed(env!("CARGO_PKG_VERSION")),
        checks: state.system.health_checks(),
    };

    let mut response = if summary.status == HealthState::Unhealthy {
        HttpResponse::ServiceUnavailable()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(ApiResponse::success(summary)))
}

async fn list_checks(state: web::Data<AppState>) -> HandlerResult {
    Ok(HttpResponse::Ok().json(ApiResponse::success(state.system.health_checks())))
}

async fn get_check(state: web::Data<AppState>, name: web::Path<String>) -> HandlerResult {
    let check = state
        .system
        .health_check(&name)
        .ok_or_else(|| WatchError::not_found(format!("health check {}", name)))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(check)))
}

/// Liveness probe; answers as long as the server can respond
async fn livez() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Metrics endpoint (Prometheus format)
async fn metrics(state: web::Data<AppState>) -> HandlerResult {
    let body = state.system.metrics_text()?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4; charset=utf-8")
        .body(body))
}
