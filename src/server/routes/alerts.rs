//! Alert query and lifecycle endpoints

use crate::monitoring::AlertFilter;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::WatchError;
use actix_web::{HttpResponse, web};
use std::time::Duration;
use tracing::{debug, info};

type HandlerResult = Result<HttpResponse, WatchError>;

/// Configure alert routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/alerts")
            .route("", web::get().to(list_alerts))
            .route("/active", web::get().to(active_alerts))
            .route("/{id}", web::get().to(get_alert))
            .route("/{id}/resolve", web::post().to(resolve_alert))
            .route("/{id}/silence", web::post().to(silence_alert)),
    );
}

/// Body of `POST /alerts/{id}/silence`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SilenceRequest {
    pub duration_secs: u64,
}

/// List stored alerts, filtered by `status`, `severity`, `type` and `source`
async fn list_alerts(state: web::Data<AppState>, filter: web::Query<AlertFilter>) -> HandlerResult {
    debug!("Listing alerts with filter {:?}", filter);
    let alerts = state.system.alerts(&filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(alerts)))
}

async fn active_alerts(state: web::Data<AppState>) -> HandlerResult {
    let alerts = state.system.active_alerts().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(alerts)))
}

async fn get_alert(state: web::Data<AppState>, id: web::Path<String>) -> HandlerResult {
    let alert = state.system.alert(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(alert)))
}

async fn resolve_alert(state: web::Data<AppState>, id: web::Path<String>) -> HandlerResult {
    let alert = state.system.resolve_alert(&id).await?;
    info!("Alert {} resolved through the API", alert.id);
    Ok(HttpResponse::Ok().json(ApiResponse::success(alert)))
}

async fn silence_alert(
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<SilenceRequest>,
) -> HandlerResult {
    let alert = state
        .system
        .silence_alert(&id, Duration::from_secs(body.duration_secs))
        .await?;
    info!(
        "Alert {} silenced for {}s through the API",
        alert.id, body.duration_secs
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(alert)))
}
