//! Alert rule CRUD endpoints

use crate::monitoring::alerts::AlertRule;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::WatchError;
use actix_web::{HttpResponse, web};
use tracing::info;

type HandlerResult = Result<HttpResponse, WatchError>;

/// Configure rule routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rules")
            .route("", web::get().to(list_rules))
            .route("", web::post().to(create_rule))
            .route("/{id}", web::get().to(get_rule))
            .route("/{id}", web::put().to(update_rule))
            .route("/{id}", web::delete().to(delete_rule)),
    );
}

async fn list_rules(state: web::Data<AppState>) -> HandlerResult {
    let rules = state.system.rules().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(rules)))
}

/// Create a rule; an empty id gets a generated one
async fn create_rule(state: web::Data<AppState>, rule: web::Json<AlertRule>) -> HandlerResult {
    let rule = state.system.add_rule(rule.into_inner()).await?;
    info!("Rule {} created through the API", rule.id);
    Ok(HttpResponse::Created().json(ApiResponse::success(rule)))
}

async fn get_rule(state: web::Data<AppState>, id: web::Path<String>) -> HandlerResult {
    let rule = state.system.rule(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(rule)))
}

/// Replace a rule; the path id wins over any id in the body
async fn update_rule(
    state: web::Data<AppState>,
    id: web::Path<String>,
    rule: web::Json<AlertRule>,
) -> HandlerResult {
    let mut rule = rule.into_inner();
    rule.id = id.into_inner();
    let rule = state.system.update_rule(rule).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(rule)))
}

async fn delete_rule(state: web::Data<AppState>, id: web::Path<String>) -> HandlerResult {
    state.system.remove_rule(&id).await?;
    info!("Rule {} removed through the API", id);
    Ok(HttpResponse::NoContent().finish())
}
