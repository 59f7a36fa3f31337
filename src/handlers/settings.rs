use crate::models::*;
use crate::services::SettingsService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取系统设置成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_settings(settings_service: web::Data<SettingsService>) -> Result<HttpResponse> {
    match settings_service.list().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "settings": settings }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/settings",
    tag = "settings",
    request_body = UpsertSettingsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "保存系统设置成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn upsert_settings(
    settings_service: web::Data<SettingsService>,
    request: web::Json<UpsertSettingsRequest>,
) -> Result<HttpResponse> {
    match settings_service.upsert_many(&request.settings).await {
        Ok(_) => match settings_service.list().await {
            Ok(settings) => Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": { "settings": settings },
                "message": "Settings saved"
            }))),
            Err(e) => Ok(e.error_response()),
        },
        Err(e) => Ok(e.error_response()),
    }
}

pub fn settings_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/settings")
            .route("", web::get().to(get_settings))
            .route("", web::put().to(upsert_settings)),
    );
}
