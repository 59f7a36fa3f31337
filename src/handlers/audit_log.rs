use crate::models::*;
use crate::services::AuditLogService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/audit-logs",
    tag = "audit",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("page_size" = Option<u32>, Query, description = "每页数量"),
        ("user_id" = Option<i64>, Query, description = "操作人ID"),
        ("action" = Option<String>, Query, description = "动作名称"),
        ("resource_type" = Option<String>, Query, description = "资源类型")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取审计日志成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_audit_logs(
    audit_service: web::Data<AuditLogService>,
    query: web::Query<AuditLogQuery>,
) -> Result<HttpResponse> {
    match audit_service.get_audit_logs(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn audit_log_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/audit-logs").route("", web::get().to(get_audit_logs)));
}
