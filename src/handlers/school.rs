use crate::models::*;
use crate::services::SchoolService;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    get,
    path = "/schools",
    tag = "school",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("page_size" = Option<u32>, Query, description = "每页数量"),
        ("keyword" = Option<String>, Query, description = "按名称或编码模糊搜索"),
        ("is_active" = Option<bool>, Query, description = "启用状态")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取学校列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_schools(
    school_service: web::Data<SchoolService>,
    query: web::Query<SchoolQuery>,
) -> Result<HttpResponse> {
    match school_service.get_schools(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/schools",
    tag = "school",
    request_body = SaveSchoolRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "新建学校成功", body = SchoolResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_school(
    school_service: web::Data<SchoolService>,
    req: HttpRequest,
    request: web::Json<SaveSchoolRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match school_service
        .save_school(actor_id, request.into_inner(), None)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "School created"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/schools/{id}",
    tag = "school",
    request_body = SaveSchoolRequest,
    params(
        ("id" = i64, Path, description = "学校ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新学校成功", body = SchoolResponse),
        (status = 404, description = "学校不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn update_school(
    school_service: web::Data<SchoolService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<SaveSchoolRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match school_service
        .save_school(actor_id, request.into_inner(), Some(path.into_inner()))
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/schools/{id}/toggle",
    tag = "school",
    request_body = ToggleActiveRequest,
    params(
        ("id" = i64, Path, description = "学校ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "切换启用状态成功", body = SchoolResponse),
        (status = 404, description = "学校不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn toggle_school(
    school_service: web::Data<SchoolService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ToggleActiveRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match school_service
        .toggle_school(actor_id, path.into_inner(), request.is_active)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn school_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/schools")
            .route("", web::get().to(get_schools))
            .route("", web::post().to(create_school))
            .route("/{id}", web::put().to(update_school))
            .route("/{id}/toggle", web::post().to(toggle_school)),
    );
}
