use crate::models::*;
use crate::services::UserService;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "user",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("page_size" = Option<u32>, Query, description = "每页数量"),
        ("role" = Option<String>, Query, description = "角色: super_admin/admin"),
        ("school_id" = Option<i64>, Query, description = "学校ID"),
        ("keyword" = Option<String>, Query, description = "按邮箱或姓名模糊搜索")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取管理员列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_users(
    user_service: web::Data<UserService>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse> {
    match user_service.get_users(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "user",
    request_body = CreateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "开通管理员成功", body = CreateUserResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match user_service.create_user(actor_id, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Admin account created"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "user",
    request_body = UpdateUserRequest,
    params(
        ("id" = i64, Path, description = "管理员ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新管理员成功", body = UserResponse),
        (status = 404, description = "管理员不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn update_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match user_service
        .update_user(actor_id, path.into_inner(), request.into_inner())
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
    path = "/users/{id}/toggle",
    tag = "user",
    request_body = ToggleActiveRequest,
    params(
        ("id" = i64, Path, description = "管理员ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "切换启用状态成功", body = UserResponse),
        (status = 404, description = "管理员不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn toggle_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ToggleActiveRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match user_service
        .toggle_user(actor_id, path.into_inner(), request.is_active)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(get_users))
            .route("", web::post().to(create_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}/toggle", web::post().to(toggle_user)),
    );
}
