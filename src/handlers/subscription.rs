use crate::models::*;
use crate::services::{BankAccountService, SubscriptionPlanService};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    get,
    path = "/subscription/plans",
    tag = "subscription",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取套餐列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_plans(plan_service: web::Data<SubscriptionPlanService>) -> Result<HttpResponse> {
    match plan_service.get_plans().await {
        Ok(plans) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "plans": plans }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscription/plans",
    tag = "subscription",
    request_body = SavePlanRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "新建套餐成功", body = PlanResponse),
        (status = 400, description = "校验失败，返回错误列表"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_plan(
    plan_service: web::Data<SubscriptionPlanService>,
    req: HttpRequest,
    request: web::Json<SavePlanRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match plan_service
        .save_plan(actor_id, request.into_inner(), None)
        .await
    {
        // 保存成功后带回最新列表，方便表单页重渲染
        Ok(plan) => match plan_service.get_plans().await {
            Ok(plans) => Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": { "plan": plan, "plans": plans },
                "message": "Subscription plan saved"
            }))),
            Err(e) => Ok(e.error_response()),
        },
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/subscription/plans/{id}",
    tag = "subscription",
    request_body = SavePlanRequest,
    params(
        ("id" = i64, Path, description = "套餐ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新套餐成功", body = PlanResponse),
        (status = 400, description = "校验失败，返回错误列表"),
        (status = 404, description = "套餐不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn update_plan(
    plan_service: web::Data<SubscriptionPlanService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<SavePlanRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match plan_service
        .save_plan(actor_id, request.into_inner(), Some(path.into_inner()))
        .await
    {
        Ok(plan) => match plan_service.get_plans().await {
            Ok(plans) => Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": { "plan": plan, "plans": plans },
                "message": "Subscription plan saved"
            }))),
            Err(e) => Ok(e.error_response()),
        },
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscription/plans/{id}/toggle",
    tag = "subscription",
    request_body = ToggleActiveRequest,
    params(
        ("id" = i64, Path, description = "套餐ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "切换套餐状态成功", body = PlanResponse),
        (status = 404, description = "套餐不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn toggle_plan(
    plan_service: web::Data<SubscriptionPlanService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ToggleActiveRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match plan_service
        .toggle_plan(actor_id, path.into_inner(), request.is_active)
        .await
    {
        Ok(plan) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "plan": plan }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscription/bank-accounts",
    tag = "subscription",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取收款账户列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_bank_accounts(
    bank_account_service: web::Data<BankAccountService>,
) -> Result<HttpResponse> {
    match bank_account_service.get_bank_accounts().await {
        Ok(accounts) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "bank_accounts": accounts }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscription/bank-accounts",
    tag = "subscription",
    request_body = SaveBankAccountRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "新建收款账户成功", body = BankAccountResponse),
        (status = 400, description = "校验失败，返回错误列表"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_bank_account(
    bank_account_service: web::Data<BankAccountService>,
    req: HttpRequest,
    request: web::Json<SaveBankAccountRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match bank_account_service
        .save_bank_account(actor_id, request.into_inner(), None)
        .await
    {
        Ok(account) => match bank_account_service.get_bank_accounts().await {
            Ok(accounts) => Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": { "bank_account": account, "bank_accounts": accounts },
                "message": "Bank account saved"
            }))),
            Err(e) => Ok(e.error_response()),
        },
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/subscription/bank-accounts/{id}",
    tag = "subscription",
    request_body = SaveBankAccountRequest,
    params(
        ("id" = i64, Path, description = "收款账户ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新收款账户成功", body = BankAccountResponse),
        (status = 400, description = "校验失败，返回错误列表"),
        (status = 404, description = "收款账户不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn update_bank_account(
    bank_account_service: web::Data<BankAccountService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<SaveBankAccountRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match bank_account_service
        .save_bank_account(actor_id, request.into_inner(), Some(path.into_inner()))
        .await
    {
        Ok(account) => match bank_account_service.get_bank_accounts().await {
            Ok(accounts) => Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": { "bank_account": account, "bank_accounts": accounts },
                "message": "Bank account saved"
            }))),
            Err(e) => Ok(e.error_response()),
        },
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscription/bank-accounts/{id}/toggle",
    tag = "subscription",
    request_body = ToggleActiveRequest,
    params(
        ("id" = i64, Path, description = "收款账户ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "切换账户状态成功", body = BankAccountResponse),
        (status = 404, description = "收款账户不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn toggle_bank_account(
    bank_account_service: web::Data<BankAccountService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ToggleActiveRequest>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match bank_account_service
        .toggle_bank_account(actor_id, path.into_inner(), request.is_active)
        .await
    {
        Ok(account) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "bank_account": account }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscription/bank-accounts/{id}/primary",
    tag = "subscription",
    params(
        ("id" = i64, Path, description = "收款账户ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "设置主账户成功", body = BankAccountResponse),
        (status = 400, description = "账户未启用"),
        (status = 404, description = "收款账户不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn set_primary_bank_account(
    bank_account_service: web::Data<BankAccountService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match bank_account_service
        .set_primary_bank_account(actor_id, path.into_inner())
        .await
    {
        Ok(account) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "bank_account": account }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/subscription/bank-accounts/{id}",
    tag = "subscription",
    params(
        ("id" = i64, Path, description = "收款账户ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除收款账户成功"),
        (status = 404, description = "收款账户不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn delete_bank_account(
    bank_account_service: web::Data<BankAccountService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor_id = get_user_id_from_request(&req).unwrap_or(0);

    match bank_account_service
        .delete_bank_account(actor_id, path.into_inner())
        .await
    {
        Ok(_) => match bank_account_service.get_bank_accounts().await {
            Ok(accounts) => Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": { "bank_accounts": accounts },
                "message": "Bank account deleted"
            }))),
            Err(e) => Ok(e.error_response()),
        },
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscription/payment-settings",
    tag = "subscription",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取付款说明成功", body = PaymentSettingsResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_payment_settings(
    bank_account_service: web::Data<BankAccountService>,
) -> Result<HttpResponse> {
    match bank_account_service.get_payment_settings().await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscription")
            .route("/plans", web::get().to(get_plans))
            .route("/plans", web::post().to(create_plan))
            .route("/plans/{id}", web::put().to(update_plan))
            .route("/plans/{id}/toggle", web::post().to(toggle_plan))
            .route("/bank-accounts", web::get().to(get_bank_accounts))
            .route("/bank-accounts", web::post().to(create_bank_account))
            .route("/bank-accounts/{id}", web::put().to(update_bank_account))
            .route(
                "/bank-accounts/{id}/toggle",
                web::post().to(toggle_bank_account),
            )
            .route(
                "/bank-accounts/{id}/primary",
                web::post().to(set_primary_bank_account),
            )
            .route(
                "/bank-accounts/{id}",
                web::delete().to(delete_bank_account),
            )
            .route("/payment-settings", web::get().to(get_payment_settings)),
    );
}
