use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{BillingCycle, UserRole};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::auth::change_password,
        handlers::user::get_users,
        handlers::user::create_user,
        handlers::user::update_user,
        handlers::user::toggle_user,
        handlers::school::get_schools,
        handlers::school::create_school,
        handlers::school::update_school,
        handlers::school::toggle_school,
        handlers::audit_log::get_audit_logs,
        handlers::dashboard::get_stats,
        handlers::settings::get_settings,
        handlers::settings::upsert_settings,
        handlers::subscription::get_plans,
        handlers::subscription::create_plan,
        handlers::subscription::update_plan,
        handlers::subscription::toggle_plan,
        handlers::subscription::get_bank_accounts,
        handlers::subscription::create_bank_account,
        handlers::subscription::update_bank_account,
        handlers::subscription::toggle_bank_account,
        handlers::subscription::set_primary_bank_account,
        handlers::subscription::delete_bank_account,
        handlers::subscription::get_payment_settings,
    ),
    components(
        schemas(
            LoginRequest,
            RefreshTokenRequest,
            ChangePasswordRequest,
            AuthResponse,
            UserRole,
            UserResponse,
            CreateUserRequest,
            CreateUserResponse,
            UpdateUserRequest,
            UserQuery,
            SchoolResponse,
            SaveSchoolRequest,
            SchoolQuery,
            AuditLogResponse,
            AuditLogQuery,
            DashboardStats,
            SettingResponse,
            SettingItem,
            UpsertSettingsRequest,
            PaymentSettingsResponse,
            BillingCycle,
            SavePlanRequest,
            PlanResponse,
            SaveBankAccountRequest,
            BankAccountResponse,
            ToggleActiveRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "user", description = "Admin account management API"),
        (name = "school", description = "School management API"),
        (name = "audit", description = "Audit log API"),
        (name = "dashboard", description = "Dashboard statistics API"),
        (name = "settings", description = "System settings API"),
        (name = "subscription", description = "Subscription billing configuration API"),
    ),
    info(
        title = "SAMS Backend API",
        version = "1.0.0",
        description = "School administration console REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
