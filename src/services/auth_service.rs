use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::AuditLogService;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    audit_service: AuditLogService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        let audit_service = AuditLogService::new(pool.clone());
        Self {
            pool,
            jwt_service,
            audit_service,
        }
    }

    /// 管理员登录。账号由超级管理员开通，没有自助注册
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !user.is_active {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }

        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.role.to_string())?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(user.id, &user.role.to_string())?;

        // 记录最近登录时间
        let mut am = user.into_active_model();
        am.last_login_at = Set(Some(Utc::now()));
        let user = am.update(&self.pool).await?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user: UserResponse::from(user),
        })
    }

    /// 用刷新令牌换发新的令牌对
    pub async fn refresh(&self, request: RefreshTokenRequest) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(&request.refresh_token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid refresh token".to_string()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;

        if !user.is_active {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }

        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.role.to_string())?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(user.id, &user.role.to_string())?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user: UserResponse::from(user),
        })
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(UserResponse::from(user))
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify_password(&request.old_password, &user.password_hash)? {
            return Err(AppError::ValidationError(
                "Old password is incorrect".to_string(),
            ));
        }
        validate_password(&request.new_password)?;

        let password_hash = hash_password(&request.new_password)?;
        let mut am = user.into_active_model();
        am.password_hash = Set(password_hash);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&self.pool).await?;

        self.audit_service
            .log_action(
                user_id,
                "change_password",
                "user",
                Some(user_id),
                "Password changed",
            )
            .await;

        Ok(())
    }
}
