use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::AuditLogService;
use crate::utils::{generate_initial_password, hash_password};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
    audit_service: AuditLogService,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        let audit_service = AuditLogService::new(pool.clone());
        Self {
            pool,
            audit_service,
        }
    }

    /// 管理员账号分页查询，支持角色/学校/关键字过滤
    pub async fn get_users(&self, query: &UserQuery) -> AppResult<PaginatedResponse<UserResponse>> {
        let params = PaginationParams {
            page: query.page,
            page_size: query.page_size,
        };
        let offset = params.get_offset();
        let limit = params.get_limit();

        let mut finder = users::Entity::find();
        if let Some(role) = &query.role {
            finder = finder.filter(users::Column::Role.eq(role.clone()));
        }
        if let Some(school_id) = query.school_id {
            finder = finder.filter(users::Column::SchoolId.eq(school_id));
        }
        if let Some(keyword) = &query.keyword {
            let keyword = keyword.trim();
            if !keyword.is_empty() {
                finder = finder.filter(
                    Condition::any()
                        .add(users::Column::Email.contains(keyword))
                        .add(users::Column::FullName.contains(keyword)),
                );
            }
        }

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total = finder
            .clone()
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let models = finder
            .order_by_desc(users::Column::CreatedAt)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;
        let items: Vec<UserResponse> = models.into_iter().map(UserResponse::from).collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    /// 开通管理员账号，初始密码随机生成、仅返回一次
    pub async fn create_user(
        &self,
        actor_id: i64,
        request: CreateUserRequest,
    ) -> AppResult<CreateUserResponse> {
        let email = request.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }
        if request.full_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Full name is required".to_string(),
            ));
        }

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(format!(
                "Email '{email}' already exists"
            )));
        }

        let initial_password = generate_initial_password();
        let password_hash = hash_password(&initial_password)?;

        let user = users::ActiveModel {
            email: Set(email),
            password_hash: Set(password_hash),
            full_name: Set(request.full_name.trim().to_string()),
            role: Set(request.role),
            school_id: Set(request.school_id),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        self.audit_service
            .log_action(
                actor_id,
                "create_admin_user",
                "user",
                Some(user.id),
                &format!("Admin account '{}' created", user.email),
            )
            .await;

        Ok(CreateUserResponse {
            user: UserResponse::from(user),
            initial_password,
        })
    }

    pub async fn update_user(
        &self,
        actor_id: i64,
        id: i64,
        request: UpdateUserRequest,
    ) -> AppResult<UserResponse> {
        if request.full_name.is_none() && request.role.is_none() && request.school_id.is_none() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let mut am = users::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
            .into_active_model();
        if let Some(full_name) = &request.full_name {
            if full_name.trim().is_empty() {
                return Err(AppError::ValidationError(
                    "Full name is required".to_string(),
                ));
            }
            am.full_name = Set(full_name.trim().to_string());
        }
        if let Some(role) = request.role {
            am.role = Set(role);
        }
        if let Some(school_id) = request.school_id {
            am.school_id = Set(Some(school_id));
        }
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(&self.pool).await?;

        self.audit_service
            .log_action(
                actor_id,
                "update_admin_user",
                "user",
                Some(updated.id),
                &format!("Admin account '{}' updated", updated.email),
            )
            .await;

        Ok(UserResponse::from(updated))
    }

    pub async fn toggle_user(
        &self,
        actor_id: i64,
        id: i64,
        is_active: bool,
    ) -> AppResult<UserResponse> {
        // 不允许停用自己的账号
        if actor_id == id && !is_active {
            return Err(AppError::ValidationError(
                "Cannot deactivate your own account".to_string(),
            ));
        }

        let user = users::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mut am = user.into_active_model();
        am.is_active = Set(is_active);
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(&self.pool).await?;

        self.audit_service
            .log_action(
                actor_id,
                "toggle_admin_user",
                "user",
                Some(updated.id),
                &format!(
                    "Admin account '{}' {}",
                    updated.email,
                    if is_active { "activated" } else { "deactivated" }
                ),
            )
            .await;

        Ok(UserResponse::from(updated))
    }
}
