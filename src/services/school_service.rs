use crate::entities::school_entity as schools;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::AuditLogService;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct SchoolService {
    pool: DatabaseConnection,
    audit_service: AuditLogService,
}

impl SchoolService {
    pub fn new(pool: DatabaseConnection) -> Self {
        let audit_service = AuditLogService::new(pool.clone());
        Self {
            pool,
            audit_service,
        }
    }

    /// 学校分页查询，支持关键字与启用状态过滤
    pub async fn get_schools(
        &self,
        query: &SchoolQuery,
    ) -> AppResult<PaginatedResponse<SchoolResponse>> {
        let params = PaginationParams {
            page: query.page,
            page_size: query.page_size,
        };
        let offset = params.get_offset();
        let limit = params.get_limit();

        let mut finder = schools::Entity::find();
        if let Some(is_active) = query.is_active {
            finder = finder.filter(schools::Column::IsActive.eq(is_active));
        }
        if let Some(keyword) = &query.keyword {
            let keyword = keyword.trim();
            if !keyword.is_empty() {
                finder = finder.filter(
                    Condition::any()
                        .add(schools::Column::Name.contains(keyword))
                        .add(schools::Column::Code.contains(keyword)),
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
            .order_by_desc(schools::Column::CreatedAt)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;
        let items: Vec<SchoolResponse> = models.into_iter().map(SchoolResponse::from).collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    /// 新建或编辑学校
    pub async fn save_school(
        &self,
        actor_id: i64,
        request: SaveSchoolRequest,
        existing_id: Option<i64>,
    ) -> AppResult<SchoolResponse> {
        let name = request.name.trim().to_string();
        let code = request.code.trim().to_lowercase();

        if name.is_empty() {
            return Err(AppError::ValidationError(
                "School name is required".to_string(),
            ));
        }
        if code.is_empty() {
            return Err(AppError::ValidationError(
                "School code is required".to_string(),
            ));
        }

        // 编辑时目标行必须存在
        let existing = match existing_id {
            Some(id) => Some(
                schools::Entity::find_by_id(id)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("School not found".to_string()))?,
            ),
            None => None,
        };

        // 学校编码全表唯一，编辑时排除自身
        let mut dup_finder = schools::Entity::find().filter(schools::Column::Code.eq(code.clone()));
        if let Some(id) = existing_id {
            dup_finder = dup_finder.filter(schools::Column::Id.ne(id));
        }
        if dup_finder.one(&self.pool).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "School code '{code}' already exists"
            )));
        }

        let is_active = request.is_active.unwrap_or(true);
        let saved = match existing {
            Some(model) => {
                let mut am = model.into_active_model();
                am.name = Set(name);
                am.code = Set(code);
                am.address = Set(request.address.clone());
                am.phone = Set(request.phone.clone());
                am.email = Set(request.email.clone());
                am.is_active = Set(is_active);
                am.updated_at = Set(Some(Utc::now()));
                am.update(&self.pool).await?
            }
            None => {
                schools::ActiveModel {
                    name: Set(name),
                    code: Set(code),
                    address: Set(request.address.clone()),
                    phone: Set(request.phone.clone()),
                    email: Set(request.email.clone()),
                    is_active: Set(is_active),
                    ..Default::default()
                }
                .insert(&self.pool)
                .await?
            }
        };

        let action = if existing_id.is_some() {
            "update_school"
        } else {
            "create_school"
        };
        self.audit_service
            .log_action(
                actor_id,
                action,
                "school",
                Some(saved.id),
                &format!("School '{}' saved", saved.code),
            )
            .await;

        Ok(SchoolResponse::from(saved))
    }

    pub async fn toggle_school(
        &self,
        actor_id: i64,
        id: i64,
        is_active: bool,
    ) -> AppResult<SchoolResponse> {
        let school = schools::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("School not found".to_string()))?;

        let mut am = school.into_active_model();
        am.is_active = Set(is_active);
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(&self.pool).await?;

        self.audit_service
            .log_action(
                actor_id,
                "toggle_school",
                "school",
                Some(updated.id),
                &format!(
                    "School '{}' {}",
                    updated.code,
                    if is_active { "activated" } else { "deactivated" }
                ),
            )
            .await;

        Ok(SchoolResponse::from(updated))
    }
}
