use crate::entities::audit_log_entity as audit_logs;
use crate::error::AppResult;
use crate::models::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

#[derive(Clone)]
pub struct AuditLogService {
    pool: DatabaseConnection,
}

impl AuditLogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 记录一条审计日志。写入失败只告警，不影响触发它的业务操作
    pub async fn log_action(
        &self,
        user_id: i64,
        action: &str,
        resource_type: &str,
        resource_id: Option<i64>,
        message: &str,
    ) {
        let entry = audit_logs::ActiveModel {
            user_id: Set(user_id),
            action: Set(action.to_string()),
            resource_type: Set(resource_type.to_string()),
            resource_id: Set(resource_id),
            message: Set(message.to_string()),
            ..Default::default()
        };

        if let Err(e) = entry.insert(&self.pool).await {
            log::warn!("Failed to write audit log for action {action}: {e:?}");
        }
    }

    /// 审计日志分页查询
    pub async fn get_audit_logs(
        &self,
        query: &AuditLogQuery,
    ) -> AppResult<PaginatedResponse<AuditLogResponse>> {
        let params = PaginationParams {
            page: query.page,
            page_size: query.page_size,
        };
        let offset = params.get_offset();
        let limit = params.get_limit();

        let mut finder = audit_logs::Entity::find();
        if let Some(user_id) = query.user_id {
            finder = finder.filter(audit_logs::Column::UserId.eq(user_id));
        }
        if let Some(action) = &query.action {
            finder = finder.filter(audit_logs::Column::Action.eq(action.clone()));
        }
        if let Some(resource_type) = &query.resource_type {
            finder = finder.filter(audit_logs::Column::ResourceType.eq(resource_type.clone()));
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
            .order_by_desc(audit_logs::Column::CreatedAt)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;
        let items: Vec<AuditLogResponse> = models.into_iter().map(AuditLogResponse::from).collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }
}
