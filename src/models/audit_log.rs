use crate::entities::audit_log_entity as audit_logs;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditLogResponse {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<i64>,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<audit_logs::Model> for AuditLogResponse {
    fn from(entry: audit_logs::Model) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            action: entry.action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            message: entry.message,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditLogQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub user_id: Option<i64>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
}
