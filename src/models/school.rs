use crate::entities::school_entity as schools;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SchoolResponse {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<schools::Model> for SchoolResponse {
    fn from(school: schools::Model) -> Self {
        Self {
            id: school.id,
            name: school.name,
            code: school.code,
            address: school.address,
            phone: school.phone,
            email: school.email,
            is_active: school.is_active,
            created_at: school.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveSchoolRequest {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SchoolQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub keyword: Option<String>, // 按名称或编码模糊搜索
    pub is_active: Option<bool>,
}
