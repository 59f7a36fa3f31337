use crate::entities::setting_entity as settings;
use crate::error::AppResult;
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashMap;

/// 通用键值设置存储，只有「插入或更新」语义
#[derive(Clone)]
pub struct SettingsService {
    pool: DatabaseConnection,
}

impl SettingsService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, key: &str, value: &str) -> AppResult<()> {
        match settings::Entity::find()
            .filter(settings::Column::Key.eq(key))
            .one(&self.pool)
            .await?
        {
            Some(row) => {
                let mut am = row.into_active_model();
                am.value = Set(value.to_string());
                am.updated_at = Set(Some(Utc::now()));
                am.update(&self.pool).await?;
            }
            None => {
                settings::ActiveModel {
                    key: Set(key.to_string()),
                    value: Set(value.to_string()),
                    ..Default::default()
                }
                .insert(&self.pool)
                .await?;
            }
        }
        Ok(())
    }

    pub async fn upsert_many(&self, items: &[SettingItem]) -> AppResult<()> {
        for item in items {
            self.upsert(&item.key, &item.value).await?;
        }
        Ok(())
    }

    pub async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let row = settings::Entity::find()
            .filter(settings::Column::Key.eq(key))
            .one(&self.pool)
            .await?;
        Ok(row.map(|r| r.value))
    }

    pub async fn get_many(&self, keys: &[&str]) -> AppResult<HashMap<String, String>> {
        let rows = settings::Entity::find()
            .filter(settings::Column::Key.is_in(keys.iter().map(|k| k.to_string())))
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| (r.key, r.value)).collect())
    }

    pub async fn list(&self) -> AppResult<Vec<SettingResponse>> {
        let rows = settings::Entity::find()
            .order_by_asc(settings::Column::Key)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SettingResponse::from).collect())
    }
}
