use crate::entities::{
    bank_account_entity as bank_accounts, school_entity as schools,
    subscription_plan_entity as plans, user_entity as users,
};
use crate::error::AppResult;
use crate::models::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Select};

#[derive(Debug, sea_orm::FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Clone)]
pub struct DashboardService {
    pool: DatabaseConnection,
}

impl DashboardService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn count<E: EntityTrait>(&self, finder: Select<E>) -> AppResult<i64> {
        let count = finder
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);
        Ok(count)
    }

    /// 总览页统计数字
    pub async fn get_stats(&self) -> AppResult<DashboardStats> {
        let total_schools = self.count(schools::Entity::find()).await?;
        let active_schools = self
            .count(schools::Entity::find().filter(schools::Column::IsActive.eq(true)))
            .await?;
        let total_admins = self.count(users::Entity::find()).await?;
        let total_subscription_plans = self.count(plans::Entity::find()).await?;
        let active_subscription_plans = self
            .count(plans::Entity::find().filter(plans::Column::IsActive.eq(true)))
            .await?;
        let total_bank_accounts = self.count(bank_accounts::Entity::find()).await?;

        Ok(DashboardStats {
            total_schools,
            active_schools,
            total_admins,
            total_subscription_plans,
            active_subscription_plans,
            total_bank_accounts,
        })
    }
}
