use crate::entities::{BillingCycle, subscription_plan_entity as plans};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SavePlanRequest {
    pub name: String,
    pub plan_code: String,
    pub billing_cycle: BillingCycle,
    /// 金额（最小货币单位）
    pub amount: i64,
    pub duration_days: Option<i32>,
    pub grace_days: Option<i32>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub id: i64,
    pub plan_code: String,
    pub name: String,
    pub billing_cycle: BillingCycle,
    pub amount: i64,
    pub duration_days: Option<i32>,
    pub grace_days: i32,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<plans::Model> for PlanResponse {
    fn from(plan: plans::Model) -> Self {
        Self {
            id: plan.id,
            plan_code: plan.plan_code,
            name: plan.name,
            billing_cycle: plan.billing_cycle,
            amount: plan.amount,
            duration_days: plan.duration_days,
            grace_days: plan.grace_days,
            description: plan.description,
            is_active: plan.is_active,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}
