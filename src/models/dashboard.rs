use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_schools: i64,
    pub active_schools: i64,
    pub total_admins: i64,
    pub total_subscription_plans: i64,
    pub active_subscription_plans: i64,
    pub total_bank_accounts: i64,
}
