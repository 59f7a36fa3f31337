use crate::entities::setting_entity as settings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingResponse {
    pub key: String,
    pub value: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<settings::Model> for SettingResponse {
    fn from(setting: settings::Model) -> Self {
        Self {
            key: setting.key,
            value: setting.value,
            updated_at: setting.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingItem {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpsertSettingsRequest {
    pub settings: Vec<SettingItem>,
}

/// 付款说明页展示用的投影（来源始终是主收款账户）
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentSettingsResponse {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub payment_note: String,
}
