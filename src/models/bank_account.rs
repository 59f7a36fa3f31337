use crate::entities::bank_account_entity as bank_accounts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveBankAccountRequest {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub payment_note: Option<String>,
    pub is_active: Option<bool>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BankAccountResponse {
    pub id: i64,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub payment_note: Option<String>,
    pub is_active: bool,
    pub is_primary: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<bank_accounts::Model> for BankAccountResponse {
    fn from(account: bank_accounts::Model) -> Self {
        Self {
            id: account.id,
            bank_name: account.bank_name,
            account_name: account.account_name,
            account_number: account.account_number,
            payment_note: account.payment_note,
            is_active: account.is_active,
            is_primary: account.is_primary,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
