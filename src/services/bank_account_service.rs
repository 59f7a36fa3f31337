use crate::entities::bank_account_entity as bank_accounts;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{AuditLogService, SettingsService};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// 订阅付款信息在 settings 表中的投影键
pub const SETTING_BANK_NAME: &str = "subscription_bank_name";
pub const SETTING_ACCOUNT_NAME: &str = "subscription_account_name";
pub const SETTING_ACCOUNT_NUMBER: &str = "subscription_account_number";
pub const SETTING_PAYMENT_NOTE: &str = "subscription_payment_note";

/// 账户未填写付款提示时使用的缺省文案
pub const DEFAULT_PAYMENT_NOTE: &str =
    "Please include the student's admission number in the transfer narration.";

/// (is_active, is_primary) 的显式状态。停用账户不可能保留主标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    ActivePrimary,
    ActiveNonPrimary,
    Inactive,
}

impl AccountState {
    pub fn of(account: &bank_accounts::Model) -> Self {
        match (account.is_active, account.is_primary) {
            (true, true) => AccountState::ActivePrimary,
            (true, false) => AccountState::ActiveNonPrimary,
            (false, _) => AccountState::Inactive,
        }
    }
}

/// 账号去掉所有空白后入库（录入常带空格分组）
fn normalize_account_number(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// 保存后的主账户选举：「首个或显式」。
///
/// 保存的行显式声明主账户时无条件当选（其余行的主标记随后被清除）；
/// 未声明时仅当全表没有启用中的主账户、且保存的行本身启用，才补位当选。
/// 编辑一个非主账户永远不会夺走已有主账户的身份。
/// 快照须在行写入之后采集。返回 None 表示维持现状。
fn elect_after_save(saved: &bank_accounts::Model, rows: &[bank_accounts::Model]) -> Option<i64> {
    if saved.is_primary {
        return Some(saved.id);
    }

    let has_active_primary = rows
        .iter()
        .any(|row| AccountState::of(row) == AccountState::ActivePrimary);
    if !has_active_primary && saved.is_active {
        return Some(saved.id);
    }

    None
}

/// 停用或删除后的兜底选举：没有启用中的主账户时，提升 id 最小的启用账户。
/// 没有启用账户则维持无主状态（投影随之清空）。
fn elect_fallback(rows: &[bank_accounts::Model]) -> Option<i64> {
    let has_active_primary = rows
        .iter()
        .any(|row| AccountState::of(row) == AccountState::ActivePrimary);
    if has_active_primary {
        return None;
    }

    rows.iter()
        .filter(|row| row.is_active)
        .map(|row| row.id)
        .min()
}

/// 展示给付款方的投影。始终由主账户整体重算，不做增量修补
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankSettingsProjection {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub payment_note: String,
}

fn compute_projection(primary: Option<&bank_accounts::Model>) -> BankSettingsProjection {
    match primary {
        Some(account) => BankSettingsProjection {
            bank_name: account.bank_name.clone(),
            account_name: account.account_name.clone(),
            account_number: account.account_number.clone(),
            payment_note: account
                .payment_note
                .clone()
                .filter(|note| !note.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PAYMENT_NOTE.to_string()),
        },
        None => BankSettingsProjection {
            bank_name: String::new(),
            account_name: String::new(),
            account_number: String::new(),
            payment_note: DEFAULT_PAYMENT_NOTE.to_string(),
        },
    }
}

#[derive(Clone)]
pub struct BankAccountService {
    pool: DatabaseConnection,
    settings_service: SettingsService,
    audit_service: AuditLogService,
}

impl BankAccountService {
    pub fn new(pool: DatabaseConnection) -> Self {
        let settings_service = SettingsService::new(pool.clone());
        let audit_service = AuditLogService::new(pool.clone());
        Self {
            pool,
            settings_service,
            audit_service,
        }
    }

    pub async fn get_bank_accounts(&self) -> AppResult<Vec<BankAccountResponse>> {
        let models = bank_accounts::Entity::find()
            .order_by_asc(bank_accounts::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(BankAccountResponse::from).collect())
    }

    /// 新建或编辑收款账户。行写入与主账户选举在同一事务内完成
    pub async fn save_bank_account(
        &self,
        actor_id: i64,
        request: SaveBankAccountRequest,
        existing_id: Option<i64>,
    ) -> AppResult<BankAccountResponse> {
        let is_active = request.is_active.unwrap_or(true);
        let is_primary = request.is_primary.unwrap_or(false);

        let bank_name = request.bank_name.trim().to_string();
        let account_name = request.account_name.trim().to_string();
        let account_number = normalize_account_number(&request.account_number);
        let payment_note = request
            .payment_note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(String::from);

        // 编辑时目标行必须存在
        let existing = match existing_id {
            Some(id) => Some(
                bank_accounts::Entity::find_by_id(id)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Bank account not found".to_string()))?,
            ),
            None => None,
        };

        let mut errors = Vec::new();
        if bank_name.is_empty() {
            errors.push("Bank name is required".to_string());
        }
        if account_name.is_empty() {
            errors.push("Account name is required".to_string());
        }
        if account_number.is_empty() {
            errors.push("Account number is required".to_string());
        }
        if account_number.len() > 50 {
            errors.push("Account number must not exceed 50 characters".to_string());
        }
        // 主账户必须处于启用状态
        if is_primary && !is_active {
            errors.push("The primary account must be active".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::ValidationFailed(errors));
        }

        let txn = self.pool.begin().await?;

        let saved = match existing {
            Some(model) => {
                let mut am = model.into_active_model();
                am.bank_name = Set(bank_name);
                am.account_name = Set(account_name);
                am.account_number = Set(account_number);
                am.payment_note = Set(payment_note);
                am.is_active = Set(is_active);
                am.is_primary = Set(is_primary);
                am.updated_at = Set(Some(Utc::now()));
                am.update(&txn).await?
            }
            None => {
                bank_accounts::ActiveModel {
                    bank_name: Set(bank_name),
                    account_name: Set(account_name),
                    account_number: Set(account_number),
                    payment_note: Set(payment_note),
                    is_active: Set(is_active),
                    is_primary: Set(is_primary),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        let rows = bank_accounts::Entity::find().all(&txn).await?;
        if let Some(primary_id) = elect_after_save(&saved, &rows) {
            self.apply_primary(&txn, primary_id).await?;
        }

        txn.commit().await?;

        let action = if existing_id.is_some() {
            "update_bank_account"
        } else {
            "create_bank_account"
        };
        self.audit_service
            .log_action(
                actor_id,
                action,
                "bank_account",
                Some(saved.id),
                &format!("Bank account '{}' saved", saved.account_number),
            )
            .await;

        self.sync_bank_settings_best_effort().await;

        self.get_bank_account(saved.id).await
    }

    /// 启用/停用收款账户。停用会同时清除主标记，再做兜底选举
    pub async fn toggle_bank_account(
        &self,
        actor_id: i64,
        id: i64,
        is_active: bool,
    ) -> AppResult<BankAccountResponse> {
        let account = bank_accounts::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Bank account not found".to_string()))?;

        let txn = self.pool.begin().await?;

        let mut am = account.into_active_model();
        am.is_active = Set(is_active);
        if !is_active {
            am.is_primary = Set(false);
        }
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(&txn).await?;

        let rows = bank_accounts::Entity::find().all(&txn).await?;
        if let Some(primary_id) = elect_fallback(&rows) {
            self.apply_primary(&txn, primary_id).await?;
        }

        txn.commit().await?;

        self.audit_service
            .log_action(
                actor_id,
                "toggle_bank_account",
                "bank_account",
                Some(updated.id),
                &format!(
                    "Bank account '{}' {}",
                    updated.account_number,
                    if is_active { "activated" } else { "deactivated" }
                ),
            )
            .await;

        self.sync_bank_settings_best_effort().await;

        self.get_bank_account(id).await
    }

    /// 显式指定主账户。目标必须存在且启用
    pub async fn set_primary_bank_account(
        &self,
        actor_id: i64,
        id: i64,
    ) -> AppResult<BankAccountResponse> {
        let account = bank_accounts::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Bank account not found".to_string()))?;

        if !account.is_active {
            return Err(AppError::ValidationError(
                "Cannot set an inactive bank account as primary".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        self.apply_primary(&txn, id).await?;
        txn.commit().await?;

        self.audit_service
            .log_action(
                actor_id,
                "set_primary_bank_account",
                "bank_account",
                Some(id),
                &format!("Bank account '{}' set as primary", account.account_number),
            )
            .await;

        self.sync_bank_settings_best_effort().await;

        self.get_bank_account(id).await
    }

    /// 硬删除收款账户，随后做兜底选举
    pub async fn delete_bank_account(&self, actor_id: i64, id: i64) -> AppResult<()> {
        let account = bank_accounts::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Bank account not found".to_string()))?;

        let txn = self.pool.begin().await?;

        bank_accounts::Entity::delete_by_id(id).exec(&txn).await?;

        let rows = bank_accounts::Entity::find().all(&txn).await?;
        if let Some(primary_id) = elect_fallback(&rows) {
            self.apply_primary(&txn, primary_id).await?;
        }

        txn.commit().await?;

        self.audit_service
            .log_action(
                actor_id,
                "delete_bank_account",
                "bank_account",
                Some(id),
                &format!("Bank account '{}' deleted", account.account_number),
            )
            .await;

        self.sync_bank_settings_best_effort().await;

        Ok(())
    }

    /// 把 id 指定的行置为全表唯一的主账户（清除、设置两步都在调用方事务内）
    async fn apply_primary<C: ConnectionTrait>(&self, conn: &C, id: i64) -> AppResult<()> {
        bank_accounts::Entity::update_many()
            .col_expr(bank_accounts::Column::IsPrimary, Expr::value(false))
            .filter(bank_accounts::Column::Id.ne(id))
            .exec(conn)
            .await?;
        bank_accounts::Entity::update_many()
            .col_expr(bank_accounts::Column::IsPrimary, Expr::value(true))
            .filter(bank_accounts::Column::Id.eq(id))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// 把当前主账户整体投影进 settings 表。
    /// 排序加 LIMIT 1 是对主标记重复的脏数据兜底
    pub async fn sync_bank_settings(&self) -> AppResult<()> {
        let primary = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::IsActive.eq(true))
            .order_by_desc(bank_accounts::Column::IsPrimary)
            .order_by_asc(bank_accounts::Column::Id)
            .one(&self.pool)
            .await?
            .filter(|account| account.is_primary);

        let projection = compute_projection(primary.as_ref());
        self.settings_service
            .upsert(SETTING_BANK_NAME, &projection.bank_name)
            .await?;
        self.settings_service
            .upsert(SETTING_ACCOUNT_NAME, &projection.account_name)
            .await?;
        self.settings_service
            .upsert(SETTING_ACCOUNT_NUMBER, &projection.account_number)
            .await?;
        self.settings_service
            .upsert(SETTING_PAYMENT_NOTE, &projection.payment_note)
            .await?;
        Ok(())
    }

    /// 同步失败只记日志，不回滚、不上报：账户表才是事实来源，
    /// 投影滞后只是展示问题
    async fn sync_bank_settings_best_effort(&self) {
        if let Err(e) = self.sync_bank_settings().await {
            log::error!("Failed to sync bank settings: {e:?}");
        }
    }

    /// 付款说明页读取的投影内容
    pub async fn get_payment_settings(&self) -> AppResult<PaymentSettingsResponse> {
        let keys = [
            SETTING_BANK_NAME,
            SETTING_ACCOUNT_NAME,
            SETTING_ACCOUNT_NUMBER,
            SETTING_PAYMENT_NOTE,
        ];
        let mut values = self.settings_service.get_many(&keys).await?;

        Ok(PaymentSettingsResponse {
            bank_name: values.remove(SETTING_BANK_NAME).unwrap_or_default(),
            account_name: values.remove(SETTING_ACCOUNT_NAME).unwrap_or_default(),
            account_number: values.remove(SETTING_ACCOUNT_NUMBER).unwrap_or_default(),
            payment_note: values
                .remove(SETTING_PAYMENT_NOTE)
                .unwrap_or_else(|| DEFAULT_PAYMENT_NOTE.to_string()),
        })
    }

    async fn get_bank_account(&self, id: i64) -> AppResult<BankAccountResponse> {
        let account = bank_accounts::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Bank account not found".to_string()))?;
        Ok(BankAccountResponse::from(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: i64, is_active: bool, is_primary: bool) -> bank_accounts::Model {
        bank_accounts::Model {
            id,
            bank_name: format!("Bank {id}"),
            account_name: format!("Account {id}"),
            account_number: format!("000000{id}"),
            payment_note: None,
            is_active,
            is_primary,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_account_state() {
        assert_eq!(AccountState::of(&account(1, true, true)), AccountState::ActivePrimary);
        assert_eq!(
            AccountState::of(&account(1, true, false)),
            AccountState::ActiveNonPrimary
        );
        assert_eq!(AccountState::of(&account(1, false, false)), AccountState::Inactive);
        // 脏数据：停用却带主标记，一律视为 Inactive
        assert_eq!(AccountState::of(&account(1, false, true)), AccountState::Inactive);
    }

    #[test]
    fn test_normalize_account_number() {
        assert_eq!(normalize_account_number("00 1234 5678"), "0012345678");
        assert_eq!(normalize_account_number(" 0012345678 "), "0012345678");
        assert_eq!(normalize_account_number("0012345678"), "0012345678");
    }

    #[test]
    fn test_first_active_save_is_promoted() {
        // 目录为空时保存一个启用账户，即使没有声明也当选主账户
        let saved = account(1, true, false);
        let rows = vec![saved.clone()];
        assert_eq!(elect_after_save(&saved, &rows), Some(1));
    }

    #[test]
    fn test_explicit_primary_wins_over_existing() {
        // 已有主账户 P，新账户 Q 显式声明主账户：Q 当选，P 随后被清除
        let saved = account(2, true, true);
        let rows = vec![account(1, true, true), saved.clone()];
        assert_eq!(elect_after_save(&saved, &rows), Some(2));
    }

    #[test]
    fn test_edits_never_steal_primary() {
        // 编辑一个非主账户，已有主账户不受影响
        let saved = account(2, true, false);
        let rows = vec![account(1, true, true), saved.clone()];
        assert_eq!(elect_after_save(&saved, &rows), None);
    }

    #[test]
    fn test_inactive_save_is_not_promoted() {
        let saved = account(2, false, false);
        let rows = vec![account(1, false, false), saved.clone()];
        assert_eq!(elect_after_save(&saved, &rows), None);
    }

    #[test]
    fn test_fallback_prefers_smallest_active_id() {
        // 主账户被停用后，剩余启用账户中 id 最小者补位
        let rows = vec![
            account(3, true, false),
            account(5, true, false),
            account(1, false, false),
        ];
        assert_eq!(elect_fallback(&rows), Some(3));
    }

    #[test]
    fn test_fallback_keeps_existing_primary() {
        let rows = vec![account(1, true, true), account(2, true, false)];
        assert_eq!(elect_fallback(&rows), None);
    }

    #[test]
    fn test_fallback_with_no_active_rows() {
        let rows = vec![account(1, false, false)];
        assert_eq!(elect_fallback(&rows), None);
        assert_eq!(elect_fallback(&[]), None);
    }

    #[test]
    fn test_projection_substitutes_default_note() {
        let mut primary = account(1, true, true);
        primary.payment_note = Some("   ".to_string());
        let projection = compute_projection(Some(&primary));
        assert_eq!(projection.bank_name, "Bank 1");
        assert_eq!(projection.payment_note, DEFAULT_PAYMENT_NOTE);

        primary.payment_note = Some("Pay before Friday".to_string());
        let projection = compute_projection(Some(&primary));
        assert_eq!(projection.payment_note, "Pay before Friday");
    }

    #[test]
    fn test_projection_without_primary_is_blank() {
        let projection = compute_projection(None);
        assert_eq!(projection.bank_name, "");
        assert_eq!(projection.account_name, "");
        assert_eq!(projection.account_number, "");
        assert_eq!(projection.payment_note, DEFAULT_PAYMENT_NOTE);
    }
}
