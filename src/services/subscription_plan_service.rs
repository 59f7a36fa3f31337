use crate::entities::{BillingCycle, subscription_plan_entity as plans};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::AuditLogService;
use chrono::Utc;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

const PLAN_CODE_PATTERN: &str = r"^[a-z0-9_]{3,40}$";

/// 校验套餐表单，返回所有违反的规则（不短路，方便表单页一次性展示）
fn validate_plan_input(request: &SavePlanRequest) -> Vec<String> {
    let mut errors = Vec::new();

    if request.name.trim().is_empty() {
        errors.push("Plan name is required".to_string());
    }

    let code_regex = Regex::new(PLAN_CODE_PATTERN).unwrap();
    if !code_regex.is_match(&request.plan_code) {
        errors.push(
            "Plan code must be 3-40 characters of lowercase letters, digits or underscores"
                .to_string(),
        );
    }

    if request.amount < 0 {
        errors.push("Amount must not be negative".to_string());
    }

    // lifetime 套餐没有期限，其它周期必须填有效天数
    if request.billing_cycle != BillingCycle::Lifetime {
        match request.duration_days {
            Some(days) if days >= 1 => {}
            _ => errors.push("Duration days must be at least 1 for non-lifetime plans".to_string()),
        }
    }

    if let Some(grace_days) = request.grace_days {
        if grace_days < 0 {
            errors.push("Grace days must not be negative".to_string());
        }
    }

    errors
}

#[derive(Clone)]
pub struct SubscriptionPlanService {
    pool: DatabaseConnection,
    audit_service: AuditLogService,
}

impl SubscriptionPlanService {
    pub fn new(pool: DatabaseConnection) -> Self {
        let audit_service = AuditLogService::new(pool.clone());
        Self {
            pool,
            audit_service,
        }
    }

    pub async fn get_plans(&self) -> AppResult<Vec<PlanResponse>> {
        let models = plans::Entity::find()
            .order_by_asc(plans::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(PlanResponse::from).collect())
    }

    /// 新建或编辑订阅套餐。校验全部通过才写库
    pub async fn save_plan(
        &self,
        actor_id: i64,
        request: SavePlanRequest,
        existing_id: Option<i64>,
    ) -> AppResult<PlanResponse> {
        // 编辑时目标行必须存在
        let existing = match existing_id {
            Some(id) => Some(
                plans::Entity::find_by_id(id)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound("Subscription plan not found".to_string())
                    })?,
            ),
            None => None,
        };

        let mut errors = validate_plan_input(&request);

        // plan_code 全表唯一，编辑时排除自身
        let mut dup_finder =
            plans::Entity::find().filter(plans::Column::PlanCode.eq(request.plan_code.clone()));
        if let Some(id) = existing_id {
            dup_finder = dup_finder.filter(plans::Column::Id.ne(id));
        }
        if dup_finder.one(&self.pool).await?.is_some() {
            errors.push(format!("Plan code '{}' already exists", request.plan_code));
        }

        if !errors.is_empty() {
            return Err(AppError::ValidationFailed(errors));
        }

        // lifetime 套餐强制不落期限，无论表单提交了什么
        let duration_days = if request.billing_cycle == BillingCycle::Lifetime {
            None
        } else {
            request.duration_days
        };
        let grace_days = request.grace_days.unwrap_or(7);
        let is_active = request.is_active.unwrap_or(true);

        let saved = match existing {
            Some(model) => {
                let mut am = model.into_active_model();
                am.plan_code = Set(request.plan_code.clone());
                am.name = Set(request.name.trim().to_string());
                am.billing_cycle = Set(request.billing_cycle.clone());
                am.amount = Set(request.amount);
                am.duration_days = Set(duration_days);
                am.grace_days = Set(grace_days);
                am.description = Set(request.description.clone());
                am.is_active = Set(is_active);
                am.updated_at = Set(Some(Utc::now()));
                am.update(&self.pool).await?
            }
            None => {
                plans::ActiveModel {
                    plan_code: Set(request.plan_code.clone()),
                    name: Set(request.name.trim().to_string()),
                    billing_cycle: Set(request.billing_cycle.clone()),
                    amount: Set(request.amount),
                    duration_days: Set(duration_days),
                    grace_days: Set(grace_days),
                    description: Set(request.description.clone()),
                    is_active: Set(is_active),
                    ..Default::default()
                }
                .insert(&self.pool)
                .await?
            }
        };

        let action = if existing_id.is_some() {
            "update_subscription_plan"
        } else {
            "create_subscription_plan"
        };
        self.audit_service
            .log_action(
                actor_id,
                action,
                "subscription_plan",
                Some(saved.id),
                &format!("Subscription plan '{}' saved", saved.plan_code),
            )
            .await;

        Ok(PlanResponse::from(saved))
    }

    /// 启用/停用套餐。套餐之间相互独立，切换没有联动
    pub async fn toggle_plan(
        &self,
        actor_id: i64,
        id: i64,
        is_active: bool,
    ) -> AppResult<PlanResponse> {
        let plan = plans::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription plan not found".to_string()))?;

        let mut am = plan.into_active_model();
        am.is_active = Set(is_active);
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(&self.pool).await?;

        self.audit_service
            .log_action(
                actor_id,
                "toggle_subscription_plan",
                "subscription_plan",
                Some(updated.id),
                &format!(
                    "Subscription plan '{}' {}",
                    updated.plan_code,
                    if is_active { "activated" } else { "deactivated" }
                ),
            )
            .await;

        Ok(PlanResponse::from(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SavePlanRequest {
        SavePlanRequest {
            name: "Pro".to_string(),
            plan_code: "pro_2024".to_string(),
            billing_cycle: BillingCycle::Monthly,
            amount: 5000,
            duration_days: Some(30),
            grace_days: Some(7),
            description: None,
            is_active: None,
        }
    }

    #[test]
    fn test_valid_plan_input() {
        assert!(validate_plan_input(&request()).is_empty());
    }

    #[test]
    fn test_plan_code_pattern() {
        let mut req = request();
        req.plan_code = "Pro-2024".to_string();
        assert_eq!(validate_plan_input(&req).len(), 1);

        req.plan_code = "ab".to_string(); // 太短
        assert_eq!(validate_plan_input(&req).len(), 1);

        req.plan_code = "a".repeat(41); // 太长
        assert_eq!(validate_plan_input(&req).len(), 1);
    }

    #[test]
    fn test_lifetime_plan_needs_no_duration() {
        let mut req = request();
        req.billing_cycle = BillingCycle::Lifetime;
        req.duration_days = None;
        assert!(validate_plan_input(&req).is_empty());
    }

    #[test]
    fn test_non_lifetime_plan_requires_duration() {
        let mut req = request();
        req.duration_days = None;
        assert_eq!(validate_plan_input(&req).len(), 1);

        req.duration_days = Some(0);
        assert_eq!(validate_plan_input(&req).len(), 1);
    }

    #[test]
    fn test_errors_are_collected_not_short_circuited() {
        let req = SavePlanRequest {
            name: "  ".to_string(),
            plan_code: "BAD CODE".to_string(),
            billing_cycle: BillingCycle::Termly,
            amount: -1,
            duration_days: None,
            grace_days: Some(-3),
            description: None,
            is_active: None,
        };
        let errors = validate_plan_input(&req);
        assert_eq!(errors.len(), 5);
    }
}
