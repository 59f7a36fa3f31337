pub use sea_orm_migration::prelude::*;

mod m20250604_000001_initial;
mod m20250618_000001_add_subscription_plans;
mod m20250618_000002_add_subscription_bank_accounts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250604_000001_initial::Migration),
            Box::new(m20250618_000001_add_subscription_plans::Migration),
            Box::new(m20250618_000002_add_subscription_bank_accounts::Migration),
        ]
    }
}
