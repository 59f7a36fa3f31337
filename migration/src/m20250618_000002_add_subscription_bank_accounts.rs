use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum SubscriptionBankAccounts {
    Table,
    Id,
    BankName,
    AccountName,
    AccountNumber,
    PaymentNote,
    IsActive,
    IsPrimary,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionBankAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionBankAccounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionBankAccounts::BankName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionBankAccounts::AccountName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionBankAccounts::AccountNumber)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionBankAccounts::PaymentNote)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionBankAccounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SubscriptionBankAccounts::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SubscriptionBankAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionBankAccounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscription_bank_accounts_primary")
                    .table(SubscriptionBankAccounts::Table)
                    .col(SubscriptionBankAccounts::IsActive)
                    .col(SubscriptionBankAccounts::IsPrimary)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SubscriptionBankAccounts::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
