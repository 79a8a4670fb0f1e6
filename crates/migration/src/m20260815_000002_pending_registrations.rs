use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PendingRegistrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingRegistrations::Token)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::Email)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::FullName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::PasswordHash)
                            .binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::Salt)
                            .binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::PasswordIterations)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingRegistrations::ExpiresAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pending_registrations_email")
                    .table(PendingRegistrations::Table)
                    .col(PendingRegistrations::Email)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let _ = manager
            .drop_index(
                Index::drop()
                    .name("idx_pending_registrations_email")
                    .to_owned(),
            )
            .await;

        manager
            .drop_table(
                Table::drop()
                    .table(PendingRegistrations::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum PendingRegistrations {
    Table,
    Token,
    Email,
    FullName,
    PasswordHash,
    Salt,
    PasswordIterations,
    CreatedAt,
    ExpiresAt,
}
