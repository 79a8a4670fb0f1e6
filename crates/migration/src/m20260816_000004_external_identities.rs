use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExternalIdentities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExternalIdentities::Provider)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExternalIdentities::ProviderAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExternalIdentities::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExternalIdentities::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ExternalIdentities::Provider)
                            .col(ExternalIdentities::ProviderAccountId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_external_identities_user_id")
                    .table(ExternalIdentities::Table)
                    .col(ExternalIdentities::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let _ = manager
            .drop_index(
                Index::drop()
                    .name("idx_external_identities_user_id")
                    .to_owned(),
            )
            .await;

        manager
            .drop_table(Table::drop().table(ExternalIdentities::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ExternalIdentities {
    Table,
    Provider,
    ProviderAccountId,
    UserId,
    CreatedAt,
}
