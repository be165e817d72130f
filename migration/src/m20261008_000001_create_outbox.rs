use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 事务性发件箱 ====================
        manager
            .create_table(
                Table::create()
                    .table(OutboxEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OutboxEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OutboxEvents::EventType).string().not_null())
                    .col(
                        ColumnDef::new(OutboxEvents::AggregateType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OutboxEvents::AggregateId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OutboxEvents::Payload).text().not_null())
                    .col(ColumnDef::new(OutboxEvents::Status).string().not_null())
                    .col(
                        ColumnDef::new(OutboxEvents::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(OutboxEvents::LastError).text().null())
                    .col(
                        ColumnDef::new(OutboxEvents::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OutboxEvents::DispatchedAt)
                            .big_integer()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_outbox_events_status_id")
                    .table(OutboxEvents::Table)
                    .col(OutboxEvents::Status)
                    .col(OutboxEvents::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OutboxEvents::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum OutboxEvents {
    #[sea_orm(iden = "outbox_events")]
    Table,
    Id,
    EventType,
    AggregateType,
    AggregateId,
    Payload,
    Status,
    Attempts,
    LastError,
    CreatedAt,
    DispatchedAt,
}
