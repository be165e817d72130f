use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(
                        ColumnDef::new(Users::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 工作区表
        manager
            .create_table(
                Table::create()
                    .table(Workspaces::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Workspaces::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Workspaces::OwnerId).big_integer().not_null())
                    .col(ColumnDef::new(Workspaces::Name).string().not_null())
                    .col(ColumnDef::new(Workspaces::Description).text().null())
                    .col(
                        ColumnDef::new(Workspaces::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Workspaces::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Workspaces::Table, Workspaces::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 文件夹表
        manager
            .create_table(
                Table::create()
                    .table(Folders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Folders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Folders::WorkspaceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Folders::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Folders::ParentId).big_integer().null())
                    .col(ColumnDef::new(Folders::Name).string().not_null())
                    .col(ColumnDef::new(Folders::Description).text().null())
                    .col(ColumnDef::new(Folders::Labels).text().not_null())
                    .col(ColumnDef::new(Folders::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Folders::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Folders::Table, Folders::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // 创建者被删除前，存储层会把记录转交给工作区所有者
                    .foreign_key(
                        ForeignKey::create()
                            .from(Folders::Table, Folders::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Folders::Table, Folders::ParentId)
                            .to(Folders::Table, Folders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 文件表
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Files::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Files::WorkspaceId).big_integer().not_null())
                    .col(ColumnDef::new(Files::FolderId).big_integer().null())
                    .col(ColumnDef::new(Files::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Files::Name).string().not_null())
                    .col(ColumnDef::new(Files::Description).text().null())
                    .col(ColumnDef::new(Files::Labels).text().not_null())
                    .col(
                        ColumnDef::new(Files::StoredName)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Files::FileSize).big_integer().not_null())
                    .col(ColumnDef::new(Files::ContentType).string().not_null())
                    .col(
                        ColumnDef::new(Files::DownloadToken)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Files::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Files::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Files::Table, Files::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Files::Table, Files::FolderId)
                            .to(Folders::Table, Folders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // 创建者被删除前，存储层会把记录转交给工作区所有者
                    .foreign_key(
                        ForeignKey::create()
                            .from(Files::Table, Files::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // 审批表
        manager
            .create_table(
                Table::create()
                    .table(Approvals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Approvals::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Approvals::FileId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Approvals::ApproverId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Approvals::AssignerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Approvals::Status).string().not_null())
                    .col(ColumnDef::new(Approvals::RequestNote).text().null())
                    .col(ColumnDef::new(Approvals::Remarks).text().null())
                    .col(
                        ColumnDef::new(Approvals::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    // 仅在 pending 时等于 file_id，唯一约束保证同一文件最多一个待审批
                    .col(
                        ColumnDef::new(Approvals::PendingFileId)
                            .big_integer()
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Approvals::RequestedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Approvals::DecidedAt).big_integer().null())
                    .col(
                        ColumnDef::new(Approvals::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Approvals::Table, Approvals::FileId)
                            .to(Files::Table, Files::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Approvals::Table, Approvals::ApproverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Approvals::Table, Approvals::AssignerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 通知表
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Notifications::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::NotificationType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Content).text().null())
                    .col(ColumnDef::new(Notifications::Link).string().null())
                    .col(ColumnDef::new(Notifications::ReferenceType).string().null())
                    .col(
                        ColumnDef::new(Notifications::ReferenceId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 新手引导状态表
        manager
            .create_table(
                Table::create()
                    .table(OnboardingStatuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OnboardingStatuses::UserId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OnboardingStatuses::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(OnboardingStatuses::CompletedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OnboardingStatuses::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OnboardingStatuses::Table, OnboardingStatuses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_workspaces_owner_name")
                    .table(Workspaces::Table)
                    .col(Workspaces::OwnerId)
                    .col(Workspaces::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_folders_workspace_parent")
                    .table(Folders::Table)
                    .col(Folders::WorkspaceId)
                    .col(Folders::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_files_workspace_folder")
                    .table(Files::Table)
                    .col(Files::WorkspaceId)
                    .col(Files::FolderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_approvals_approver_status")
                    .table(Approvals::Table)
                    .col(Approvals::ApproverId)
                    .col(Approvals::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_approvals_assigner_status")
                    .table(Approvals::Table)
                    .col(Approvals::AssignerId)
                    .col(Approvals::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_approvals_file_id")
                    .table(Approvals::Table)
                    .col(Approvals::FileId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_user_read")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::IsRead)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OnboardingStatuses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Approvals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Folders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Workspaces::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    DisplayName,
    IsAdmin,
    IsActive,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Workspaces {
    #[sea_orm(iden = "workspaces")]
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Folders {
    #[sea_orm(iden = "folders")]
    Table,
    Id,
    WorkspaceId,
    UserId,
    ParentId,
    Name,
    Description,
    Labels,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Files {
    #[sea_orm(iden = "files")]
    Table,
    Id,
    WorkspaceId,
    FolderId,
    UserId,
    Name,
    Description,
    Labels,
    StoredName,
    FileSize,
    ContentType,
    DownloadToken,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Approvals {
    #[sea_orm(iden = "approvals")]
    Table,
    Id,
    FileId,
    ApproverId,
    AssignerId,
    Status,
    RequestNote,
    Remarks,
    Version,
    PendingFileId,
    RequestedAt,
    DecidedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    #[sea_orm(iden = "notifications")]
    Table,
    Id,
    UserId,
    NotificationType,
    Title,
    Content,
    Link,
    ReferenceType,
    ReferenceId,
    IsRead,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OnboardingStatuses {
    #[sea_orm(iden = "onboarding_statuses")]
    Table,
    UserId,
    Completed,
    CompletedAt,
    UpdatedAt,
}
