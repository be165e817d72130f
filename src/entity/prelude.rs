//! 预导入模块，方便使用

pub use super::approvals::{
    ActiveModel as ApprovalActiveModel, Entity as Approvals, Model as ApprovalModel,
};
pub use super::files::{ActiveModel as FileActiveModel, Entity as Files, Model as FileModel};
pub use super::folders::{
    ActiveModel as FolderActiveModel, Entity as Folders, Model as FolderModel,
};
pub use super::notifications::{
    ActiveModel as NotificationActiveModel, Entity as Notifications, Model as NotificationModel,
};
pub use super::onboarding_statuses::{
    ActiveModel as OnboardingStatusActiveModel, Entity as OnboardingStatuses,
    Model as OnboardingStatusModel,
};
pub use super::outbox_events::{
    ActiveModel as OutboxEventActiveModel, Entity as OutboxEvents, Model as OutboxEventModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
pub use super::workspaces::{
    ActiveModel as WorkspaceActiveModel, Entity as Workspaces, Model as WorkspaceModel,
};
