use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 新手引导完成状态，没有记录时视为未完成
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "onboarding.ts")]
pub struct OnboardingStatus {
    pub completed: bool,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "onboarding.ts")]
pub struct UpdateOnboardingRequest {
    pub completed: bool,
}
