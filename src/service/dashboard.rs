use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, model::leave_request::LeaveStatus, store::LeaveStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[schema(example = 42)]
    pub total_employees: i64,
    #[schema(example = 3)]
    pub pending_requests: i64,
    #[schema(example = 17)]
    pub approved_requests: i64,
    #[schema(example = 2)]
    pub rejected_requests: i64,
}

/// Recomputed on every call.
pub async fn stats(store: &dyn LeaveStore) -> AppResult<DashboardStats> {
    Ok(DashboardStats {
        total_employees: store.count_employees().await?,
        pending_requests: store.count_leaves_by_status(LeaveStatus::Pending).await?,
        approved_requests: store.count_leaves_by_status(LeaveStatus::Approved).await?,
        rejected_requests: store.count_leaves_by_status(LeaveStatus::Rejected).await?,
    })
}
