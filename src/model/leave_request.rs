use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Sick,
    Casual,
    Annual,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn is_pending(self) -> bool {
        self == LeaveStatus::Pending
    }
}

/// A manager's decision on a pending request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    pub fn status(self) -> LeaveStatus {
        match self {
            Verdict::Approve => LeaveStatus::Approved,
            Verdict::Reject => LeaveStatus::Rejected,
        }
    }

    pub fn deducts_balance(self) -> bool {
        matches!(self, Verdict::Approve)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub user_id: u64,
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = 5)]
    pub total_days: i32,
    #[schema(example = "Family trip")]
    pub reason: String,
    pub status: LeaveStatus,
    #[schema(example = "Enjoy", nullable = true)]
    pub manager_comment: Option<String>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplication {
    #[schema(example = "annual")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family trip")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDecision {
    #[schema(example = "Team conflict", nullable = true)]
    pub manager_comment: Option<String>,
}

/// Insert payload; `total_days` is already derived and validated.
#[derive(Debug, Clone)]
pub struct NewLeave {
    pub user_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct EmployeeSummary {
    #[schema(example = 1000)]
    pub id: u64,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane@company.com")]
    pub email: String,
}

/// Manager-facing row: the request plus who filed it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct LeaveWithEmployee {
    #[serde(flatten)]
    pub request: LeaveRequest,
    pub employee: EmployeeSummary,
}

/// Inclusive calendar-day count between two dates.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> AppResult<i32> {
    if end < start {
        return Err(AppError::validation("endDate cannot be before startDate"));
    }
    let span = (end - start).num_days() + 1;
    i32::try_from(span).map_err(|_| AppError::validation("Leave span is too long"))
}

/// Newest first; ties fall back to the higher id.
pub fn sort_newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> &LeaveRequest,
{
    items.sort_by(|a, b| {
        let (a, b) = (key(a), key(b));
        b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn counts_both_ends() {
        assert_eq!(inclusive_days(date("2024-01-01"), date("2024-01-05")).unwrap(), 5);
        assert_eq!(inclusive_days(date("2024-03-10"), date("2024-03-10")).unwrap(), 1);
        assert_eq!(inclusive_days(date("2024-02-28"), date("2024-03-01")).unwrap(), 3);
    }

    #[test]
    fn end_before_start_is_a_validation_error() {
        let err = inclusive_days(date("2024-01-05"), date("2024-01-01")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn verdicts_map_to_terminal_states() {
        assert_eq!(Verdict::Approve.status(), LeaveStatus::Approved);
        assert_eq!(Verdict::Reject.status(), LeaveStatus::Rejected);
        assert!(Verdict::Approve.deducts_balance());
        assert!(!Verdict::Reject.deducts_balance());
    }

    #[test]
    fn enums_round_trip_through_storage_names() {
        assert_eq!(LeaveType::from_str("casual").unwrap(), LeaveType::Casual);
        assert_eq!(LeaveStatus::Rejected.as_ref(), "rejected");
        assert!(LeaveType::from_str("unpaid").is_err());
    }

    #[test]
    fn employee_is_embedded_next_to_request_fields() {
        let row = LeaveWithEmployee {
            request: LeaveRequest {
                id: 7,
                user_id: 3,
                leave_type: LeaveType::Annual,
                start_date: date("2024-01-01"),
                end_date: date("2024-01-02"),
                total_days: 2,
                reason: "Trip".into(),
                status: LeaveStatus::Pending,
                manager_comment: None,
                created_at: Utc::now(),
            },
            employee: EmployeeSummary {
                id: 3,
                name: "Jane".into(),
                email: "jane@company.com".into(),
            },
        };

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["leaveType"], "annual");
        assert_eq!(value["totalDays"], 2);
        assert_eq!(value["employee"]["email"], "jane@company.com");
    }
}
