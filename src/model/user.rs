use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{leave_request::LeaveType, role::Role};

pub const DEFAULT_ANNUAL_DAYS: i32 = 20;
pub const DEFAULT_SICK_DAYS: i32 = 12;
pub const DEFAULT_CASUAL_DAYS: i32 = 10;

/// Remaining days per leave category.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "annual": 20, "sick": 12, "casual": 10 }))]
pub struct LeaveBalance {
    pub annual: i32,
    pub sick: i32,
    pub casual: i32,
}

impl Default for LeaveBalance {
    fn default() -> Self {
        Self {
            annual: DEFAULT_ANNUAL_DAYS,
            sick: DEFAULT_SICK_DAYS,
            casual: DEFAULT_CASUAL_DAYS,
        }
    }
}

impl LeaveBalance {
    pub fn get(&self, leave_type: LeaveType) -> i32 {
        match leave_type {
            LeaveType::Annual => self.annual,
            LeaveType::Sick => self.sick,
            LeaveType::Casual => self.casual,
        }
    }

    pub fn covers(&self, leave_type: LeaveType, days: i32) -> bool {
        self.get(leave_type) >= days
    }

    /// Returns false and leaves the balance untouched when it would go negative.
    pub fn try_deduct(&mut self, leave_type: LeaveType, days: i32) -> bool {
        if !self.covers(leave_type, days) {
            return false;
        }
        let slot = match leave_type {
            LeaveType::Annual => &mut self.annual,
            LeaveType::Sick => &mut self.sick,
            LeaveType::Casual => &mut self.casual,
        };
        *slot -= days;
        true
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub balance: LeaveBalance,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; balances start at the defaults.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// What clients get to see of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane@company.com")]
    pub email: String,
    pub role: Role,
    pub leave_balance: LeaveBalance,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            leave_balance: user.balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let balance = LeaveBalance::default();
        assert_eq!(balance.get(LeaveType::Annual), 20);
        assert_eq!(balance.get(LeaveType::Sick), 12);
        assert_eq!(balance.get(LeaveType::Casual), 10);
    }

    #[test]
    fn deduct_refuses_to_go_negative() {
        let mut balance = LeaveBalance { annual: 3, sick: 2, casual: 0 };
        assert!(balance.try_deduct(LeaveType::Annual, 3));
        assert_eq!(balance.annual, 0);
        assert!(!balance.try_deduct(LeaveType::Sick, 3));
        assert_eq!(balance.sick, 2);
    }
}
