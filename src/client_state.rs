//! Serializable client-side state for a UI consuming the JSON API.
//!
//! State only changes through [`ClientState::reduce`], one [`Action`] per
//! finished API call, so a UI can persist, replay or diff it.

use serde::{Deserialize, Serialize};

use crate::{
    model::{
        leave_request::{LeaveRequest, LeaveWithEmployee},
        user::{LeaveBalance, UserProfile},
    },
    models::AuthResponse,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSlice {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeavesSlice {
    pub my_requests: Vec<LeaveRequest>,
    pub all_requests: Vec<LeaveWithEmployee>,
    pub pending_requests: Vec<LeaveWithEmployee>,
    pub balance: Option<LeaveBalance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientState {
    pub auth: AuthSlice,
    pub leaves: LeavesSlice,
    pub loading: bool,
    pub error: Option<String>,
}

/// Outcome of an API call, or the start/failure of one.
#[derive(Debug, Clone)]
pub enum Action {
    Started,
    Failed(String),
    LoggedIn(AuthResponse),
    Registered(AuthResponse),
    LoggedOut,
    MyRequestsLoaded(Vec<LeaveRequest>),
    LeaveApplied(LeaveRequest),
    LeaveCancelled(u64),
    BalanceLoaded(LeaveBalance),
    AllRequestsLoaded(Vec<LeaveWithEmployee>),
    PendingRequestsLoaded(Vec<LeaveWithEmployee>),
    LeaveDecided(LeaveRequest),
}

impl ClientState {
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::Started => {
                self.loading = true;
                self.error = None;
                return self;
            }
            Action::Failed(message) => {
                self.loading = false;
                self.error = Some(message);
                return self;
            }
            Action::LoggedIn(resp) | Action::Registered(resp) => {
                self.auth = AuthSlice {
                    user: Some(resp.user),
                    token: Some(resp.token),
                };
            }
            Action::LoggedOut => {
                self = ClientState::default();
            }
            Action::MyRequestsLoaded(requests) => self.leaves.my_requests = requests,
            Action::LeaveApplied(request) => self.leaves.my_requests.insert(0, request),
            Action::LeaveCancelled(id) => self.leaves.my_requests.retain(|r| r.id != id),
            Action::BalanceLoaded(balance) => self.leaves.balance = Some(balance),
            Action::AllRequestsLoaded(rows) => self.leaves.all_requests = rows,
            Action::PendingRequestsLoaded(rows) => self.leaves.pending_requests = rows,
            Action::LeaveDecided(decided) => {
                self.leaves.pending_requests.retain(|row| row.request.id != decided.id);
                if let Some(row) = self
                    .leaves
                    .all_requests
                    .iter_mut()
                    .find(|row| row.request.id == decided.id)
                {
                    row.request = decided;
                }
            }
        }
        self.loading = false;
        self.error = None;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        leave_request::{EmployeeSummary, LeaveStatus, LeaveType},
        role::Role,
    };
    use chrono::{NaiveDate, Utc};

    fn request(id: u64) -> LeaveRequest {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        LeaveRequest {
            id,
            user_id: 1,
            leave_type: LeaveType::Annual,
            start_date: day,
            end_date: day,
            total_days: 1,
            reason: "Trip".into(),
            status: LeaveStatus::Pending,
            manager_comment: None,
            created_at: Utc::now(),
        }
    }

    fn row(id: u64) -> LeaveWithEmployee {
        LeaveWithEmployee {
            request: request(id),
            employee: EmployeeSummary {
                id: 1,
                name: "Jane".into(),
                email: "jane@company.com".into(),
            },
        }
    }

    fn login() -> Action {
        Action::LoggedIn(AuthResponse {
            token: "token".into(),
            user: UserProfile {
                id: 1,
                name: "Jane".into(),
                email: "jane@company.com".into(),
                role: Role::Employee,
                leave_balance: LeaveBalance::default(),
            },
        })
    }

    #[test]
    fn applied_requests_are_prepended_and_cancelled_ones_removed() {
        let state = ClientState::default()
            .reduce(login())
            .reduce(Action::MyRequestsLoaded(vec![request(1)]))
            .reduce(Action::LeaveApplied(request(2)));
        assert!(state.is_authenticated());
        let ids: Vec<u64> = state.leaves.my_requests.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let state = state.reduce(Action::LeaveCancelled(1));
        assert_eq!(state.leaves.my_requests.len(), 1);
        assert_eq!(state.leaves.my_requests[0].id, 2);
    }

    #[test]
    fn decisions_leave_the_pending_queue() {
        let mut approved = request(5);
        approved.status = LeaveStatus::Approved;

        let state = ClientState::default()
            .reduce(Action::PendingRequestsLoaded(vec![row(5), row(6)]))
            .reduce(Action::AllRequestsLoaded(vec![row(5), row(6)]))
            .reduce(Action::LeaveDecided(approved));

        assert_eq!(state.leaves.pending_requests.len(), 1);
        assert_eq!(state.leaves.pending_requests[0].request.id, 6);
        assert_eq!(state.leaves.all_requests[0].request.status, LeaveStatus::Approved);
    }

    #[test]
    fn loading_and_errors_track_the_last_outcome() {
        let state = ClientState::default().reduce(Action::Started);
        assert!(state.loading);

        let state = state.reduce(Action::Failed("Insufficient leave balance".into()));
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Insufficient leave balance"));

        let state = state.reduce(Action::BalanceLoaded(LeaveBalance::default()));
        assert!(state.error.is_none());
        assert_eq!(state.leaves.balance, Some(LeaveBalance::default()));
    }

    #[test]
    fn logout_clears_everything() {
        let state = ClientState::default()
            .reduce(login())
            .reduce(Action::LeaveApplied(request(1)))
            .reduce(Action::LoggedOut);
        assert_eq!(state, ClientState::default());
    }
}
