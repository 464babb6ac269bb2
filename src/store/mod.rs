//! Persistence seam for users and leave requests.
//!
//! Handlers and services only see [`LeaveStore`]; the MySQL and in-memory
//! backends both guarantee that a decision or cancellation only applies to a
//! request that is still pending at the moment of the write.

use async_trait::async_trait;

use crate::{
    error::AppResult,
    model::{
        leave_request::{LeaveRequest, LeaveStatus, LeaveWithEmployee, NewLeave, Verdict},
        user::{NewUser, User},
    },
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_user(&self, user_id: u64) -> AppResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn count_employees(&self) -> AppResult<i64>;

    async fn insert_leave(&self, new_leave: NewLeave) -> AppResult<LeaveRequest>;

    async fn find_leave(&self, leave_id: u64) -> AppResult<Option<LeaveRequest>>;

    /// Requests owned by `user_id`, newest first.
    async fn list_leaves_for_user(&self, user_id: u64) -> AppResult<Vec<LeaveRequest>>;

    /// All requests (optionally one status) joined with their owner, newest first.
    async fn list_leaves_with_employee(
        &self,
        status: Option<LeaveStatus>,
    ) -> AppResult<Vec<LeaveWithEmployee>>;

    /// Deletes the request only if it is still pending. Returns whether a row went away.
    async fn delete_pending_leave(&self, leave_id: u64) -> AppResult<bool>;

    /// Moves a pending request to the verdict's status and stores the comment.
    /// An approval deducts the owner's balance in the same atomic step and fails
    /// with `InsufficientBalance` if that would go negative. Returns `None` when
    /// the request was no longer pending.
    async fn decide_leave(
        &self,
        leave_id: u64,
        verdict: Verdict,
        manager_comment: Option<String>,
    ) -> AppResult<Option<LeaveRequest>>;

    async fn count_leaves_by_status(&self, status: LeaveStatus) -> AppResult<i64>;
}
