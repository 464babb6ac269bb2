use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::LeaveStore;
use crate::{
    error::{AppError, AppResult},
    model::{
        leave_request::{
            EmployeeSummary, LeaveRequest, LeaveStatus, LeaveWithEmployee, NewLeave, Verdict,
            sort_newest_first,
        },
        role::Role,
        user::{LeaveBalance, NewUser, User},
    },
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<u64, User>,
    leaves: BTreeMap<u64, LeaveRequest>,
    next_user_id: u64,
    next_leave_id: u64,
}

/// Process-local store. Every mutation runs inside one lock, so the
/// status check and the balance write cannot interleave with another call.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }
}

fn summary(user: &User) -> EmployeeSummary {
    EmployeeSummary {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut tables = self.lock()?;
        let email = new_user.email.to_lowercase();
        if tables.users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            name: new_user.name,
            email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            balance: LeaveBalance::default(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: u64) -> AppResult<Option<User>> {
        Ok(self.lock()?.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self.lock()?.users.values().find(|u| u.email == email).cloned())
    }

    async fn count_employees(&self) -> AppResult<i64> {
        let tables = self.lock()?;
        Ok(tables.users.values().filter(|u| u.role == Role::Employee).count() as i64)
    }

    async fn insert_leave(&self, new_leave: NewLeave) -> AppResult<LeaveRequest> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&new_leave.user_id) {
            return Err(AppError::NotFound("User not found".into()));
        }

        tables.next_leave_id += 1;
        let leave = LeaveRequest {
            id: tables.next_leave_id,
            user_id: new_leave.user_id,
            leave_type: new_leave.leave_type,
            start_date: new_leave.start_date,
            end_date: new_leave.end_date,
            total_days: new_leave.total_days,
            reason: new_leave.reason,
            status: LeaveStatus::Pending,
            manager_comment: None,
            created_at: Utc::now(),
        };
        tables.leaves.insert(leave.id, leave.clone());
        Ok(leave)
    }

    async fn find_leave(&self, leave_id: u64) -> AppResult<Option<LeaveRequest>> {
        Ok(self.lock()?.leaves.get(&leave_id).cloned())
    }

    async fn list_leaves_for_user(&self, user_id: u64) -> AppResult<Vec<LeaveRequest>> {
        let tables = self.lock()?;
        let mut leaves: Vec<LeaveRequest> = tables
            .leaves
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut leaves, |l| l);
        Ok(leaves)
    }

    async fn list_leaves_with_employee(
        &self,
        status: Option<LeaveStatus>,
    ) -> AppResult<Vec<LeaveWithEmployee>> {
        let tables = self.lock()?;
        let mut rows: Vec<LeaveWithEmployee> = tables
            .leaves
            .values()
            .filter(|l| status.is_none_or(|s| l.status == s))
            .filter_map(|l| {
                tables.users.get(&l.user_id).map(|owner| LeaveWithEmployee {
                    request: l.clone(),
                    employee: summary(owner),
                })
            })
            .collect();
        sort_newest_first(&mut rows, |row| &row.request);
        Ok(rows)
    }

    async fn delete_pending_leave(&self, leave_id: u64) -> AppResult<bool> {
        let mut tables = self.lock()?;
        match tables.leaves.get(&leave_id) {
            Some(leave) if leave.status.is_pending() => {
                tables.leaves.remove(&leave_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn decide_leave(
        &self,
        leave_id: u64,
        verdict: Verdict,
        manager_comment: Option<String>,
    ) -> AppResult<Option<LeaveRequest>> {
        let mut guard = self.lock()?;
        let tables = &mut *guard;

        let Some(leave) = tables.leaves.get_mut(&leave_id) else {
            return Ok(None);
        };
        if !leave.status.is_pending() {
            return Ok(None);
        }

        if verdict.deducts_balance() {
            let owner = tables
                .users
                .get_mut(&leave.user_id)
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;
            if !owner.balance.try_deduct(leave.leave_type, leave.total_days) {
                return Err(AppError::InsufficientBalance);
            }
        }

        leave.status = verdict.status();
        leave.manager_comment = manager_comment;
        Ok(Some(leave.clone()))
    }

    async fn count_leaves_by_status(&self, status: LeaveStatus) -> AppResult<i64> {
        let tables = self.lock()?;
        Ok(tables.leaves.values().filter(|l| l.status == status).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::LeaveType;
    use chrono::NaiveDate;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Jane".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: Role::Employee,
        }
    }

    fn new_leave(user_id: u64, days: i32) -> NewLeave {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        NewLeave {
            user_id,
            leave_type: LeaveType::Annual,
            start_date: start,
            end_date: start + chrono::Duration::days(i64::from(days) - 1),
            total_days: days,
            reason: "Trip".into(),
        }
    }

    #[actix_web::test]
    async fn email_is_unique_case_insensitively() {
        let store = MemoryStore::new();
        store.create_user(new_user("jane@company.com")).await.unwrap();

        let err = store.create_user(new_user("JANE@company.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn second_decision_is_refused() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("jane@company.com")).await.unwrap();
        let leave = store.insert_leave(new_leave(user.id, 4)).await.unwrap();

        let first = store.decide_leave(leave.id, Verdict::Approve, None).await.unwrap();
        assert_eq!(first.unwrap().status, LeaveStatus::Approved);

        let second = store.decide_leave(leave.id, Verdict::Approve, None).await.unwrap();
        assert!(second.is_none());

        let owner = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(owner.balance.annual, 16);
    }

    #[actix_web::test]
    async fn approval_cannot_overdraw() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("jane@company.com")).await.unwrap();
        let a = store.insert_leave(new_leave(user.id, 15)).await.unwrap();
        let b = store.insert_leave(new_leave(user.id, 10)).await.unwrap();

        store.decide_leave(a.id, Verdict::Approve, None).await.unwrap();
        let err = store.decide_leave(b.id, Verdict::Approve, None).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance));

        let still_pending = store.find_leave(b.id).await.unwrap().unwrap();
        assert_eq!(still_pending.status, LeaveStatus::Pending);
    }

    #[actix_web::test]
    async fn only_pending_requests_are_deleted() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("jane@company.com")).await.unwrap();
        let pending = store.insert_leave(new_leave(user.id, 1)).await.unwrap();
        let rejected = store.insert_leave(new_leave(user.id, 1)).await.unwrap();
        store.decide_leave(rejected.id, Verdict::Reject, None).await.unwrap();

        assert!(store.delete_pending_leave(pending.id).await.unwrap());
        assert!(!store.delete_pending_leave(rejected.id).await.unwrap());
        assert!(!store.delete_pending_leave(999).await.unwrap());
    }
}
