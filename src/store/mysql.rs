use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use super::LeaveStore;
use crate::{
    error::{AppError, AppResult},
    model::{
        leave_request::{
            EmployeeSummary, LeaveRequest, LeaveStatus, LeaveType, LeaveWithEmployee, NewLeave, Verdict,
        },
        role::Role,
        user::{LeaveBalance, NewUser, User},
    },
};

const USER_COLUMNS: &str = r#"
    id, name, email, password_hash, role,
    annual_balance, sick_balance, casual_balance, created_at
"#;

const LEAVE_COLUMNS: &str = r#"
    id, user_id, leave_type, start_date, end_date,
    total_days, reason, status, manager_comment, created_at
"#;

#[derive(FromRow)]
struct UserRow {
    id: u64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    annual_balance: i32,
    sick_balance: i32,
    casual_balance: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<Self> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: Role::from_str(&row.role)
                .map_err(|_| AppError::internal(format!("unknown role '{}' for user {}", row.role, row.id)))?,
            balance: LeaveBalance {
                annual: row.annual_balance,
                sick: row.sick_balance,
                casual: row.casual_balance,
            },
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    user_id: u64,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_days: i32,
    reason: String,
    status: String,
    manager_comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = AppError;

    fn try_from(row: LeaveRow) -> AppResult<Self> {
        Ok(LeaveRequest {
            id: row.id,
            user_id: row.user_id,
            leave_type: LeaveType::from_str(&row.leave_type).map_err(|_| {
                AppError::internal(format!("unknown leave type '{}' on request {}", row.leave_type, row.id))
            })?,
            start_date: row.start_date,
            end_date: row.end_date,
            total_days: row.total_days,
            reason: row.reason,
            status: LeaveStatus::from_str(&row.status).map_err(|_| {
                AppError::internal(format!("unknown status '{}' on request {}", row.status, row.id))
            })?,
            manager_comment: row.manager_comment,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct LeaveWithEmployeeRow {
    #[sqlx(flatten)]
    leave: LeaveRow,
    employee_name: String,
    employee_email: String,
}

impl TryFrom<LeaveWithEmployeeRow> for LeaveWithEmployee {
    type Error = AppError;

    fn try_from(row: LeaveWithEmployeeRow) -> AppResult<Self> {
        let request = LeaveRequest::try_from(row.leave)?;
        Ok(LeaveWithEmployee {
            employee: EmployeeSummary {
                id: request.user_id,
                name: row.employee_name,
                email: row.employee_email,
            },
            request,
        })
    }
}

/// Column holding the remaining days for a leave type.
fn balance_column(leave_type: LeaveType) -> &'static str {
    match leave_type {
        LeaveType::Annual => "annual_balance",
        LeaveType::Sick => "sick_balance",
        LeaveType::Casual => "casual_balance",
    }
}

fn is_duplicate_key(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23000"),
        _ => false,
    }
}

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_leave<'e, E>(executor: E, leave_id: u64) -> AppResult<Option<LeaveRequest>>
    where
        E: sqlx::Executor<'e, Database = sqlx::MySql>,
    {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
        sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(leave_id)
            .fetch_optional(executor)
            .await?
            .map(LeaveRequest::try_from)
            .transpose()
    }
}

#[async_trait]
impl LeaveStore for MySqlStore {
    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (name, email, password_hash, role, annual_balance, sick_balance, casual_balance)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_user.name)
        .bind(new_user.email.to_lowercase())
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_ref())
        .bind(LeaveBalance::default().annual)
        .bind(LeaveBalance::default().sick)
        .bind(LeaveBalance::default().casual)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::Conflict("Email already registered".into())
            } else {
                AppError::Database(e)
            }
        })?;

        self.find_user(result.last_insert_id())
            .await?
            .ok_or_else(|| AppError::internal("inserted user vanished"))
    }

    async fn find_user(&self, user_id: u64) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn count_employees(&self) -> AppResult<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(Role::Employee.as_ref())
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn insert_leave(&self, new_leave: NewLeave) -> AppResult<LeaveRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (user_id, leave_type, start_date, end_date, total_days, reason, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_leave.user_id)
        .bind(new_leave.leave_type.as_ref())
        .bind(new_leave.start_date)
        .bind(new_leave.end_date)
        .bind(new_leave.total_days)
        .bind(&new_leave.reason)
        .bind(LeaveStatus::Pending.as_ref())
        .execute(&self.pool)
        .await?;

        Self::fetch_leave(&self.pool, result.last_insert_id())
            .await?
            .ok_or_else(|| AppError::internal("inserted leave request vanished"))
    }

    async fn find_leave(&self, leave_id: u64) -> AppResult<Option<LeaveRequest>> {
        Self::fetch_leave(&self.pool, leave_id).await
    }

    async fn list_leaves_for_user(&self, user_id: u64) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(LeaveRequest::try_from)
            .collect()
    }

    async fn list_leaves_with_employee(
        &self,
        status: Option<LeaveStatus>,
    ) -> AppResult<Vec<LeaveWithEmployee>> {
        let where_sql = if status.is_some() { "WHERE l.status = ?" } else { "" };
        let sql = format!(
            r#"
            SELECT
                l.id, l.user_id, l.leave_type, l.start_date, l.end_date,
                l.total_days, l.reason, l.status, l.manager_comment, l.created_at,
                u.name AS employee_name,
                u.email AS employee_email
            FROM leave_requests l
            JOIN users u ON u.id = l.user_id
            {where_sql}
            ORDER BY l.created_at DESC, l.id DESC
            "#
        );

        let mut query = sqlx::query_as::<_, LeaveWithEmployeeRow>(&sql);
        if let Some(status) = status {
            query = query.bind(status.to_string());
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(LeaveWithEmployee::try_from)
            .collect()
    }

    async fn delete_pending_leave(&self, leave_id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = ? AND status = ?")
            .bind(leave_id)
            .bind(LeaveStatus::Pending.as_ref())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn decide_leave(
        &self,
        leave_id: u64,
        verdict: Verdict,
        manager_comment: Option<String>,
    ) -> AppResult<Option<LeaveRequest>> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, manager_comment = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(verdict.status().as_ref())
        .bind(&manager_comment)
        .bind(leave_id)
        .bind(LeaveStatus::Pending.as_ref())
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let Some(leave) = Self::fetch_leave(&mut *tx, leave_id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        if verdict.deducts_balance() {
            let column = balance_column(leave.leave_type);
            let sql = format!("UPDATE users SET {column} = {column} - ? WHERE id = ? AND {column} >= ?");
            let deducted = sqlx::query(&sql)
                .bind(leave.total_days)
                .bind(leave.user_id)
                .bind(leave.total_days)
                .execute(&mut *tx)
                .await?;

            if deducted.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(AppError::InsufficientBalance);
            }
        }

        tx.commit().await?;
        Ok(Some(leave))
    }

    async fn count_leaves_by_status(&self, status: LeaveStatus) -> AppResult<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leave_requests WHERE status = ?")
            .bind(status.as_ref())
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_leave_type_has_a_balance_column() {
        assert_eq!(balance_column(LeaveType::Annual), "annual_balance");
        assert_eq!(balance_column(LeaveType::Sick), "sick_balance");
        assert_eq!(balance_column(LeaveType::Casual), "casual_balance");
    }
}
