//! Leave request lifecycle: submission, cancellation and manager decisions.

use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    model::{
        leave_request::{
            LeaveApplication, LeaveRequest, LeaveStatus, LeaveWithEmployee, NewLeave, Verdict, inclusive_days,
        },
        user::LeaveBalance,
    },
    store::LeaveStore,
};

fn request_not_found() -> AppError {
    AppError::NotFound("Request not found".into())
}

fn already_processed() -> AppError {
    AppError::InvalidState("Request already processed".into())
}

fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Creates a pending request if the user's balance covers the whole span.
/// Nothing is deducted until approval.
pub async fn submit(
    store: &dyn LeaveStore,
    user_id: u64,
    application: LeaveApplication,
) -> AppResult<LeaveRequest> {
    let total_days = inclusive_days(application.start_date, application.end_date)?;

    let reason = application.reason.trim();
    if reason.is_empty() {
        return Err(AppError::validation("reason must not be empty"));
    }

    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !user.balance.covers(application.leave_type, total_days) {
        info!(
            user_id,
            leave_type = %application.leave_type,
            total_days,
            available = user.balance.get(application.leave_type),
            "Leave request refused: insufficient balance"
        );
        return Err(AppError::InsufficientBalance);
    }

    let leave = store
        .insert_leave(NewLeave {
            user_id,
            leave_type: application.leave_type,
            start_date: application.start_date,
            end_date: application.end_date,
            total_days,
            reason: reason.to_string(),
        })
        .await?;

    info!(leave_id = leave.id, user_id, total_days, "Leave request submitted");
    Ok(leave)
}

/// Self-service withdrawal of a pending request.
pub async fn cancel(store: &dyn LeaveStore, leave_id: u64, user_id: u64) -> AppResult<()> {
    let leave = store.find_leave(leave_id).await?.ok_or_else(request_not_found)?;

    if leave.user_id != user_id {
        return Err(AppError::Forbidden("Not authorized".into()));
    }
    if !leave.status.is_pending() {
        return Err(AppError::InvalidState("Can only cancel pending requests".into()));
    }

    // A manager may have decided between the read and the delete.
    if !store.delete_pending_leave(leave_id).await? {
        warn!(leave_id, "Cancellation lost race with a decision");
        return Err(AppError::InvalidState("Can only cancel pending requests".into()));
    }

    info!(leave_id, user_id, "Leave request cancelled");
    Ok(())
}

async fn decide(
    store: &dyn LeaveStore,
    leave_id: u64,
    verdict: Verdict,
    manager_comment: Option<String>,
) -> AppResult<LeaveRequest> {
    let leave = store.find_leave(leave_id).await?.ok_or_else(request_not_found)?;
    if !leave.status.is_pending() {
        return Err(already_processed());
    }

    let decided = store
        .decide_leave(leave_id, verdict, normalize_comment(manager_comment))
        .await?
        .ok_or_else(already_processed)?;

    info!(
        leave_id,
        user_id = decided.user_id,
        status = %decided.status,
        total_days = decided.total_days,
        "Leave request decided"
    );
    Ok(decided)
}

/// Marks the request approved and deducts `total_days` from the owner's balance.
pub async fn approve(
    store: &dyn LeaveStore,
    leave_id: u64,
    manager_comment: Option<String>,
) -> AppResult<LeaveRequest> {
    decide(store, leave_id, Verdict::Approve, manager_comment).await
}

pub async fn reject(
    store: &dyn LeaveStore,
    leave_id: u64,
    manager_comment: Option<String>,
) -> AppResult<LeaveRequest> {
    decide(store, leave_id, Verdict::Reject, manager_comment).await
}

pub async fn list_mine(store: &dyn LeaveStore, user_id: u64) -> AppResult<Vec<LeaveRequest>> {
    store.list_leaves_for_user(user_id).await
}

pub async fn list_pending(store: &dyn LeaveStore) -> AppResult<Vec<LeaveWithEmployee>> {
    store.list_leaves_with_employee(Some(LeaveStatus::Pending)).await
}

pub async fn list_all(store: &dyn LeaveStore) -> AppResult<Vec<LeaveWithEmployee>> {
    store.list_leaves_with_employee(None).await
}

pub async fn balance(store: &dyn LeaveStore, user_id: u64) -> AppResult<LeaveBalance> {
    store
        .find_user(user_id)
        .await?
        .map(|user| user.balance)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
