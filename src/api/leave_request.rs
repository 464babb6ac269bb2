use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::leave_request::{LeaveApplication, LeaveRequest, LeaveWithEmployee, ManagerDecision},
    model::user::LeaveBalance,
    service::leave,
    store::LeaveStore,
};
use actix_web::{HttpResponse, web};
use serde_json::json;

type HandlerResult = Result<HttpResponse, AppError>;

/* =========================
Employee self-service
========================= */

/// Submit a leave request
#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body(
        content = LeaveApplication,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request created", body = LeaveRequest),
        (status = 400, description = "Invalid dates or insufficient balance", body = Object, example = json!({
            "message": "Insufficient leave balance"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    payload: web::Json<LeaveApplication>,
) -> HandlerResult {
    let created = leave::submit(store.get_ref(), auth.user_id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// List the caller's own requests, newest first
#[utoipa::path(
    get,
    path = "/api/leaves/my-requests",
    responses(
        (status = 200, description = "Caller's leave requests", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_requests(auth: AuthUser, store: web::Data<dyn LeaveStore>) -> HandlerResult {
    let requests = leave::list_mine(store.get_ref(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// Cancel a pending request
#[utoipa::path(
    delete,
    path = "/api/leaves/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Request cancelled", body = Object, example = json!({
            "message": "Request cancelled"
        })),
        (status = 400, description = "Request is no longer pending"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Request belongs to someone else"),
        (status = 404, description = "Request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    path: web::Path<u64>,
) -> HandlerResult {
    leave::cancel(store.get_ref(), path.into_inner(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Request cancelled" })))
}

/// Current leave balance of the caller
#[utoipa::path(
    get,
    path = "/api/leaves/balance",
    responses(
        (status = 200, description = "Remaining days per leave type", body = LeaveBalance),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_balance(auth: AuthUser, store: web::Data<dyn LeaveStore>) -> HandlerResult {
    let balance = leave::balance(store.get_ref(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(balance))
}

/* =========================
Manager review
========================= */

/// An empty body means no comment; anything else must be a valid decision.
fn parse_decision(body: &[u8]) -> Result<ManagerDecision, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ManagerDecision::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::validation(format!("Invalid request body: {e}")))
}

/// All requests with the owning employee
#[utoipa::path(
    get,
    path = "/api/leaves/all",
    responses(
        (status = 200, description = "Every leave request", body = [LeaveWithEmployee]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn all_requests(auth: AuthUser, store: web::Data<dyn LeaveStore>) -> HandlerResult {
    auth.require_manager()?;
    let requests = leave::list_all(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// Pending requests awaiting a decision
#[utoipa::path(
    get,
    path = "/api/leaves/pending",
    responses(
        (status = 200, description = "Pending leave requests", body = [LeaveWithEmployee]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn pending_requests(auth: AuthUser, store: web::Data<dyn LeaveStore>) -> HandlerResult {
    auth.require_manager()?;
    let requests = leave::list_pending(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// Approve a pending request and deduct the owner's balance
#[utoipa::path(
    put,
    path = "/api/leaves/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    request_body = ManagerDecision,
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 400, description = "Request already processed, malformed body, or the owner's balance no longer covers the request", body = Object, example = json!({
            "message": "Insufficient leave balance"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager only"),
        (status = 404, description = "Request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    path: web::Path<u64>,
    body: web::Bytes,
) -> HandlerResult {
    auth.require_manager()?;
    let comment = parse_decision(&body)?.manager_comment;
    let approved = leave::approve(store.get_ref(), path.into_inner(), comment).await?;
    Ok(HttpResponse::Ok().json(approved))
}

/// Reject a pending request
#[utoipa::path(
    put,
    path = "/api/leaves/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body = ManagerDecision,
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 400, description = "Request already processed or malformed body", body = Object, example = json!({
            "message": "Request already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager only"),
        (status = 404, description = "Request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
    path: web::Path<u64>,
    body: web::Bytes,
) -> HandlerResult {
    auth.require_manager()?;
    let comment = parse_decision(&body)?.manager_comment;
    let rejected = leave::reject(store.get_ref(), path.into_inner(), comment).await?;
    Ok(HttpResponse::Ok().json(rejected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_decision_body_has_no_comment() {
        assert!(parse_decision(b"").unwrap().manager_comment.is_none());
        assert!(parse_decision(b"  \n").unwrap().manager_comment.is_none());
        assert!(parse_decision(b"{}").unwrap().manager_comment.is_none());
    }

    #[test]
    fn decision_body_carries_comment() {
        let decision = parse_decision(br#"{"managerComment":"Team conflict"}"#).unwrap();
        assert_eq!(decision.manager_comment.as_deref(), Some("Team conflict"));
    }

    #[test]
    fn malformed_decision_body_is_a_validation_error() {
        let bodies: [&[u8]; 3] = [br#"{"managerComment":42}"#, b"{not json", b"null"];
        for body in bodies {
            assert!(matches!(parse_decision(body), Err(AppError::Validation(_))));
        }
    }
}
