use crate::model::leave_request::{
    EmployeeSummary, LeaveApplication, LeaveRequest, LeaveStatus, LeaveType, LeaveWithEmployee,
    ManagerDecision,
};
use crate::model::role::Role;
use crate::model::user::{LeaveBalance, UserProfile};
use crate::models::{AuthResponse, LoginReqDto, RegisterReq};
use crate::service::dashboard::DashboardStats;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Employee Leave Management

Employees submit leave requests against a per-category balance
(annual, sick, casual). Managers approve or reject them; the balance is
deducted only when a request is approved.

### Security
Endpoints outside `/auth` and `/health` require a **JWT Bearer** token.
Review and dashboard endpoints are restricted to the **manager** role.
"#,
    ),
    paths(
        crate::api::health::health,

        crate::auth::handlers::register,
        crate::auth::handlers::login,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::my_requests,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::get_balance,
        crate::api::leave_request::all_requests,
        crate::api::leave_request::pending_requests,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::dashboard::get_stats
    ),
    components(
        schemas(
            LeaveType,
            LeaveStatus,
            Role,
            LeaveApplication,
            LeaveRequest,
            LeaveWithEmployee,
            EmployeeSummary,
            ManagerDecision,
            LeaveBalance,
            UserProfile,
            RegisterReq,
            LoginReqDto,
            AuthResponse,
            DashboardStats
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Leave", description = "Leave request lifecycle"),
        (name = "Dashboard", description = "Manager statistics"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_endpoint() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/auth/register",
            "/api/leaves",
            "/api/leaves/{leave_id}/approve",
            "/api/dashboard/stats",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {expected}");
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn approve_documents_balance_recheck() {
        let doc: serde_json::Value = serde_json::from_str(&ApiDoc::openapi().to_json().unwrap()).unwrap();
        let responses = &doc["paths"]["/api/leaves/{leave_id}/approve"]["put"]["responses"];

        let bad_request = responses["400"]["description"].as_str().unwrap();
        assert!(bad_request.contains("balance"), "{bad_request}");
        assert_eq!(
            responses["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/LeaveRequest"
        );
    }
}
