use crate::{
    auth::auth::AuthUser,
    error::AppError,
    service::dashboard::{self, DashboardStats},
    store::LeaveStore,
};
use actix_web::{HttpResponse, web};

/// Aggregate counts for the manager dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Employee and request counts", body = DashboardStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn get_stats(
    auth: AuthUser,
    store: web::Data<dyn LeaveStore>,
) -> Result<HttpResponse, AppError> {
    auth.require_manager()?;
    let stats = dashboard::stats(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}
