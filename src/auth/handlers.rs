use crate::{
    auth::{
        email_cache::EmailCache,
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    error::AppError,
    model::user::{NewUser, UserProfile},
    models::{AuthResponse, LoginReqDto, RegisterReq},
    store::LeaveStore,
};
use actix_web::{HttpResponse, web};
use tracing::{debug, info, instrument};

const MIN_PASSWORD_LEN: usize = 6;

fn validate_registration(req: &RegisterReq) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("A valid email is required"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// User registration handler
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid registration payload"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip_all, fields(email = %payload.email))]
pub async fn register(
    payload: web::Json<RegisterReq>,
    store: web::Data<dyn LeaveStore>,
    emails: web::Data<EmailCache>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    validate_registration(&payload)?;

    let email = payload.email.trim().to_lowercase();
    if emails.is_taken(&email) {
        debug!("Email rejected by cache");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let user = store
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email: email.clone(),
            password_hash: hash_password(&payload.password)?,
            role: payload.role.unwrap_or_default(),
        })
        .await?;
    emails.mark_taken(&email).await;

    let token = generate_access_token(&user, &config.jwt_secret, config.access_token_ttl)?;
    info!(user_id = user.id, role = %user.role, "User registered");

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

/// Login handler
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip_all, fields(email = %payload.email))]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    store: web::Data<dyn LeaveStore>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse, AppError> {
    info!("Login request received");

    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let Some(user) = store.find_user_by_email(payload.email.trim()).await? else {
        info!("Invalid credentials: user not found");
        return Err(invalid());
    };

    if let Err(e) = verify_password(&payload.password, &user.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(invalid());
    }

    let token = generate_access_token(&user, &config.jwt_secret, config.access_token_ttl)?;
    info!(user_id = user.id, "Login successful");

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserProfile::from(&user),
    }))
}
