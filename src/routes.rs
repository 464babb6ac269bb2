use crate::{
    api::{dashboard, health, leave_request},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};
use actix_cors::Cors;
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{
    http::{Method, header},
    middleware::from_fn,
    web,
};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let burst = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(burst)).max(1);
    let cfg: GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

/// Credentialed CORS for the configured frontends. Requests without an
/// `Origin` header (curl, server-to-server) are not affected.
pub fn cors(config: &Config) -> Cors {
    let origins = config.cors_origins.clone();
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            origin
                .to_str()
                .map(|o| origins.iter().any(|allowed| allowed == o))
                .unwrap_or(false)
        })
        .allowed_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allowed_headers([header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600)
}

/// Malformed bodies (bad dates, unknown leave types) become a 400 with our error shape.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::validation(format!("Invalid request body: {err}")).into())
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.app_data(json_config());
    cfg.service(health::index);

    cfg.service(
        web::scope(&config.api_prefix)
            .route("/health", web::get().to(health::health))
            // Public routes
            .service(
                web::scope("/auth")
                    .service(
                        web::resource("/login")
                            .wrap(login_limiter)
                            .route(web::post().to(handlers::login)),
                    )
                    .service(
                        web::resource("/register")
                            .wrap(register_limiter)
                            .route(web::post().to(handlers::register)),
                    ),
            )
            // Protected routes
            .service(
                web::scope("/leaves")
                    .wrap(from_fn(auth_middleware)) // authentication
                    .wrap(protected_limiter.clone()) // rate limiting
                    .service(web::resource("").route(web::post().to(leave_request::create_leave)))
                    .service(
                        web::resource("/my-requests").route(web::get().to(leave_request::my_requests)),
                    )
                    .service(web::resource("/balance").route(web::get().to(leave_request::get_balance)))
                    // manager only
                    .service(web::resource("/all").route(web::get().to(leave_request::all_requests)))
                    .service(
                        web::resource("/pending").route(web::get().to(leave_request::pending_requests)),
                    )
                    // /leaves/{id}
                    .service(web::resource("/{id}").route(web::delete().to(leave_request::cancel_leave)))
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(leave_request::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/dashboard")
                    .wrap(from_fn(auth_middleware))
                    .wrap(protected_limiter)
                    .service(web::resource("/stats").route(web::get().to(dashboard::get_stats))),
            ),
    );
}
