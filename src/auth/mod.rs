pub mod auth;
pub mod email_cache;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
