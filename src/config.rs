use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    MySql,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(StoreBackend::MySql),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("unknown STORE_BACKEND '{other}', expected mysql or memory"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,

    /// Browser origins allowed to call the API with credentials.
    pub cors_origins: Vec<String>,
}

const LOCAL_FRONTEND_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:3001"];

/// Local dev frontends plus the deployed one (`FRONTEND_URL`) and any extra
/// comma-separated `CORS_ORIGINS`.
fn cors_origins(frontend_url: Option<String>, extra: Option<String>) -> Vec<String> {
    let mut origins: Vec<String> = LOCAL_FRONTEND_ORIGINS.iter().map(|o| o.to_string()).collect();
    let configured = frontend_url
        .into_iter()
        .chain(extra.iter().flat_map(|list| list.split(',').map(str::to_string)))
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty());
    for origin in configured {
        if !origins.contains(&origin) {
            origins.push(origin);
        }
    }
    origins
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let store_backend: StoreBackend = var_or("STORE_BACKEND", StoreBackend::MySql)?;
        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::MySql && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORE_BACKEND is mysql");
        }

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            store_backend,
            database_url,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: var_or("ACCESS_TOKEN_TTL", 86_400)?, // default 1 day

            rate_login_per_min: var_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: var_or("RATE_REGISTER_PER_MIN", 30)?,
            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            cors_origins: cors_origins(env::var("FRONTEND_URL").ok(), env::var("CORS_ORIGINS").ok()),
        })
    }

    /// Settings for in-process runs that never touch the environment.
    pub fn for_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            jwt_secret: jwt_secret.into(),
            access_token_ttl: 3600,
            rate_login_per_min: 10_000,
            rate_register_per_min: 10_000,
            rate_protected_per_min: 10_000,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
            cors_origins: cors_origins(None, None),
        }
    }
}
