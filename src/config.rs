use std::env;

use actix_web::cookie::Key;

use crate::errors::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://caffe_office.db";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
/// `Key::from` needs at least this many bytes.
const MIN_SESSION_KEY_LEN: usize = 64;

/// Process settings, read from the environment (and `.env` via dotenvy).
#[derive(Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session_key: Key,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_owned());
        let port = match env::var("PORT") {
            Ok(port) => port
                .parse()
                .map_err(|e| AppError::ConfigError(format!("PORT is not a port number: {}", e)))?,
            Err(_) => DEFAULT_PORT,
        };

        let session_key = env::var("SESSION_KEY").map_err(|e| {
            log::error!("FATAL: SESSION_KEY environment variable not set");
            AppError::EnvVarError(e)
        })?;

        Ok(Self {
            database_url,
            host,
            port,
            session_key: session_key_from(&session_key)?,
        })
    }
}

fn session_key_from(raw: &str) -> Result<Key, AppError> {
    if raw.len() < MIN_SESSION_KEY_LEN {
        return Err(AppError::ConfigError(format!(
            "SESSION_KEY must be at least {} bytes",
            MIN_SESSION_KEY_LEN
        )));
    }
    Ok(Key::from(raw.as_bytes()))
}
