use std::env;

use crate::error::AppError;

/// Runtime configuration, built once in `main` and handed to the parts
/// that need it. Nothing reads the environment after startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub admin_username: String,
    pub admin_password: String,
    pub token_secret: String,
    pub allowed_origin: String,
    pub mail: Option<MailConfig>,
    pub sheets: Option<SheetsConfig>,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub api_url: String,
    pub api_token: String,
    pub from: String,
}

#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub append_url: String,
    pub api_token: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let admin_username = require("ADMIN_USERNAME")?;
        let admin_password = require("ADMIN_PASSWORD")?;
        let token_secret = require("TOKEN_SECRET")?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|e| AppError::Validation(format!("Invalid PORT value: {}", e)))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://portal.db".to_string());

        let allowed_origin =
            env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let mail = match (env::var("MAIL_API_URL"), env::var("MAIL_API_TOKEN"), env::var("MAIL_FROM")) {
            (Ok(api_url), Ok(api_token), Ok(from)) => Some(MailConfig {
                api_url,
                api_token,
                from,
            }),
            _ => None,
        };

        let sheets = match (env::var("SHEETS_APPEND_URL"), env::var("SHEETS_API_TOKEN")) {
            (Ok(append_url), Ok(api_token)) => Some(SheetsConfig {
                append_url,
                api_token,
            }),
            _ => None,
        };

        Ok(Self {
            port,
            database_url,
            admin_username,
            admin_password,
            token_secret,
            allowed_origin,
            mail,
            sheets,
        })
    }
}

fn require(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Validation(format!("{} is not set", key)))
}
