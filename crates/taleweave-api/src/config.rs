//! Server configuration loaded from the environment.

use std::str::FromStr;

use taleweave_accounts::domain::admin::AdminAllowList;
use taleweave_credits::domain::aggregates::DEFAULT_SIGNUP_GRANT;
use taleweave_llm::{DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL, LlmSettings};

use crate::error::AppError;
use crate::state::AppSettings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ASSET_BASE_URL: &str = "http://localhost:3000/assets";

/// Everything the server needs to start.
///
/// | Env Var | Required | Default |
/// |---|---|---|
/// | `DATABASE_URL` | **yes** | |
/// | `HOST` / `PORT` | no | `0.0.0.0` / `3000` |
/// | `DATABASE_MAX_CONNECTIONS` | no | `10` |
/// | `JWT_SECRET` | **yes** | |
/// | `ADMIN_EMAILS` | no | empty |
/// | `LLM_BASE_URL` | no | `https://api.openai.com/v1` |
/// | `LLM_API_KEY` | **yes** | |
/// | `LLM_CHAT_MODEL` / `LLM_EMBEDDING_MODEL` | no | `gpt-4o-mini` / `text-embedding-3-small` |
/// | `ASSET_BASE_URL` | no | `http://localhost:3000/assets` |
/// | `SIGNUP_GRANT` | no | `50` |
/// | `CORS_ORIGINS` | no | permissive |
/// | `OTEL_EXPORTER_OTLP_ENDPOINT` | no | traces not exported |
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Pool size.
    pub database_max_connections: u32,
    /// Provider connection.
    pub llm: LlmSettings,
    /// Allowed CORS origins; `None` allows any.
    pub cors_origins: Option<Vec<String>>,
    /// OTLP collector endpoint for trace export.
    pub otlp_endpoint: Option<String>,
    /// Settings shared with handlers.
    pub settings: AppSettings,
}

impl Config {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for a missing required variable or a value
    /// that does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from `lookup`. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for a missing required variable or a value
    /// that does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &str| {
            get(name).ok_or_else(|| AppError::Config(format!("{name} must be set")))
        };
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_owned());

        let signup_grant: i64 = parse_or(get("SIGNUP_GRANT"), "SIGNUP_GRANT", DEFAULT_SIGNUP_GRANT)?;
        if signup_grant < 0 {
            return Err(AppError::Config("SIGNUP_GRANT must not be negative".into()));
        }

        let cors_origins = get("CORS_ORIGINS").map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: or_default("HOST", DEFAULT_HOST),
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
            database_max_connections: parse_or(
                get("DATABASE_MAX_CONNECTIONS"),
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            llm: LlmSettings {
                base_url: or_default("LLM_BASE_URL", DEFAULT_BASE_URL),
                api_key: required("LLM_API_KEY")?,
                chat_model: or_default("LLM_CHAT_MODEL", DEFAULT_CHAT_MODEL),
                embedding_model: or_default("LLM_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            },
            cors_origins,
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
            settings: AppSettings {
                jwt_secret: required("JWT_SECRET")?,
                admins: AdminAllowList::parse(&get("ADMIN_EMAILS").unwrap_or_default()),
                asset_base_url: or_default("ASSET_BASE_URL", DEFAULT_ASSET_BASE_URL),
                signup_grant,
            },
        })
    }
}

fn parse_or<T>(value: Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |raw| {
        raw.parse()
            .map_err(|e| AppError::Config(format!("{name} is invalid: {e}")))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/taleweave"),
        ("JWT_SECRET", "secret"),
        ("LLM_API_KEY", "sk-test"),
    ];

    #[test]
    fn test_defaults_apply_when_only_required_vars_are_set() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.settings.signup_grant, 50);
        assert_eq!(config.llm.chat_model, DEFAULT_CHAT_MODEL);
        assert!(config.cors_origins.is_none());
        assert!(config.settings.admins.is_empty());
    }

    #[test]
    fn test_missing_secret_is_a_config_error() {
        let result = Config::from_lookup(lookup(&REQUIRED[..2]));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("LLM_API_KEY")));
    }

    #[test]
    fn test_unparsable_port_is_a_config_error() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "eighty"));

        let result = Config::from_lookup(lookup(&vars));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("PORT")));
    }

    #[test]
    fn test_lists_are_split_and_trimmed() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ADMIN_EMAILS", " Root@Example.com , ,ops@example.com"));
        vars.push(("CORS_ORIGINS", "https://a.example, https://b.example"));

        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert!(config.settings.admins.contains("root@example.com"));
        assert_eq!(config.settings.admins.len(), 2);
        assert_eq!(
            config.cors_origins,
            Some(vec![
                "https://a.example".to_owned(),
                "https://b.example".to_owned()
            ])
        );
    }

    #[test]
    fn test_negative_signup_grant_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SIGNUP_GRANT", "-5"));

        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
