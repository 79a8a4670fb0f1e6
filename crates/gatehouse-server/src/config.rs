use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Runtime configuration, loaded from the environment once at startup.
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    /// Public origin used to build verification links, e.g. `https://app.example.com`.
    pub public_base_url: String,
    pub mail_api_key: String,
    pub mail_sender_email: String,
    pub mail_sender_name: Option<String>,
    pub password_iterations: u32,
    pub verification_ttl_secs: i64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("GATEHOUSE_PORT", "8080"),
            database_url: require("DATABASE_URL"),
            jwt_secret: require("JWT_SECRET"),
            public_base_url: require("PUBLIC_BASE_URL"),
            mail_api_key: require("BREVO_API_KEY"),
            mail_sender_email: require("BREVO_SENDER_EMAIL"),
            mail_sender_name: optional("BREVO_SENDER_NAME"),
            password_iterations: try_load("PASSWORD_ITERATIONS", "600000"),
            // Link tokens are long-lived enough for an inbox round trip.
            verification_ttl_secs: try_load("VERIFICATION_TTL_SECS", "86400"),
        }
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!(
            "{}/api/auth/verify?token={token}",
            self.public_base_url.trim_end_matches('/')
        )
    }
}

/// Environment values sometimes arrive quoted from `.env` tooling; strip one
/// layer of matching quotes.
fn normalize_env_value(raw: String) -> String {
    let trimmed = raw.trim();

    if let Some(inner) = trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return inner.trim().to_string();
    }
    if let Some(inner) = trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        return inner.trim().to_string();
    }

    trimmed.to_string()
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(normalize_env_value)
        .filter(|s| !s.is_empty())
}

fn optional(key: &str) -> Option<String> {
    var(key)
}

fn require(key: &str) -> String {
    var(key)
        .ok_or_else(|| warn!("{key} is required but not set"))
        .expect("Environment misconfigured!")
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

#[cfg(test)]
mod tests {
    use super::normalize_env_value;

    #[test]
    fn strips_matching_quotes() {
        assert_eq!(normalize_env_value("\"abc\"".into()), "abc");
        assert_eq!(normalize_env_value("'abc'".into()), "abc");
        assert_eq!(normalize_env_value("  abc  ".into()), "abc");
        assert_eq!(normalize_env_value("\"abc'".into()), "\"abc'");
    }
}
