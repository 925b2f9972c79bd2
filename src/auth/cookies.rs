//! Session cookie policy
//! Resolves cookie transport attributes from the deployment environment

use crate::{config::CookieConfig, error::AppError};
use axum_extra::extract::cookie::{Cookie, SameSite};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

const DEVELOPMENT: &str = "development";

/// Cookie transport attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub domain: String,
    pub secure: bool,
    pub http_only: bool,
}

impl CookiePolicy {
    /// Resolve the policy for the configured environment.
    ///
    /// "development" reads the `dev_*` keys, any other value the `prod_*` keys.
    pub fn resolve(config: &CookieConfig) -> Result<Self, AppError> {
        let (prefix, origin, secure, http_only) = if config.environment == DEVELOPMENT {
            (
                "dev",
                &config.dev_domain,
                &config.dev_secure_cookie,
                &config.dev_http_only_cookie,
            )
        } else {
            (
                "prod",
                &config.prod_domain,
                &config.prod_secure_cookie,
                &config.prod_http_only_cookie,
            )
        };

        let origin = required(prefix, "domain", origin)?;
        let secure = parse_bool(prefix, "secure_cookie", required(prefix, "secure_cookie", secure)?)?;
        let http_only = parse_bool(
            prefix,
            "http_only_cookie",
            required(prefix, "http_only_cookie", http_only)?,
        )?;

        let policy = Self {
            domain: extract_domain(origin).to_string(),
            secure,
            http_only,
        };

        tracing::info!(
            environment = %config.environment,
            domain = %policy.domain,
            secure = policy.secure,
            http_only = policy.http_only,
            "Cookie policy resolved"
        );

        Ok(policy)
    }

    fn build(&self, name: &'static str, value: String, max_age_secs: u64) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .path("/")
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(max_age_secs as i64));

        if !self.domain.is_empty() {
            builder = builder.domain(self.domain.clone());
        }

        builder.build()
    }

    /// Cookie carrying an access token
    pub fn access_cookie(&self, token: String, max_age_secs: u64) -> Cookie<'static> {
        self.build(ACCESS_TOKEN_COOKIE, token, max_age_secs)
    }

    /// Cookie carrying a refresh token
    pub fn refresh_cookie(&self, token: String, max_age_secs: u64) -> Cookie<'static> {
        self.build(REFRESH_TOKEN_COOKIE, token, max_age_secs)
    }

    /// Cookie instructing the client to discard `name`
    pub fn removal_cookie(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new(), 0);
        cookie.make_removal();
        cookie
    }
}

fn required<'a>(
    prefix: &str,
    key: &str,
    value: &'a Option<String>,
) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .ok_or_else(|| AppError::Config(format!("cookie.{}_{} is not set", prefix, key)))
}

/// Boolean parsing with the usual spellings: 1/t/true and 0/f/false
fn parse_bool(prefix: &str, key: &str, value: &str) -> Result<bool, AppError> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(AppError::Config(format!(
            "cookie.{}_{} is not a boolean: {:?}",
            prefix, key, other
        ))),
    }
}

/// Strip a leading scheme and a trailing port from an origin.
///
/// `"https://example.com:8443"` becomes `"example.com"`.
pub fn extract_domain(origin: &str) -> &str {
    let host = match origin.split_once("//") {
        Some((_, rest)) => rest,
        None => origin,
    };

    match host.split_once(':') {
        Some((domain, _)) => domain,
        None => host,
    }
}
