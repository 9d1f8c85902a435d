use parse_display::{Display, FromStr};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_SESSION_NAME: &str = "hearth.sid";

pub const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, FromStr)]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

/// Session cookie settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub name: String,
    pub secret: String,
    pub max_age: Duration,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SESSION_NAME.to_owned(),
            secret: String::new(),
            max_age: DEFAULT_SESSION_MAX_AGE,
            secure: false,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_owned(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() || self.name.contains(['=', ';', ' ']) {
            return Err(ConfigError::Session(format!(
                "invalid cookie name `{}`",
                self.name
            )));
        }

        if self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Session(format!(
                "secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        if self.same_site == SameSite::None && !self.secure {
            return Err(ConfigError::Session(
                "SameSite=None requires a secure cookie".to_owned(),
            ));
        }

        Ok(())
    }

    /// `Set-Cookie` header value carrying `value`.
    pub fn set_cookie(&self, value: &str) -> String {
        self.render(value, self.max_age.as_secs())
    }

    /// `Set-Cookie` header value that makes the browser drop the session.
    pub fn clear_cookie(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={value}; Path={}; Max-Age={max_age}; SameSite={}",
            self.name, self.path, self.same_site
        );

        if self.http_only {
            cookie.push_str("; HttpOnly");
        }

        if self.secure {
            cookie.push_str("; Secure");
        }

        cookie
    }
}
