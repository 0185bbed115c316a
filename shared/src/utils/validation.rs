//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ConfigError;

/// Connection string schemes the MySQL driver accepts
pub const SUPPORTED_SCHEMES: [&str; 2] = ["mysql", "mariadb"];

// scheme://[user[:password]@]host[:port][/database][?params]
static CONNECTION_STRING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<scheme>[a-z][a-z0-9+.-]*)://(?:[^@/\s]+@)?(?P<host>[^:/?\s@]+)(?::(?P<port>\d{1,5}))?(?:/[^\s?]*)?(?:\?\S*)?$").unwrap()
});

/// Validate a database connection string and hand it back unchanged
///
/// Only the format and protocol are checked; reachability is the pool's job.
pub fn validate_connection_string(url: &str) -> Result<&str, ConfigError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidConnectionString {
            reason: "connection string is empty".to_string(),
        });
    }

    let captures = CONNECTION_STRING_REGEX.captures(trimmed).ok_or_else(|| {
        ConfigError::InvalidConnectionString {
            reason: "expected scheme://[user[:password]@]host[:port]/database".to_string(),
        }
    })?;

    let scheme = &captures["scheme"];
    if !SUPPORTED_SCHEMES.contains(&scheme) {
        return Err(ConfigError::InvalidConnectionString {
            reason: format!(
                "unsupported scheme '{}', expected one of: {}",
                scheme,
                SUPPORTED_SCHEMES.join(", ")
            ),
        });
    }

    if let Some(port) = captures.name("port") {
        if port.as_str().parse::<u16>().is_err() {
            return Err(ConfigError::InvalidConnectionString {
                reason: format!("port {} is out of range", port.as_str()),
            });
        }
    }

    Ok(url)
}

/// Replace the password of a connection string with `***` for logging
pub fn redact_credentials(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let Some(at) = rest[..authority_end].rfind('@') else {
        return url.to_string();
    };

    let userinfo = &rest[..at];
    let user = userinfo.split(':').next().unwrap_or_default();
    let redacted = if userinfo.contains(':') {
        format!("{}:***", user)
    } else {
        user.to_string()
    };
    format!("{}{}{}", &url[..scheme_end + 3], redacted, &rest[at..])
}

/// Common validation functions
pub mod validators {
    /// Check if a string is not empty
    pub fn not_empty(value: &str) -> bool {
        !value.trim().is_empty()
    }

    /// Check if a string length is within bounds
    pub fn length_between(value: &str, min: usize, max: usize) -> bool {
        let len = value.chars().count();
        len >= min && len <= max
    }
}
