//! Audio relay target validation.
//!
//! # Responsibilities
//! - Parse the raw `target` parameter as an absolute URL
//! - Enforce the audio host allow-list (domain and its subdomains)
//! - Restrict schemes to http/https and force the outbound scheme to http
//!
//! A [`ValidatedTarget`] can only be obtained through [`validate_target`].

use std::fmt;

use url::Url;

/// Why a target was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTarget {
    #[error("target is not an absolute URL")]
    Malformed,
    #[error("target has no host")]
    MissingHost,
    #[error("host '{0}' is not allowed")]
    HostNotAllowed(String),
    #[error("scheme '{0}' is not allowed")]
    SchemeNotAllowed(String),
}

/// An upstream audio URL that passed validation, normalized to plain http.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTarget {
    url: Url,
}

impl ValidatedTarget {
    /// Lowercase host name.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Explicit port, `None` for the scheme default.
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    pub fn into_url(self) -> Url {
        self.url
    }
}

impl fmt::Display for ValidatedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Returns true if `host` is `domain` or one of its subdomains, ignoring case.
pub fn is_allowed_host(host: &str, domain: &str) -> bool {
    if host.is_empty() || domain.is_empty() {
        return false;
    }
    let host = host.to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();

    match host.strip_suffix(domain.as_str()) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.') && prefix.len() > 1,
        None => false,
    }
}

/// Validate and normalize a raw audio URL against the allowed `domain`.
pub fn validate_target(raw: &str, domain: &str) -> Result<ValidatedTarget, InvalidTarget> {
    let mut url = Url::parse(raw.trim()).map_err(|_| InvalidTarget::Malformed)?;

    let host = url.host_str().ok_or(InvalidTarget::MissingHost)?;
    if !is_allowed_host(host, domain) {
        return Err(InvalidTarget::HostNotAllowed(host.to_string()));
    }

    match url.scheme() {
        "http" => {}
        "https" => {
            // Switching between two special schemes cannot fail.
            url.set_scheme("http")
                .map_err(|_| InvalidTarget::SchemeNotAllowed("https".to_string()))?;
        }
        other => return Err(InvalidTarget::SchemeNotAllowed(other.to_string())),
    }

    Ok(ValidatedTarget { url })
}
