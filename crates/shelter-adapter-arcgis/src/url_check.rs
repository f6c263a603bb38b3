//! Source URL classification.

use std::fmt;

use reqwest::Url;

/// Domains reserved for documentation (RFC 2606) and used in sample configs.
const PLACEHOLDER_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

/// Verdict on a configured source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceUrl {
    /// A real http(s) URL to fetch from
    Usable(Url),
    /// Nothing configured
    Missing,
    /// Configured but not an http(s) URL
    Invalid(String),
    /// Points at a placeholder host
    Placeholder(String),
}

impl SourceUrl {
    /// The URL to fetch, if usable.
    pub fn usable(&self) -> Option<&Url> {
        match self {
            SourceUrl::Usable(url) => Some(url),
            _ => None,
        }
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceUrl::Usable(url) => write!(f, "{url}"),
            SourceUrl::Missing => write!(f, "no source URL configured"),
            SourceUrl::Invalid(raw) => write!(f, "invalid source URL '{raw}'"),
            SourceUrl::Placeholder(raw) => write!(f, "placeholder source URL '{raw}'"),
        }
    }
}

/// Classifies the configured source URL.
pub fn classify_source_url(raw: Option<&str>) -> SourceUrl {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return SourceUrl::Missing;
    };

    let Ok(url) = Url::parse(raw) else {
        return SourceUrl::Invalid(raw.to_string());
    };

    if !matches!(url.scheme(), "http" | "https") {
        return SourceUrl::Invalid(raw.to_string());
    }

    match url.host_str() {
        None => SourceUrl::Invalid(raw.to_string()),
        Some(host) if is_placeholder_host(host) => SourceUrl::Placeholder(raw.to_string()),
        Some(_) => SourceUrl::Usable(url),
    }
}

/// True for hosts that only ever appear in sample configuration.
pub fn is_placeholder_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();

    let reserved = PLACEHOLDER_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")));

    reserved
        || host.starts_with("your-")
        || host.starts_with("your_")
        || host.contains("placeholder")
}
