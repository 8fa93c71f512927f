use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur while validating the configured API base URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain HTTP to a non-loopback host would leak the bearer token.
    #[error("HTTPS required for {0} (plain HTTP is only allowed for localhost)")]
    InsecureScheme(String),
    /// The URL has no host or cannot take path segments.
    #[error("URL cannot be used as an API base")]
    CannotBeABase,
}

/// Validates the API base URL.
///
/// - Only `http` and `https` schemes are accepted.
/// - Plain `http` is accepted only for loopback hosts (local development and
///   tests), since requests may carry an `Authorization` header.
/// - Query strings and fragments are stripped.
///
/// # Examples
///
/// ```
/// use manset::util::validate_base_url;
///
/// assert!(validate_base_url("https://haber.example.com/api").is_ok());
/// assert!(validate_base_url("http://127.0.0.1:8080/api").is_ok());
/// assert!(validate_base_url("http://haber.example.com/api").is_err());
/// assert!(validate_base_url("ftp://haber.example.com").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let mut url = Url::parse(url_str.trim())?;

    if url.cannot_be_a_base() {
        return Err(UrlValidationError::CannotBeABase);
    }
    let host = url
        .host_str()
        .ok_or(UrlValidationError::CannotBeABase)?
        .to_owned();

    match url.scheme() {
        "https" => {}
        "http" if is_loopback(&host) => {
            tracing::warn!(host = %host, "Using plain HTTP API base URL (localhost only)");
        }
        "http" => return Err(UrlValidationError::InsecureScheme(host)),
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn is_loopback(host: &str) -> bool {
    if host == "localhost" {
        return true;
    }
    // Strip brackets from IPv6 addresses for parsing
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}
