use crate::core::{ClientError, Result};
use reqwest::Url;

/// Normalize a base address into its origin form
///
/// Accepts anything `Url` can parse with an `http` or `https` scheme and a
/// host. The result is `scheme://host[:port]`, lowercase host, default port
/// elided, no path and no trailing slash.
///
/// # Examples
///
/// ```
/// # use homebar_client::connection::origin::normalize;
/// assert_eq!(normalize("http://Node-A:80/").unwrap(), "http://node-a");
/// assert_eq!(normalize("https://b.example:8443/api/orders").unwrap(), "https://b.example:8443");
/// ```
pub fn normalize(raw: &str) -> Result<String> {
    let url = parse(raw)?;
    Ok(url.origin().ascii_serialization())
}

/// Origin of an absolute URL such as a `Location` header value
pub fn of_url(raw: &str) -> Result<String> {
    normalize(raw)
}

fn parse(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Configuration("origin must not be empty".into()));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| ClientError::Configuration(format!("invalid origin '{}': {}", trimmed, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ClientError::Configuration(format!(
                "origin '{}' uses unsupported scheme '{}'",
                trimmed, other
            )));
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ClientError::Configuration(format!(
            "origin '{}' has no host",
            trimmed
        )));
    }

    Ok(url)
}
