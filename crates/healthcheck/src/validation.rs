//! Load-time validation of endpoint addresses.
//!
//! Validation never removes an endpoint: a malformed address is still probed
//! and reported down, the caller only gets a warning to log.

use anyhow::{Result, anyhow};
use url::Url;

/// Validate an HTTP/HTTPS endpoint address
pub fn validate_endpoint(target: &str) -> Result<()> {
    let url = Url::parse(target).map_err(|e| anyhow!("Invalid URL {target:?}: {e}"))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("Unsupported scheme for HTTP probe: {other}")),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(anyhow!("URL has no host: {target}"));
    }

    if url.port() == Some(0) {
        return Err(anyhow!("Port 0 is not valid"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probeable_endpoints_pass() {
        for target in
            ["https://example.com", "http://example.com:8080/status", "http://127.0.0.1:9000"]
        {
            assert!(validate_endpoint(target).is_ok(), "{target}");
        }
    }

    #[test]
    fn test_unprobeable_endpoints_are_reported() {
        for target in ["ftp://example.com", "example.com", "", "http://example.com:0"] {
            assert!(validate_endpoint(target).is_err(), "{target}");
        }
    }
}
