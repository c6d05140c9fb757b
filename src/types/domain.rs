use url::Url;

use crate::error::{Error, Result};

/// Normalizes an installation backend domain to a base URL with an explicit
/// scheme. Bare hostnames are rewritten to `https://`; values that already
/// carry a scheme are kept as-is. Trailing slashes are trimmed so the path
/// suffix can be appended without doubling separators.
///
/// Normalization happens exactly once, at write time; stored domains are
/// never re-normalized on read.
pub fn normalize_domain(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("domain must not be empty".into()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate)
        .map_err(|_| Error::InvalidArgument(format!("invalid domain: {raw}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidArgument(format!(
                "unsupported scheme: {other}"
            )));
        }
    }

    if url.host_str().is_none() {
        return Err(Error::InvalidArgument(format!("invalid domain: {raw}")));
    }

    Ok(candidate)
}

/// Extracts the bare hostname from a normalized domain, for allow-list
/// comparison against an extension's authorized domains.
pub fn domain_host(normalized: &str) -> Option<String> {
    Url::parse(normalized)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
