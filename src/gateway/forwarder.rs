use std::time::Duration;

use axum::http::header::{
    CONNECTION, CONTENT_LENGTH, HOST, HeaderMap, HeaderName, HeaderValue, PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use axum::http::Method;
use bytes::Bytes;

use super::RouteTarget;
use crate::error::{Error, Result};

/// Header carrying the client-facing hostname to the upstream, which
/// otherwise only sees its own host.
pub static X_ORIGINAL_HOST: HeaderName = HeaderName::from_static("x-original-host");

const HOP_BY_HOP: [HeaderName; 8] = [
    CONNECTION,
    HeaderName::from_static("keep-alive"),
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    TRAILER,
    TRANSFER_ENCODING,
    UPGRADE,
];

/// Everything the gateway relays back to the caller: the upstream status,
/// body, and headers, untouched apart from hop-by-hop headers.
#[derive(Debug)]
pub struct ProxyResponse {
    pub status: axum::http::StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Issues outbound calls to installation backends over one shared, pooled
/// client. The timeout budget applies once per call; there are no retries,
/// since the gateway cannot know whether the proxied call is idempotent.
pub struct ProxyForwarder {
    client: reqwest::Client,
    timeout: Duration,
}

impl ProxyForwarder {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::Config(format!("failed to build proxy client: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Forwards a call to `{base}/api/v1/apps/{app}/{path}`. That path shape
    /// is a compatibility contract with extension backends and must not
    /// change. The query string is appended verbatim, preserving key order
    /// and duplicate keys.
    pub async fn forward(
        &self,
        target: &RouteTarget,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        original_host: Option<&str>,
        body: Option<Bytes>,
    ) -> Result<ProxyResponse> {
        let mut url = format!("{}/api/v1/apps/{}/{}", target.base, target.app, path);
        if let Some(q) = query {
            url.push('?');
            url.push_str(q);
        }

        let mut outbound = headers.clone();
        outbound.remove(HOST);
        outbound.remove(CONTENT_LENGTH);
        for name in &HOP_BY_HOP {
            outbound.remove(name);
        }
        if let Some(host) = original_host {
            if let Ok(value) = HeaderValue::from_str(host) {
                outbound.insert(X_ORIGINAL_HOST.clone(), value);
            }
        }

        let mut request = self
            .client
            .request(method, &url)
            .headers(outbound)
            .timeout(self.timeout);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("proxy request to {} failed: {}", url, e);
            if e.is_timeout() {
                Error::UpstreamTimeout
            } else {
                Error::UpstreamUnavailable
            }
        })?;

        let status = response.status();
        let mut headers = response.headers().clone();
        for name in &HOP_BY_HOP {
            headers.remove(name);
        }
        headers.remove(CONTENT_LENGTH);

        let body = response.bytes().await.map_err(|e| {
            tracing::warn!("reading proxy response from {} failed: {}", url, e);
            if e.is_timeout() {
                Error::UpstreamTimeout
            } else {
                Error::UpstreamUnavailable
            }
        })?;

        Ok(ProxyResponse {
            status,
            headers,
            body,
        })
    }
}
