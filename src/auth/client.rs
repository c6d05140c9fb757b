use serde::Deserialize;

use crate::error::{Error, Result};

/// The authenticated caller as reported by the identity provider: the acting
/// user and the tenant partition all registry operations are scoped to.
#[derive(Debug, Clone, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub business_id: String,
}

#[derive(Debug)]
pub enum VerifyError {
    /// The provider rejected the token.
    Rejected,
    /// The provider could not be reached or returned garbage.
    Unavailable,
}

/// Client for the external identity provider. The gateway never validates
/// tokens itself; it sends the bearer token out and consumes the returned
/// `(user_id, business_id)` pair.
pub struct IdentityClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl IdentityClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to build identity client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        })
    }

    pub async fn verify(&self, bearer_token: &str) -> std::result::Result<Principal, VerifyError> {
        let response = self
            .http
            .get(format!("{}/api/v1/auth/verify", self.base_url))
            .bearer_auth(bearer_token)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("identity provider unreachable: {}", e);
                VerifyError::Unavailable
            })?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            return Err(VerifyError::Rejected);
        }
        if !response.status().is_success() {
            tracing::warn!("identity provider returned {}", response.status());
            return Err(VerifyError::Unavailable);
        }

        response.json::<Principal>().await.map_err(|e| {
            tracing::warn!("invalid identity provider response: {}", e);
            VerifyError::Unavailable
        })
    }
}
