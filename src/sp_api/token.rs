//! LWA refresh-grant token exchange

use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::transport::{HttpRequest, HttpTransport};
use super::{ReportError, ReportResult, UpstreamFailure};
use crate::AccessToken;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Exchanges a refresh token for a short-lived access token
pub struct TokenExchanger {
    transport: Arc<dyn HttpTransport>,
    token_url: String,
}

impl TokenExchanger {
    /// Create an exchanger posting to `token_url`
    pub fn new(transport: Arc<dyn HttpTransport>, token_url: impl Into<String>) -> Self {
        Self {
            transport,
            token_url: token_url.into(),
        }
    }

    /// Perform the refresh grant
    ///
    /// # Errors
    /// [`ReportError::Authentication`] on transport failure, any non-2xx
    /// response, or a response without a non-empty `access_token`.
    pub async fn exchange(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> ReportResult<AccessToken> {
        debug!(url = %self.token_url, "exchanging refresh token");

        let request = HttpRequest::post(&self.token_url).form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ]);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ReportError::Authentication(e.into()))?;

        if !response.is_success() {
            return Err(ReportError::Authentication(response.into_failure()));
        }

        let body: TokenResponse = response.json().map_err(ReportError::Authentication)?;
        match body.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(ReportError::Authentication(UpstreamFailure::InvalidResponse(
                "missing access_token".to_string(),
            ))),
        }
    }
}
