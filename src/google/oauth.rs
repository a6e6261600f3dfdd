//! OAuth token exchange and refresh against Google's token endpoint.
//!
//! Refresh tokens are stored per email in the `auth` table by the `auth`
//! CLI command; everything else exchanges them for short-lived access
//! tokens on demand.

use anyhow::{Result, anyhow};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OauthToken {
    pub access_token: String,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
}

/// Exchange an authorization code for an access/refresh token pair.
pub async fn exchange_code_for_token(
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<OauthToken> {
    let response = reqwest::Client::new()
        .post(token_url)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await?;

    parse_token_response(response).await
}

/// Trade a stored refresh token for a fresh access token.
pub async fn refresh_access_token(
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<OauthToken> {
    let response = reqwest::Client::new()
        .post(token_url)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await?;

    parse_token_response(response).await
}

async fn parse_token_response(response: reqwest::Response) -> Result<OauthToken> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(anyhow!("OAuth token request failed ({}): {}", status, body));
    }
    Ok(serde_json::from_str(&body)?)
}
