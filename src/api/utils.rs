//! Shared helpers for route handlers

use tokio_rusqlite::Connection;

use crate::api::public::ApiError;
use crate::core::AppConfig;
use crate::google::oauth::refresh_access_token;

/// Resolve the caller to a known user. Every endpoint names its user by
/// email; a missing or unknown email is an unauthorized request, not a
/// bad one.
pub(crate) async fn require_user(
    db: &Connection,
    email: Option<&str>,
) -> Result<String, ApiError> {
    let Some(email) = email
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
    else {
        return Err(ApiError::Unauthorized);
    };

    let lookup = email.clone();
    let known = db
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM auth WHERE id = ?1",
                [&lookup],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await?;

    if !known {
        return Err(ApiError::Unauthorized);
    }
    Ok(email)
}

/// Trade the user's stored refresh token for a provider access token.
pub(crate) async fn access_token_for(
    db: &Connection,
    config: &AppConfig,
    email: &str,
) -> Result<String, ApiError> {
    let lookup = email.to_string();
    let refresh_token: Option<String> = db
        .call(move |conn| {
            use rusqlite::OptionalExtension;
            let token = conn
                .query_row(
                    "SELECT refresh_token FROM auth WHERE id = ?1",
                    [&lookup],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(token)
        })
        .await?;

    let Some(refresh_token) = refresh_token else {
        return Err(ApiError::Unauthorized);
    };

    let token = refresh_access_token(
        &config.google_token_url,
        &config.google_client_id,
        &config.google_client_secret,
        &refresh_token,
    )
    .await?;
    Ok(token.access_token)
}
