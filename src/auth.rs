//! Token issuance.
//!
//! These calls need no access token, so they are free functions rather than
//! methods on [`PingupClient`](crate::PingupClient). Build a new client with
//! the returned access token; a client never swaps its token in place.

use reqwest::Method;
use tracing::info;

use crate::config::Environment;
use crate::error::Result;
use crate::models::TokenPair;
use crate::query::Query;
use crate::request::{ApiRequest, Executor};

/// Exchange an API key and secret for a token pair.
///
/// `sandbox` selects the deployment the key was issued for.
pub fn generate_tokens(key: &str, secret: &str, sandbox: bool) -> Result<TokenPair> {
    generate_tokens_at(Environment::from_sandbox(sandbox).base_url(), key, secret)
}

/// Exchange a refresh token and secret for a new token pair.
pub fn refresh_token(refresh_token: &str, secret: &str, sandbox: bool) -> Result<TokenPair> {
    refresh_token_at(
        Environment::from_sandbox(sandbox).base_url(),
        refresh_token,
        secret,
    )
}

/// [`generate_tokens`] against an explicit base URL ending in `/`.
pub fn generate_tokens_at(endpoint: &str, key: &str, secret: &str) -> Result<TokenPair> {
    let mut query = Query::new();
    query.push("key", key).push("secret", secret);

    let tokens = send(ApiRequest::unauthenticated(
        Method::POST,
        endpoint,
        "auth/generateTokens",
        &query,
    ))?;
    info!("Generated Pingup tokens");
    Ok(tokens)
}

/// [`refresh_token`] against an explicit base URL ending in `/`.
pub fn refresh_token_at(endpoint: &str, refresh_token: &str, secret: &str) -> Result<TokenPair> {
    let mut query = Query::new();
    query.push("token", refresh_token).push("secret", secret);

    let tokens = send(ApiRequest::unauthenticated(
        Method::PUT,
        endpoint,
        "auth/refreshToken",
        &query,
    ))?;
    info!("Refreshed Pingup tokens");
    Ok(tokens)
}

fn send(request: ApiRequest) -> Result<TokenPair> {
    let value = Executor::new(None)?.execute(&request)?;
    Ok(serde_json::from_value(value)?)
}
