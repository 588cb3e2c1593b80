//! HTTP request handlers for the URL shortener API
//!
//! Handlers are thin: they call [`crate::service::LinkService`], turn a
//! missing record into a 404 and shape the JSON views.

use axum::{
    extract::{Path, State},
    http::Uri,
    response::Redirect,
    Json,
};

use crate::error::AppError;
use crate::model::{Detail, UrlBase, UrlInfo};
use crate::route::AppState;

pub async fn read_root() -> Json<&'static str> {
    Json("Welcome to the URL shortener API.")
}

/// Creates a short URL with a generated key
///
/// # Request Body
///
/// ```json
/// { "target_url": "https://example.com/very/long/url" }
/// ```
///
/// # Response
///
/// - **200 OK** - Admin info view of the new link
/// - **400 Bad Request** - Target URL is not valid
pub async fn create_url(
    State(state): State<AppState>,
    Json(payload): Json<UrlBase>,
) -> Result<Json<UrlInfo>, AppError> {
    let record = state.links.create(&payload.target_url, None).await?;
    Ok(Json(state.admin_info(&record)))
}

/// Creates a short URL under a caller-chosen key
///
/// # Response
///
/// - **200 OK** - Admin info view of the new link
/// - **400 Bad Request** - Target URL or key is not valid, or the key is taken
pub async fn create_url_custom_key(
    State(state): State<AppState>,
    Path(custom_key): Path<String>,
    Json(payload): Json<UrlBase>,
) -> Result<Json<UrlInfo>, AppError> {
    let record = state
        .links
        .create(&payload.target_url, Some(&custom_key))
        .await?;
    Ok(Json(state.admin_info(&record)))
}

/// Redirects a short key to its target
///
/// The click is counted before the target is probed, so visits to a dead
/// target still show up in the counter.
///
/// # Response
///
/// - **307 Temporary Redirect** - Target answered the liveness probe
/// - **400 Bad Request** - Target did not answer
/// - **404 Not Found** - Key is unknown
pub async fn forward_to_target_url(
    State(state): State<AppState>,
    Path(url_key): Path<String>,
    uri: Uri,
) -> Result<Redirect, AppError> {
    let record = state
        .links
        .resolve_for_redirect(&url_key)?
        .ok_or_else(|| state.not_found(&uri))?;

    if !state.probe.is_reachable(&record.target_url).await {
        return Err(AppError::UnreachableTarget);
    }

    Ok(Redirect::temporary(&record.target_url))
}

pub async fn get_url_info(
    State(state): State<AppState>,
    Path(secret_key): Path<String>,
    uri: Uri,
) -> Result<Json<UrlInfo>, AppError> {
    let record = state
        .links
        .get_admin_view(&secret_key)?
        .ok_or_else(|| state.not_found(&uri))?;
    Ok(Json(state.admin_info(&record)))
}

/// Deactivates the link owning `secret_key`; the record itself is kept
pub async fn delete_url(
    State(state): State<AppState>,
    Path(secret_key): Path<String>,
    uri: Uri,
) -> Result<Json<Detail>, AppError> {
    let record = state
        .links
        .deactivate(&secret_key)?
        .ok_or_else(|| state.not_found(&uri))?;

    Ok(Json(Detail {
        detail: format!(
            "Successfully deleted shortened URL for '{}'.",
            record.target_url
        ),
    }))
}

/// Shows where a key points without following it or counting a click
pub async fn peek_target_url(
    State(state): State<AppState>,
    Path(url_key): Path<String>,
    uri: Uri,
) -> Result<Json<UrlBase>, AppError> {
    let record = state
        .links
        .peek(&url_key)?
        .ok_or_else(|| state.not_found(&uri))?;
    Ok(Json(UrlBase::from(&record)))
}
