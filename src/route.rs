//! Route definitions for the URL shortener API
//!
//! This module configures all HTTP routes, maps them to their handlers and
//! defines the state those handlers share.

use std::sync::Arc;

use axum::http::Uri;
use axum::routing::{get, post};
use axum::Router;
use url::Url;

use crate::error::AppError;
use crate::handler::{
    create_url, create_url_custom_key, delete_url, forward_to_target_url, get_url_info,
    peek_target_url, read_root,
};
use crate::liveness::LivenessProbe;
use crate::model::{UrlInfo, UrlRecord};
use crate::service::LinkService;

/// Application state shared across all request handlers
///
/// Built once by the composition root in `main` (or by a test) and cloned
/// into every request.
#[derive(Clone)]
pub struct AppState {
    pub links: LinkService,
    pub probe: Arc<dyn LivenessProbe>,
    /// Public address the short and admin URLs are built on
    pub base_url: Arc<Url>,
}

impl AppState {
    pub fn new(links: LinkService, probe: Arc<dyn LivenessProbe>, base_url: Url) -> Self {
        Self {
            links,
            probe,
            base_url: Arc::new(base_url),
        }
    }

    pub(crate) fn admin_info(&self, record: &UrlRecord) -> UrlInfo {
        UrlInfo::from_record(record, &self.base_url)
    }

    /// 404 naming the requested URL as seen from the public address
    pub(crate) fn not_found(&self, uri: &Uri) -> AppError {
        let mut requested = (*self.base_url).clone();
        requested.set_path(uri.path());
        requested.set_query(uri.query());
        AppError::NotFound(requested.to_string())
    }
}

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /` - Welcome message
/// - `POST /url` - Creates a short URL with a generated key
/// - `POST /url/{custom_key}` - Creates a short URL under a chosen key
/// - `GET /{url_key}` - Redirects to the target URL (public endpoint)
/// - `GET /admin/{secret_key}` - Admin info for the owner
/// - `DELETE /admin/{secret_key}` - Deactivates the link
/// - `GET /peek/{url_key}` - Shows the target without redirecting
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/url", post(create_url))
        .route("/url/{custom_key}", post(create_url_custom_key))
        .route("/admin/{secret_key}", get(get_url_info).delete(delete_url))
        .route("/peek/{url_key}", get(peek_target_url))
        // Public redirect endpoint
        .route("/{url_key}", get(forward_to_target_url))
        .with_state(state)
}
