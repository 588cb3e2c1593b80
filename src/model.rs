//! Data models for the URL shortener application
//!
//! This module defines the persisted record and the JSON views returned by the
//! API. Views are built from a [`UrlRecord`] at response time; the public and
//! admin URLs are never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Represents a URL record stored in the database
///
/// Records are never physically removed. Deactivation flips `is_active`
/// and leaves the record reachable through its secret key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    /// Surrogate identifier assigned by the store
    pub id: u64,

    /// Public short key used in redirect URLs (e.g., "aB3x9")
    pub key: String,

    /// Owner-only token for admin operations
    pub secret_key: String,

    /// Destination the short key redirects to
    pub target_url: String,

    /// False once the owner has deactivated the link
    pub is_active: bool,

    /// Number of redirect lookups for this key
    #[serde(default)]
    pub clicks: u64,

    /// Timestamp when this URL record was created
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when inserting a record
///
/// The store assigns `id`, `created_at`, `is_active = true` and `clicks = 0`.
#[derive(Debug, Clone)]
pub struct NewUrlRecord {
    pub key: String,
    pub secret_key: String,
    pub target_url: String,
}

/// Request payload for creating a short URL, also the body of `GET /peek/{key}`
///
/// # Example
/// ```json
/// { "target_url": "https://example.com/very/long/url" }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UrlBase {
    pub target_url: String,
}

/// Admin view of a record: base fields plus the computed public and admin URLs
///
/// # Example
/// ```json
/// {
///   "target_url": "https://example.com",
///   "is_active": true,
///   "clicks": 0,
///   "url": "http://localhost:8000/aB3x9",
///   "admin_url": "http://localhost:8000/admin/Q1w-E2r_"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UrlInfo {
    pub target_url: String,
    pub is_active: bool,
    pub clicks: u64,
    pub url: String,
    pub admin_url: String,
}

impl UrlInfo {
    /// Builds the admin view, placing the key and admin path on `base_url`
    pub fn from_record(record: &UrlRecord, base_url: &Url) -> Self {
        let mut url = base_url.clone();
        url.set_path(&record.key);

        let mut admin_url = base_url.clone();
        admin_url.set_path(&format!("admin/{}", record.secret_key));

        Self {
            target_url: record.target_url.clone(),
            is_active: record.is_active,
            clicks: record.clicks,
            url: url.to_string(),
            admin_url: admin_url.to_string(),
        }
    }
}

impl From<&UrlRecord> for UrlBase {
    fn from(record: &UrlRecord) -> Self {
        Self {
            target_url: record.target_url.clone(),
        }
    }
}

/// Body of a successful `DELETE /admin/{secret_key}` and of every error response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Detail {
    pub detail: String,
}
