//! Business logic for creating, resolving and administering short links

use std::time::Duration;

use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::database::UrlStore;
use crate::error::{AppError, StoreError};
use crate::keygen::{generate_key, generate_secret_key};
use crate::model::{NewUrlRecord, UrlRecord};

/// Path segments that already belong to fixed routes
const RESERVED_KEYS: &[&str] = &["url", "admin", "peek"];

const MAX_CUSTOM_KEY_LENGTH: usize = 64;

const MAX_BACKOFF: Duration = Duration::from_millis(64);

/// Tunables for [`LinkService`]
#[derive(Debug, Clone)]
pub struct LinkOptions {
    pub key_length: usize,
    pub secret_key_length: usize,
    /// Attempts at finding an unused key/secret pair before giving up
    pub max_key_attempts: u32,
    /// When false, deactivated links stop redirecting and cannot be peeked
    pub serve_inactive: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            key_length: 5,
            secret_key_length: 8,
            max_key_attempts: 10,
            serve_inactive: true,
        }
    }
}

#[derive(Clone)]
pub struct LinkService {
    store: UrlStore,
    options: LinkOptions,
}

impl LinkService {
    pub fn new(store: UrlStore, options: LinkOptions) -> Self {
        Self { store, options }
    }

    /// Creates a new active link for `target_url`
    ///
    /// A caller-supplied `custom_key` is used verbatim if it is valid and
    /// unused. Otherwise a random key is generated. Collisions on a generated
    /// key or secret are retried with exponential backoff up to
    /// `max_key_attempts` times.
    #[instrument(name = "Service: Create link", skip(self))]
    pub async fn create(
        &self,
        target_url: &str,
        custom_key: Option<&str>,
    ) -> Result<UrlRecord, AppError> {
        validate_target_url(target_url)?;

        if let Some(key) = custom_key {
            validate_custom_key(key)?;
            if self.store.find_by_key(key)?.is_some() {
                return Err(AppError::KeyTaken);
            }
        }

        let mut backoff = Duration::from_millis(1);
        for attempt in 1..=self.options.max_key_attempts {
            match self.try_insert(target_url, custom_key)? {
                Some(record) => {
                    info!(key = %record.key, id = record.id, "short link created");
                    return Ok(record);
                }
                None if attempt < self.options.max_key_attempts => {
                    debug!(attempt, "key or secret collision, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                None => debug!(attempt, "key or secret collision on final attempt"),
            }
        }

        warn!(
            attempts = self.options.max_key_attempts,
            "gave up looking for an unused key"
        );
        Err(AppError::KeySpaceExhausted)
    }

    /// One generation and insert attempt. `Ok(None)` means a collision.
    fn try_insert(
        &self,
        target_url: &str,
        custom_key: Option<&str>,
    ) -> Result<Option<UrlRecord>, AppError> {
        let key = match custom_key {
            Some(key) => key.to_string(),
            None => {
                let key = generate_key(self.options.key_length);
                if RESERVED_KEYS.contains(&key.as_str())
                    || self.store.find_by_key(&key)?.is_some()
                {
                    return Ok(None);
                }
                key
            }
        };

        let secret_key = generate_secret_key(self.options.secret_key_length);
        if self.store.find_by_secret(&secret_key)?.is_some() {
            return Ok(None);
        }

        let new = NewUrlRecord {
            key,
            secret_key,
            target_url: target_url.to_string(),
        };
        match self.store.insert(new) {
            Ok(record) => Ok(Some(record)),
            // Lost a race for the caller's key; it is taken now
            Err(StoreError::KeyConflict(_)) if custom_key.is_some() => Err(AppError::KeyTaken),
            Err(StoreError::KeyConflict(_)) | Err(StoreError::SecretConflict) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Looks up `key` and counts the visit
    ///
    /// The caller probes the target and redirects. Inactive records are
    /// returned unless `serve_inactive` is off.
    #[instrument(name = "Service: Resolve link", skip(self))]
    pub fn resolve_for_redirect(&self, key: &str) -> Result<Option<UrlRecord>, AppError> {
        let serve_inactive = self.options.serve_inactive;
        let record = self.store.update_by_key(key, |record| {
            if record.is_active || serve_inactive {
                record.clicks += 1;
                true
            } else {
                false
            }
        })?;

        if record.is_none() {
            debug!("no record for key");
        }
        Ok(record.filter(|record| record.is_active || serve_inactive))
    }

    /// Looks up `key` without counting a click
    pub fn peek(&self, key: &str) -> Result<Option<UrlRecord>, AppError> {
        let serve_inactive = self.options.serve_inactive;
        Ok(self
            .store
            .find_by_key(key)?
            .filter(|record| record.is_active || serve_inactive))
    }

    /// Looks up a record by its secret key, active or not
    pub fn get_admin_view(&self, secret_key: &str) -> Result<Option<UrlRecord>, AppError> {
        Ok(self.store.find_by_secret(secret_key)?)
    }

    /// Marks the record owning `secret_key` inactive
    ///
    /// Deactivating an already inactive record succeeds and changes nothing.
    #[instrument(name = "Service: Deactivate link", skip_all)]
    pub fn deactivate(&self, secret_key: &str) -> Result<Option<UrlRecord>, AppError> {
        let record = self.store.update_by_secret(secret_key, |record| {
            let was_active = record.is_active;
            record.is_active = false;
            was_active
        })?;

        if let Some(record) = &record {
            info!(key = %record.key, "short link deactivated");
        }
        Ok(record)
    }
}

/// Accepts absolute `http`/`https` URLs with a non-empty host
///
/// The URL is stored as given and later sent back in a `Location` header, so
/// surrounding whitespace and control characters are rejected outright.
pub fn validate_target_url(target_url: &str) -> Result<(), AppError> {
    if target_url.trim() != target_url || target_url.chars().any(char::is_control) {
        return Err(AppError::InvalidUrl);
    }

    let url = Url::parse(target_url).map_err(|_| AppError::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::InvalidUrl);
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(AppError::InvalidUrl),
    }
}

/// Custom keys must be usable as a single path segment and not shadow a route
pub fn validate_custom_key(key: &str) -> Result<(), AppError> {
    let well_formed = !key.is_empty()
        && key.len() <= MAX_CUSTOM_KEY_LENGTH
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !well_formed || RESERVED_KEYS.contains(&key) {
        return Err(AppError::InvalidKey);
    }
    Ok(())
}
