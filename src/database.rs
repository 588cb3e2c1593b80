//! Database initialization, table definitions and the record store
//!
//! This module handles the setup of the embedded redb database and exposes
//! [`UrlStore`], the only component that reads or writes URL records.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::sync::Arc;

use chrono::Utc;

use crate::error::StoreError;
use crate::model::{NewUrlRecord, UrlRecord};

/// Main table for storing URL records
///
/// Key: public short key as string
/// Value: JSON-serialized UrlRecord as string
///
/// Example:
/// - Key: "aB3x9"
/// - Value: '{"id":1,"key":"aB3x9","secret_key":"Q1w-E2r_",...}'
pub const TABLE_URLS: TableDefinition<&str, &str> = TableDefinition::new("urls_v1");

/// Secondary index from secret key to public key
///
/// Enforces secret key uniqueness and serves admin lookups without a scan.
pub const TABLE_SECRET_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("secret_index_v1");

/// Bookkeeping values, currently only the surrogate id counter
pub const TABLE_META: TableDefinition<&str, u64> = TableDefinition::new("meta_v1");

const NEXT_ID: &str = "next_id";

/// Initializes the embedded database and creates required tables
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "shortener.db")
///
/// # Example
///
/// ```no_run
/// # use url_shortener::database::init_db;
/// let db = init_db("shortener.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, StoreError> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_URLS)?;
        write_txn.open_table(TABLE_SECRET_INDEX)?;
        write_txn.open_table(TABLE_META)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Persistent store of [`UrlRecord`]s
///
/// Lookups never filter on `is_active`; callers decide what an inactive
/// record means for them. Each mutating call runs in its own write
/// transaction, and redb serializes writers, so single-record updates are
/// atomic.
#[derive(Clone)]
pub struct UrlStore {
    db: Arc<Database>,
}

impl UrlStore {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Opens (or creates) the database file and wraps it
    pub fn open(db_path: &str) -> Result<Self, StoreError> {
        Ok(Self::new(init_db(db_path)?))
    }

    /// Inserts a new active record with zero clicks and returns it
    ///
    /// Fails with [`StoreError::KeyConflict`] or [`StoreError::SecretConflict`]
    /// when either unique column is already taken, active or not.
    pub fn insert(&self, new: NewUrlRecord) -> Result<UrlRecord, StoreError> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut urls = write_txn.open_table(TABLE_URLS)?;
            let mut secrets = write_txn.open_table(TABLE_SECRET_INDEX)?;
            let mut meta = write_txn.open_table(TABLE_META)?;

            if urls.get(new.key.as_str())?.is_some() {
                return Err(StoreError::KeyConflict(new.key));
            }
            if secrets.get(new.secret_key.as_str())?.is_some() {
                return Err(StoreError::SecretConflict);
            }

            let id = meta.get(NEXT_ID)?.map(|guard| guard.value()).unwrap_or(1);
            meta.insert(NEXT_ID, id + 1)?;

            let record = UrlRecord {
                id,
                key: new.key,
                secret_key: new.secret_key,
                target_url: new.target_url,
                is_active: true,
                clicks: 0,
                created_at: Utc::now(),
            };
            let record_json = serde_json::to_string(&record)?;

            urls.insert(record.key.as_str(), record_json.as_str())?;
            secrets.insert(record.secret_key.as_str(), record.key.as_str())?;
            record
        };
        write_txn.commit()?;

        Ok(record)
    }

    pub fn find_by_key(&self, key: &str) -> Result<Option<UrlRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let urls = read_txn.open_table(TABLE_URLS)?;
        let stored = urls.get(key)?.map(|guard| guard.value().to_string());
        decode(stored)
    }

    pub fn find_by_secret(&self, secret_key: &str) -> Result<Option<UrlRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let secrets = read_txn.open_table(TABLE_SECRET_INDEX)?;
        let urls = read_txn.open_table(TABLE_URLS)?;

        let Some(key) = secrets.get(secret_key)?.map(|guard| guard.value().to_string()) else {
            return Ok(None);
        };
        let stored = urls.get(key.as_str())?.map(|guard| guard.value().to_string());
        decode(stored)
    }

    /// Overwrites an existing record with `record`
    ///
    /// The record is addressed by its key, which together with `id`,
    /// `secret_key` and `target_url` never changes after creation.
    pub fn save(&self, record: &UrlRecord) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut urls = write_txn.open_table(TABLE_URLS)?;
            if urls.get(record.key.as_str())?.is_none() {
                return Err(StoreError::Missing(record.key.clone()));
            }
            let record_json = serde_json::to_string(record)?;
            urls.insert(record.key.as_str(), record_json.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Applies `mutate` to the record stored under `key` in one transaction
    ///
    /// `mutate` returns whether it changed the record; unchanged records are
    /// not rewritten. Returns the record as it stands afterwards.
    pub fn update_by_key<F>(&self, key: &str, mutate: F) -> Result<Option<UrlRecord>, StoreError>
    where
        F: FnOnce(&mut UrlRecord) -> bool,
    {
        let write_txn = self.db.begin_write()?;
        let record = update_in(&write_txn, key, mutate)?;
        write_txn.commit()?;
        Ok(record)
    }

    /// Same as [`UrlStore::update_by_key`], addressing the record by secret key
    pub fn update_by_secret<F>(
        &self,
        secret_key: &str,
        mutate: F,
    ) -> Result<Option<UrlRecord>, StoreError>
    where
        F: FnOnce(&mut UrlRecord) -> bool,
    {
        let write_txn = self.db.begin_write()?;
        let key = {
            let secrets = write_txn.open_table(TABLE_SECRET_INDEX)?;
            let key = secrets.get(secret_key)?.map(|guard| guard.value().to_string());
            key
        };
        let record = match key {
            Some(key) => update_in(&write_txn, &key, mutate)?,
            None => None,
        };
        write_txn.commit()?;
        Ok(record)
    }
}

fn update_in<F>(
    write_txn: &WriteTransaction,
    key: &str,
    mutate: F,
) -> Result<Option<UrlRecord>, StoreError>
where
    F: FnOnce(&mut UrlRecord) -> bool,
{
    let mut urls = write_txn.open_table(TABLE_URLS)?;
    let Some(stored) = urls.get(key)?.map(|guard| guard.value().to_string()) else {
        return Ok(None);
    };

    let mut record: UrlRecord = serde_json::from_str(&stored)?;
    if mutate(&mut record) {
        let record_json = serde_json::to_string(&record)?;
        urls.insert(key, record_json.as_str())?;
    }
    Ok(Some(record))
}

fn decode(stored: Option<String>) -> Result<Option<UrlRecord>, StoreError> {
    stored
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(StoreError::from)
}
