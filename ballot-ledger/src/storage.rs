//! Persistence gateway over RocksDB
//!
//! One JSON document per ledger entry in the `entries` column family, keyed
//! by the decimal string form of the entry index. String keys enumerate in
//! lexicographic order ("10" before "2"), so readers must never rely on
//! storage order; [`load_chain`](LedgerStore::load_chain) sorts by index
//! before returning.
//!
//! This layer is pure marshal/unmarshal plus I/O: it knows nothing about
//! hashing or validation, and it never mutates entries.

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    types::LedgerEntry,
    Config,
};

/// Column family holding one document per entry
const CF_ENTRIES: &str = "entries";

/// Document store for ledger entries
pub struct LedgerStore {
    db: Arc<DB>,
}

impl LedgerStore {
    /// Open or create the store
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_ENTRIES,
            Self::cf_options_entries(),
        )];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened entry store at {:?}", path);

        Ok(Self { db: Arc::new(db) })
    }

    fn cf_options_entries() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn cf_handle(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_ENTRIES)
            .ok_or_else(|| Error::Store(format!("Column family {} not found", CF_ENTRIES)))
    }

    /// Write one entry document (set-one), keyed by its decimal index.
    pub fn put_entry(&self, entry: &LedgerEntry) -> Result<()> {
        let cf = self.cf_handle()?;
        let key = entry.index.to_string();
        let value = serde_json::to_vec(entry)?;

        self.db.put_cf(cf, key.as_bytes(), &value)?;

        tracing::debug!(index = entry.index, digest = %entry.digest, "Entry persisted");

        Ok(())
    }

    /// Read one entry document by index (get-one).
    pub fn get_entry(&self, index: u64) -> Result<Option<LedgerEntry>> {
        let cf = self.cf_handle()?;
        let key = index.to_string();

        match self.db.get_cf(cf, key.as_bytes())? {
            Some(value) => {
                let entry = Self::decode_document(&key, &value)?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// Write every entry of the chain in one atomic batch.
    ///
    /// Atomicity means an interrupted save never leaves a half-written
    /// sequence behind.
    pub fn save_chain(&self, entries: &[LedgerEntry]) -> Result<()> {
        let cf = self.cf_handle()?;
        let mut batch = WriteBatch::default();

        for entry in entries {
            let key = entry.index.to_string();
            let value = serde_json::to_vec(entry)?;
            batch.put_cf(cf, key.as_bytes(), &value);
        }

        self.db.write(batch)?;

        tracing::debug!(entries = entries.len(), "Chain persisted");

        Ok(())
    }

    /// Read all entry documents (get-all), sorted by index ascending.
    ///
    /// A malformed document fails the whole load; records are never skipped
    /// silently. An empty store yields an empty vector, and the caller
    /// decides whether that is a fresh ledger or an error.
    pub fn load_chain(&self) -> Result<Vec<LedgerEntry>> {
        let cf = self.cf_handle()?;

        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let key = String::from_utf8_lossy(&key).into_owned();
            entries.push(Self::decode_document(&key, &value)?);
        }

        entries.sort_by_key(|entry| entry.index);

        tracing::debug!(entries = entries.len(), "Chain loaded");

        Ok(entries)
    }

    fn decode_document(key: &str, value: &[u8]) -> Result<LedgerEntry> {
        let entry: LedgerEntry =
            serde_json::from_slice(value).map_err(|e| Error::MalformedRecord {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        // The document must live at the key its index names
        if key.parse::<u64>() != Ok(entry.index) {
            return Err(Error::MalformedRecord {
                key: key.to_string(),
                reason: format!("document holds index {}", entry.index),
            });
        }

        Ok(entry)
    }
}
