//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `bookings` - Booking records (key: decimal booking id)

use crate::{
    error::{Error, Result},
    state::StateStore,
    Config,
};
use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, Options, WriteOptions, DB};
use std::fmt;
use std::sync::Arc;

/// Column family names
const CF_BOOKINGS: &str = "bookings";

/// Ledger backend on RocksDB
pub struct RocksStateStore {
    db: Arc<DB>,
    sync_writes: bool,
}

impl fmt::Debug for RocksStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RocksStateStore")
            .field("path", &self.db.path())
            .field("sync_writes", &self.sync_writes)
            .finish()
    }
}

impl RocksStateStore {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_BOOKINGS,
            Self::cf_options_bookings(),
        )];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!(path = ?path, "Opened RocksDB booking ledger");

        Ok(Self {
            db: Arc::new(db),
            sync_writes: config.rocksdb.sync_writes,
        })
    }

    fn cf_options_bookings() -> Options {
        let mut opts = Options::default();
        // Records are small and read on every invocation
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_handle(&self) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(CF_BOOKINGS)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", CF_BOOKINGS)))
    }

    /// Close database (graceful shutdown)
    pub fn close(self) -> Result<()> {
        drop(self.db);
        tracing::info!("RocksDB closed gracefully");
        Ok(())
    }
}

impl StateStore for RocksStateStore {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf_handle()?;
        Ok(self.db.get_cf(&cf, key.as_bytes())?)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        let cf = self.cf_handle()?;

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.sync_writes);

        self.db.put_cf_opt(&cf, key.as_bytes(), value, &write_opts)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config() -> (Config, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        config.rocksdb.sync_writes = false;
        (config, temp_dir)
    }

    #[test]
    fn test_storage_open() {
        let (config, _temp) = test_config();
        let storage = RocksStateStore::open(&config).unwrap();
        assert!(storage.db.cf_handle(CF_BOOKINGS).is_some());
    }

    #[test]
    fn test_put_and_get() {
        let (config, _temp) = test_config();
        let storage = RocksStateStore::open(&config).unwrap();

        assert!(storage.get_state("101").unwrap().is_none());

        storage.put_state("101", b"{}").unwrap();
        assert_eq!(storage.get_state("101").unwrap(), Some(b"{}".to_vec()));
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let (config, _temp) = test_config();

        let storage = RocksStateStore::open(&config).unwrap();
        storage.put_state("7", b"seven").unwrap();
        storage.close().unwrap();

        let storage = RocksStateStore::open(&config).unwrap();
        assert_eq!(storage.get_state("7").unwrap(), Some(b"seven".to_vec()));
    }
}
