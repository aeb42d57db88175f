//! RocksDB-backed status store.
//!
//! # Lock Semantics
//!
//! RocksDB is thread-safe, but insert-if-absent and completion must be check-then-write
//! atomic, so they run under `write_lock`, acquired with a bounded timeout
//! (`STORAGE_LOCK_TIMEOUT_SECS`). Plain upserts of an existing job are serialized by the
//! coordinator's per-job lock instead.

use crate::foundation::PipelineError;
use crate::infrastructure::storage::rocks::migration::open_db_with_cfs;
use crate::infrastructure::storage::rocks::schema::*;
use crate::storage_err;
use bincode::Options;
use log::{debug, info, warn};
use parking_lot::Mutex;
use rocksdb::{ColumnFamily, Direction, IteratorMode, DB};
use std::fs;
use std::path::Path;
use std::sync::Arc;

mod store;

const SCHEMA_VERSION: u32 = 2;
const DB_DIR_NAME: &str = "mint-status";

pub struct RocksStatusStore {
    db: Arc<DB>,
    write_lock: Mutex<()>,
}

impl RocksStatusStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        Self::open_with_options(path, false)
    }

    pub fn open_with_options(path: impl AsRef<Path>, allow_schema_wipe: bool) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        debug!("opening RocksStatusStore path={}", path.display());
        let db = open_db_with_cfs(path)?;
        let store = Self { db: Arc::new(db), write_lock: Mutex::new(()) };
        if let Err(err) = store.maybe_run_migrations() {
            if let (true, PipelineError::SchemaMismatch { stored, current }) = (allow_schema_wipe, &err) {
                warn!("schema mismatch; wiping db stored={} current={} path={}", stored, current, path.display());
                drop(store);
                if path.exists() {
                    fs::remove_dir_all(path).map_err(|err| storage_err!("fs::remove_dir_all schema_wipe", err))?;
                }
                return Self::open_with_options(path, false);
            }
            return Err(err);
        }
        info!("RocksStatusStore opened path={}", path.display());
        Ok(store)
    }

    /// Opens `${data_dir}/mint-status`, creating the directory if needed.
    pub fn open_in_dir(data_dir: impl AsRef<Path>, allow_schema_wipe: bool) -> Result<Self, PipelineError> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir).map_err(|err| storage_err!("fs::create_dir_all open_in_dir", err))?;
        Self::open_with_options(dir.join(DB_DIR_NAME), allow_schema_wipe)
    }

    /// Syncs the write-ahead log; called once on clean shutdown.
    pub fn flush(&self) -> Result<(), PipelineError> {
        self.db.flush_wal(true).map_err(|err| storage_err!("rocksdb flush_wal", err))
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily, PipelineError> {
        self.db.cf_handle(name).ok_or_else(|| PipelineError::StorageError {
            operation: "rocksdb cf_handle".to_string(),
            details: format!("missing column family: {}", name),
        })
    }

    fn maybe_run_migrations(&self) -> Result<(), PipelineError> {
        match self.schema_version()? {
            None => {
                info!("initializing fresh db schema schema_version={}", SCHEMA_VERSION);
                self.set_schema_version(SCHEMA_VERSION)
            }
            Some(v) if v == SCHEMA_VERSION => Ok(()),
            Some(v) => Err(PipelineError::SchemaMismatch { stored: v, current: SCHEMA_VERSION }),
        }
    }

    fn schema_version(&self) -> Result<Option<u32>, PipelineError> {
        let cf = self.cf_handle(CF_METADATA)?;
        let Some(bytes) = self.db.get_cf(cf, SCHEMA_VERSION_KEY).map_err(|e| storage_err!("rocksdb get_cf schema_version", e))? else {
            return Ok(None);
        };
        let array: [u8; 4] = bytes.as_slice().try_into().map_err(|_| PipelineError::StorageError {
            operation: "schema_version decode".to_string(),
            details: "corrupt schema version".to_string(),
        })?;
        Ok(Some(u32::from_be_bytes(array)))
    }

    fn set_schema_version(&self, version: u32) -> Result<(), PipelineError> {
        let cf = self.cf_handle(CF_METADATA)?;
        self.db.put_cf(cf, SCHEMA_VERSION_KEY, version.to_be_bytes()).map_err(PipelineError::from)
    }

    fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, PipelineError> {
        bincode::DefaultOptions::new().with_fixint_encoding().serialize(value).map_err(|err| err.into())
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, PipelineError> {
        bincode::DefaultOptions::new().with_fixint_encoding().deserialize(bytes).map_err(|err| err.into())
    }

    fn get_value<T: serde::de::DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>, PipelineError> {
        let cf = self.cf_handle(cf_name)?;
        match self.db.get_cf(cf, key).map_err(|err| storage_err!(format!("rocksdb get_cf {}", cf_name), err))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Keys of `cf_name` starting with `prefix`, with the prefix stripped.
    fn scan_prefix(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<Vec<u8>>, PipelineError> {
        let cf = self.cf_handle(cf_name)?;
        let mut suffixes = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward)) {
            let (key, _) = item.map_err(|err| storage_err!(format!("rocksdb iterator {}", cf_name), err))?;
            if !key.starts_with(prefix) {
                break;
            }
            suffixes.push(key[prefix.len()..].to_vec());
        }
        Ok(suffixes)
    }

    fn scan_values<T: serde::de::DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>, PipelineError> {
        let cf = self.cf_handle(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|err| storage_err!(format!("rocksdb iterator {}", cf_name), err))?;
            values.push(Self::decode(&value)?);
        }
        Ok(values)
    }

    fn key_event_prefix(event_id: &str) -> Vec<u8> {
        KeyBuilder::with_capacity(4 + event_id.len()).str_lp(event_id).build()
    }
}
