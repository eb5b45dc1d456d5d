use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use redb::{Database, ReadableDatabase};
use tracing::{debug, info, warn};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::storage::transaction::{ReadTx, WriteTx};

pub const DATABASE_FILE: &str = "catalog.redb";

/// Transactional table store over a redb database.
///
/// Readers see the last committed snapshot and never block the writer. redb
/// runs at most one write transaction at a time; an update commits when its
/// closure returns `Ok` and aborts otherwise.
pub struct Store {
    db: Database,
    path: Option<PathBuf>,
    version: AtomicU64,
}

impl Store {
    pub fn open(config: &Config) -> Result<Self> {
        if config.in_memory {
            return Store::in_memory();
        }

        std::fs::create_dir_all(&config.storage_path)?;
        let path = config.storage_path.join(DATABASE_FILE);
        let db = Database::builder()
            .set_cache_size(config.cache_size)
            .create(&path)?;
        info!(path = %path.display(), "Opened catalog database");

        Ok(Store {
            db,
            path: Some(path),
            version: AtomicU64::new(0),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Ok(Store {
            db,
            path: None,
            version: AtomicU64::new(0),
        })
    }

    /// Write transactions committed since the store was opened.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Runs `f` in a read-only transaction.
    pub fn view<T>(&self, f: impl FnOnce(&ReadTx) -> Result<T>) -> Result<T> {
        let tx = ReadTx::new(self.db.begin_read()?);
        f(&tx)
    }

    /// Runs `f` in a read-write transaction. `Ok` commits everything `f` did;
    /// `Err` aborts it.
    pub fn update<T>(&self, f: impl FnOnce(&mut WriteTx) -> Result<T>) -> Result<T> {
        let mut tx = WriteTx::new(self.db.begin_write()?);
        match f(&mut tx) {
            Ok(value) => {
                tx.into_inner().commit()?;
                let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
                debug!(version, "Committed write transaction");
                Ok(value)
            }
            Err(err) => {
                if let Err(abort) = tx.into_inner().abort() {
                    warn!(error = %abort, "Failed to abort write transaction");
                }
                debug!(error = %err, "Rolled back write transaction");
                Err(err)
            }
        }
    }

    /// Reclaims free pages in the database file. Returns whether anything
    /// was compacted.
    pub fn compact(&mut self) -> Result<bool> {
        let compacted = self.db.compact()?;
        if compacted {
            info!("Compacted catalog database");
        }
        Ok(compacted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{Error, ErrorKind};
    use crate::storage::transaction::Tx;

    #[test]
    fn aborted_update_leaves_no_trace() {
        let store = Store::in_memory().unwrap();
        let result: Result<()> = store.update(|tx| {
            tx.put("comics", b"k", b"v")?;
            Err(Error::invalid_input("nope"))
        });
        assert!(result.is_err());
        assert_eq!(store.view(|tx| tx.len("comics")).unwrap(), 0);
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn commits_are_counted() {
        let store = Store::in_memory().unwrap();
        store.update(|tx| tx.put("b", b"k", b"1")).unwrap();
        store.update(|tx| tx.put("b", b"k", b"2")).unwrap();
        assert_eq!(store.view(|tx| tx.get("b", b"k")).unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn reopen_keeps_committed_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::at(dir.path());
        {
            let store = Store::open(&config).unwrap();
            store.update(|tx| tx.put("comics", b"k", b"v")).unwrap();
            store.update(|tx| tx.put("comics", b"gone", b"x")).unwrap();
            store.update(|tx| tx.delete("comics", b"gone").map(|_| ())).unwrap();
        }
        let mut store = Store::open(&config).unwrap();
        assert_eq!(store.path(), Some(&dir.path().join(DATABASE_FILE)));
        assert_eq!(store.view(|tx| tx.get("comics", b"k")).unwrap(), Some(b"v".to_vec()));
        assert!(store.view(|tx| tx.get("comics", b"gone")).unwrap().is_none());

        store.compact().unwrap();
        assert_eq!(store.view(|tx| tx.len("comics")).unwrap(), 1);
    }

    #[test]
    fn second_open_is_locked_out() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::at(dir.path());
        let _first = Store::open(&config).unwrap();
        let err = Store::open(&config).err().unwrap();
        assert_eq!(err.kind, ErrorKind::Locked);
    }
}
