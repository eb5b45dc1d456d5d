use crate::core::error::Result;
use crate::core::types::Comic;
use crate::keys::composite::CompositeKey;
use crate::storage::transaction::{Tx, WriteTx};

/// Presence set of unowned comics, keyed by serialized composite key.
pub const MISSING_TABLE: &str = "comics_missing";

/// Reconciles the missing entry of `comic` with its books: present iff it
/// owns none. Idempotent.
pub fn sync(tx: &mut WriteTx, key: &CompositeKey, comic: &Comic) -> Result<()> {
    let serialized = key.serialize();
    if comic.is_missing() {
        if !tx.contains(MISSING_TABLE, &serialized)? {
            tx.put(MISSING_TABLE, &serialized, &[])?;
        }
    } else {
        tx.delete(MISSING_TABLE, &serialized)?;
    }
    Ok(())
}

pub fn remove(tx: &mut WriteTx, key: &CompositeKey) -> Result<()> {
    tx.delete(MISSING_TABLE, &key.serialize())?;
    Ok(())
}

pub fn contains(tx: &impl Tx, key: &CompositeKey) -> Result<bool> {
    tx.contains(MISSING_TABLE, &key.serialize())
}

pub fn count(tx: &impl Tx) -> Result<u64> {
    tx.len(MISSING_TABLE)
}

/// Keys of all unowned comics, in key order.
pub fn list(tx: &impl Tx) -> Result<Vec<CompositeKey>> {
    tx.scan(MISSING_TABLE, b"")?
        .iter()
        .map(|(serialized, _)| CompositeKey::deserialize(serialized))
        .collect()
}

pub fn clear(tx: &mut WriteTx) -> Result<()> {
    tx.clear(MISSING_TABLE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Book, Grade};
    use crate::storage::store::Store;

    #[test]
    fn entry_tracks_ownership() {
        let store = Store::in_memory().unwrap();
        let mut comic = Comic::new("X-Men", "1", "A");
        let key = comic.key();

        for _ in 0..2 {
            store.update(|tx| sync(tx, &key, &comic)).unwrap();
            assert!(store.view(|tx| contains(tx, &key)).unwrap());
        }

        comic.books.push(Book::new(Grade::VeryFine, 500));
        store.update(|tx| sync(tx, &key, &comic)).unwrap();
        assert!(!store.view(|tx| contains(tx, &key)).unwrap());

        comic.books.clear();
        store.update(|tx| sync(tx, &key, &comic)).unwrap();
        assert_eq!(store.view(|tx| list(tx)).unwrap(), vec![key]);
        assert_eq!(store.view(|tx| count(tx)).unwrap(), 1);
    }

    #[test]
    fn list_is_key_ordered() {
        let store = Store::in_memory().unwrap();
        let comics = [
            Comic::new("Thor", "1", "a"),
            Comic::new("Hulk", "2", "a"),
            Comic::new("Hulk", "1", "a"),
        ];
        store
            .update(|tx| {
                for c in &comics {
                    sync(tx, &c.key(), c)?;
                }
                Ok(())
            })
            .unwrap();

        let keys: Vec<String> = store
            .view(|tx| list(tx))
            .unwrap()
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(keys, vec!["hulk/1/a", "hulk/2/a", "thor/1/a"]);
    }
}
