use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Comic;
use crate::keys::composite::CompositeKey;
use crate::storage::transaction::{prefix, Tx, WriteTx};

/// Comic records keyed by serialized composite key, so every series and
/// every issue is a contiguous key range.
pub const COMICS_TABLE: &str = "comics";

fn decode(key: &CompositeKey, encoded: &[u8]) -> Result<Comic> {
    serde_json::from_slice(encoded).map_err(|e| {
        Error::corrupted(format!("Unreadable comic record {}: {}", key, e))
    })
}

fn decode_entry(serialized: &[u8], encoded: &[u8]) -> Result<(CompositeKey, Comic)> {
    let key = CompositeKey::deserialize(serialized)?;
    let comic = decode(&key, encoded)?;
    Ok((key, comic))
}

/// The comic stored at `key`. `Ok(None)` means no record, not a failure.
pub fn get(tx: &impl Tx, key: &CompositeKey) -> Result<Option<Comic>> {
    match tx.get(COMICS_TABLE, &key.serialize())? {
        Some(encoded) => decode(key, &encoded).map(Some),
        None => Ok(None),
    }
}

/// Stores `comic` at `key`.
///
/// First writer wins: a key already holding a different raw identity, or a
/// series holding another raw SeriesId, is a collision and nothing is
/// written.
pub fn put(tx: &mut WriteTx, key: &CompositeKey, comic: &Comic) -> Result<()> {
    if let Some(existing) = get(&*tx, key)? {
        if !existing.same_identity(comic) {
            return Err(collision(key, &existing, comic));
        }
    } else if let Some(other) = first_in_series(&*tx, &key.series)? {
        if other.series_id != comic.series_id {
            return Err(collision(key, &other, comic));
        }
    }

    let encoded = serde_json::to_vec(comic)?;
    tx.put(COMICS_TABLE, &key.serialize(), &encoded)
}

fn collision(key: &CompositeKey, existing: &Comic, submitted: &Comic) -> Error {
    Error::new(
        ErrorKind::Collision,
        format!(
            "Key {} already belongs to {} #{} ({}), cannot store {} #{} ({})",
            key,
            existing.series_id,
            existing.issue,
            existing.cover_id,
            submitted.series_id,
            submitted.issue,
            submitted.cover_id
        ),
    )
}

/// Removes the record. Returns whether there was one.
pub fn delete(tx: &mut WriteTx, key: &CompositeKey) -> Result<bool> {
    tx.delete(COMICS_TABLE, &key.serialize())
}

fn first_in_series(tx: &impl Tx, series: &str) -> Result<Option<Comic>> {
    match tx.first(COMICS_TABLE, &prefix(series.as_bytes()))? {
        Some((serialized, encoded)) => Ok(Some(decode_entry(&serialized, &encoded)?.1)),
        None => Ok(None),
    }
}

/// Every comic of the series stored under `series_key`, in key order.
pub fn scan_series(tx: &impl Tx, series_key: &str) -> Result<Vec<(CompositeKey, Comic)>> {
    tx.scan(COMICS_TABLE, &prefix(series_key.as_bytes()))?
        .iter()
        .map(|(serialized, encoded)| decode_entry(serialized, encoded))
        .collect()
}

/// Every comic, in key order.
pub fn scan_all(tx: &impl Tx) -> Result<Vec<(CompositeKey, Comic)>> {
    tx.scan(COMICS_TABLE, b"")?
        .iter()
        .map(|(serialized, encoded)| decode_entry(serialized, encoded))
        .collect()
}

/// Sanitized keys of every stored series, in order.
pub fn series_keys(tx: &impl Tx) -> Result<Vec<String>> {
    let mut keys: Vec<String> = Vec::new();
    for (serialized, _) in tx.scan(COMICS_TABLE, b"")? {
        let key = CompositeKey::deserialize(&serialized)?;
        if keys.last() != Some(&key.series) {
            keys.push(key.series);
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::Store;

    #[test]
    fn get_put_and_not_found() {
        let store = Store::in_memory().unwrap();
        let comic = Comic::new("X-Men", "1", "A");
        let key = comic.key();

        assert!(store.view(|tx| get(tx, &key)).unwrap().is_none());
        store.update(|tx| put(tx, &key, &comic)).unwrap();
        assert_eq!(store.view(|tx| get(tx, &key)).unwrap(), Some(comic));
    }

    #[test]
    fn colliding_identity_is_rejected() {
        let store = Store::in_memory().unwrap();
        let first = Comic::new("X Men", "1", "A");
        store.update(|tx| put(tx, &first.key(), &first)).unwrap();

        let other = Comic::new("X_Men", "1", "A");
        assert_eq!(other.key(), first.key());
        let err = store.update(|tx| put(tx, &other.key(), &other)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Collision);

        let sibling = Comic::new("X  Men", "2", "A");
        let err = store.update(|tx| put(tx, &sibling.key(), &sibling)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Collision);

        let stored = store.view(|tx| get(tx, &first.key())).unwrap().unwrap();
        assert_eq!(stored.series_id, "X Men");
    }

    #[test]
    fn delete_removes_only_that_record() {
        let store = Store::in_memory().unwrap();
        let a = Comic::new("Hulk", "1", "A");
        let b = Comic::new("Hulk", "1", "B");
        store
            .update(|tx| {
                put(tx, &a.key(), &a)?;
                put(tx, &b.key(), &b)
            })
            .unwrap();

        assert!(store.update(|tx| delete(tx, &a.key())).unwrap());
        assert_eq!(store.view(|tx| scan_series(tx, "hulk")).unwrap().len(), 1);
        assert!(store.update(|tx| delete(tx, &b.key())).unwrap());
        assert!(!store.update(|tx| delete(tx, &b.key())).unwrap());
        assert!(store.view(|tx| series_keys(tx)).unwrap().is_empty());
    }

    #[test]
    fn scan_all_is_key_ordered() {
        let store = Store::in_memory().unwrap();
        let comics = [
            Comic::new("Thor", "2", "A"),
            Comic::new("Hulk", "10", "A"),
            Comic::new("Hulk", "1", "B"),
            Comic::new("Hulk", "1", "A"),
        ];
        store
            .update(|tx| {
                for c in &comics {
                    put(tx, &c.key(), c)?;
                }
                Ok(())
            })
            .unwrap();

        let keys: Vec<String> = store
            .view(|tx| scan_all(tx))
            .unwrap()
            .into_iter()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(keys, vec!["hulk/1/a", "hulk/1/b", "hulk/10/a", "thor/2/a"]);
        assert_eq!(store.view(|tx| series_keys(tx)).unwrap(), vec!["hulk", "thor"]);
        assert_eq!(store.view(|tx| scan_series(tx, "hulk")).unwrap().len(), 3);
    }
}
