use tracing::{debug, warn};
use crate::core::error::Result;
use crate::core::types::SeriesTotal;
use crate::keys::codec::sanitize;
use crate::record::comic_store;
use crate::storage::transaction::{Tx, WriteTx};

/// Cached per-series totals, keyed by sanitized series key.
pub const TOTALS_TABLE: &str = "comics_totals";

/// Decodes a cached total. An unreadable record is logged and read as a
/// stale one, so the next `get_all` recomputes it.
fn decode(series_key: &[u8], encoded: &[u8]) -> SeriesTotal {
    serde_json::from_slice(encoded).unwrap_or_else(|e| {
        warn!(
            series = %String::from_utf8_lossy(series_key),
            error = %e,
            "Unreadable series total, treating it as stale"
        );
        SeriesTotal::default()
    })
}

/// Flags the cached total of `series_id` for recomputation. Creates the
/// record when the series has none yet.
pub fn mark_stale(tx: &mut WriteTx, series_id: &str) -> Result<()> {
    let series_key = sanitize(series_id);
    let mut total = match tx.get(TOTALS_TABLE, series_key.as_bytes())? {
        Some(encoded) => decode(series_key.as_bytes(), &encoded),
        None => SeriesTotal::default(),
    };
    if total.series_id.is_empty() {
        total.series_id = series_id.to_string();
    }
    total.up_to_date = false;
    tx.put(TOTALS_TABLE, series_key.as_bytes(), &serde_json::to_vec(&total)?)
}

/// Counts and sums the books of every comic stored under `series_key`.
/// `None` when the series has no comics left.
pub fn calculate(tx: &impl Tx, series_key: &str) -> Result<Option<SeriesTotal>> {
    let comics = comic_store::scan_series(tx, series_key)?;
    let Some((_, first)) = comics.first() else {
        return Ok(None);
    };

    let mut total = SeriesTotal {
        series_id: first.series_id.clone(),
        up_to_date: true,
        ..SeriesTotal::default()
    };
    for (_, comic) in &comics {
        total.count += comic.books.len() as u64;
        total.value += comic.books.iter().map(|b| b.value).sum::<i64>();
    }
    Ok(Some(total))
}

/// Every series total in series key order. Stale entries are recomputed and
/// written back first; entries whose series has no comics left are dropped.
pub fn get_all(tx: &mut WriteTx) -> Result<Vec<SeriesTotal>> {
    let stored = tx.scan(TOTALS_TABLE, b"")?;

    let mut totals = Vec::with_capacity(stored.len());
    for (series_key, encoded) in stored {
        let total = decode(&series_key, &encoded);
        if total.up_to_date && !total.series_id.is_empty() {
            totals.push(total);
            continue;
        }

        let key = String::from_utf8_lossy(&series_key).into_owned();
        match calculate(&*tx, &key)? {
            Some(fresh) => {
                debug!(series = %key, count = fresh.count, value = fresh.value, "Recomputed series total");
                tx.put(TOTALS_TABLE, &series_key, &serde_json::to_vec(&fresh)?)?;
                totals.push(fresh);
            }
            None => {
                tx.delete(TOTALS_TABLE, &series_key)?;
            }
        }
    }
    Ok(totals)
}

/// Cached total for one series, fresh or not.
pub fn get(tx: &impl Tx, series_id: &str) -> Result<Option<SeriesTotal>> {
    let series_key = sanitize(series_id);
    Ok(tx
        .get(TOTALS_TABLE, series_key.as_bytes())?
        .map(|encoded| decode(series_key.as_bytes(), &encoded)))
}

/// Sum of book counts and values over `totals`.
pub fn grand_total(totals: &[SeriesTotal]) -> (u64, i64) {
    totals
        .iter()
        .fold((0, 0), |(count, value), t| (count + t.count, value + t.value))
}

pub fn clear(tx: &mut WriteTx) -> Result<()> {
    tx.clear(TOTALS_TABLE)?;
    Ok(())
}
