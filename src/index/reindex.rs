use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use rayon::prelude::*;
use tracing::info;
use crate::core::error::Result;
use crate::index::inverted::InvertedIndex;
use crate::index::{missing, totals};
use crate::record::comic_store;
use crate::storage::transaction::WriteTx;

/// Outcome of a repair pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub comics: usize,
    pub tokens: usize,
    pub missing: usize,
    pub series: usize,
}

/// Drops every derived index and rebuilds it from the stored comics.
///
/// Tokenizing runs on the rayon pool; all writes happen in `tx`, so the
/// rebuild is all or nothing.
pub fn rebuild(tx: &mut WriteTx, index: &InvertedIndex) -> Result<RepairReport> {
    let started = Instant::now();
    let comics = comic_store::scan_all(&*tx)?;

    let tokenized: Vec<BTreeSet<String>> = comics
        .par_iter()
        .map(|(_, comic)| index.tokens_for(comic))
        .collect();

    index.clear(tx)?;
    missing::clear(tx)?;
    totals::clear(tx)?;

    let mut report = RepairReport {
        comics: comics.len(),
        ..RepairReport::default()
    };
    let mut series = HashSet::new();

    for ((key, comic), tokens) in comics.iter().zip(tokenized) {
        index.write_tokens(tx, key, tokens)?;
        missing::sync(tx, key, comic)?;
        if comic.is_missing() {
            report.missing += 1;
        }
        if series.insert(key.series.clone()) {
            totals::mark_stale(tx, &comic.series_id)?;
        }
    }

    report.series = totals::get_all(tx)?.len();
    report.tokens = index.token_count(&*tx)?;

    info!(
        comics = report.comics,
        tokens = report.tokens,
        missing = report.missing,
        series = report.series,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Rebuilt derived indexes"
    );
    Ok(report)
}
