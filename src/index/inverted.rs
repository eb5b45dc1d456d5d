use std::collections::BTreeSet;
use tracing::debug;
use crate::analysis::analyzer::Analyzer;
use crate::core::error::{Error, Result};
use crate::core::types::Comic;
use crate::keys::composite::CompositeKey;
use crate::storage::transaction::{nested, prefix, Tx, WriteTx, SEPARATOR};

pub const WORD_INDEX_TABLE: &str = "comics_word_idx";
pub const WORD_KEYS_TABLE: &str = "comics_word_keys";

/// How multi-term queries combine the per-term posting sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    All,
    Any,
}

/// Token -> composite key index over the descriptive text of comics.
///
/// Postings live in `comics_word_idx` as `<token> NUL <composite key>` with an
/// empty value. The token set each comic was last indexed with is kept in
/// `comics_word_keys` so a re-index can retract the postings it no longer
/// earns.
#[derive(Clone)]
pub struct InvertedIndex {
    pub analyzer: Analyzer,
}

impl InvertedIndex {
    pub fn new(analyzer: Analyzer) -> Self {
        InvertedIndex { analyzer }
    }

    /// Distinct tokens of every indexed field of `comic`.
    pub fn tokens_for(&self, comic: &Comic) -> BTreeSet<String> {
        comic
            .indexed_fields()
            .iter()
            .flat_map(|field| self.analyzer.terms(field))
            .collect()
    }

    /// Tokens `key` is currently indexed under.
    pub fn indexed_tokens(&self, tx: &impl Tx, key: &CompositeKey) -> Result<BTreeSet<String>> {
        match tx.get(WORD_KEYS_TABLE, &key.serialize())? {
            Some(encoded) => serde_json::from_slice(&encoded).map_err(|e| {
                Error::corrupted(format!("Unreadable token set for {}: {}", key, e))
            }),
            None => Ok(BTreeSet::new()),
        }
    }

    pub fn index_comic(&self, tx: &mut WriteTx, key: &CompositeKey, comic: &Comic) -> Result<()> {
        let tokens = self.tokens_for(comic);
        self.write_tokens(tx, key, tokens)
    }

    /// Replaces the postings of `key` with `tokens`.
    pub fn write_tokens(
        &self,
        tx: &mut WriteTx,
        key: &CompositeKey,
        tokens: BTreeSet<String>,
    ) -> Result<()> {
        let serialized = key.serialize();
        let previous = self.indexed_tokens(&*tx, key)?;

        for stale in previous.difference(&tokens) {
            tx.delete(WORD_INDEX_TABLE, &nested(stale.as_bytes(), &serialized))?;
        }
        for token in tokens.difference(&previous) {
            tx.put(WORD_INDEX_TABLE, &nested(token.as_bytes(), &serialized), &[])?;
        }

        if tokens.is_empty() {
            tx.delete(WORD_KEYS_TABLE, &serialized)?;
        } else if tokens != previous {
            tx.put(WORD_KEYS_TABLE, &serialized, &serde_json::to_vec(&tokens)?)?;
        }

        debug!(key = %key, tokens = tokens.len(), retracted = previous.difference(&tokens).count(), "Indexed comic");
        Ok(())
    }

    /// Drops every posting of `key`.
    pub fn remove(&self, tx: &mut WriteTx, key: &CompositeKey) -> Result<()> {
        self.write_tokens(tx, key, BTreeSet::new())
    }

    /// Keys posted under `token`, in key order.
    pub fn postings(&self, tx: &impl Tx, token: &str) -> Result<BTreeSet<CompositeKey>> {
        let start = prefix(token.as_bytes());
        tx.scan(WORD_INDEX_TABLE, &start)?
            .iter()
            .map(|(posting, _)| CompositeKey::deserialize(&posting[start.len()..]))
            .collect()
    }

    /// Matching keys for each analyzed query term, computed independently.
    pub fn term_matches(&self, tx: &impl Tx, query: &str) -> Result<Vec<(String, BTreeSet<CompositeKey>)>> {
        let mut terms = self.analyzer.terms(query);
        terms.dedup();
        terms
            .into_iter()
            .map(|term| {
                let keys = self.postings(tx, &term)?;
                Ok((term, keys))
            })
            .collect()
    }

    /// Keys matching `query`. A query with no terms left after analysis
    /// matches nothing.
    pub fn search(&self, tx: &impl Tx, query: &str, mode: SearchMode) -> Result<Vec<CompositeKey>> {
        let matches = self.term_matches(tx, query)?;
        let mut sets = matches.into_iter().map(|(_, keys)| keys);

        let Some(first) = sets.next() else {
            return Ok(Vec::new());
        };
        let combined = sets.fold(first, |acc, keys| match mode {
            SearchMode::All => acc.intersection(&keys).cloned().collect(),
            SearchMode::Any => acc.union(&keys).cloned().collect(),
        });
        Ok(combined.into_iter().collect())
    }

    /// Number of distinct tokens with at least one posting.
    pub fn token_count(&self, tx: &impl Tx) -> Result<usize> {
        let mut count = 0;
        let mut last: Option<Vec<u8>> = None;
        for (posting, _) in tx.scan(WORD_INDEX_TABLE, b"")? {
            let token = posting.split(|b| *b == SEPARATOR).next().unwrap_or_default();
            if last.as_deref() != Some(token) {
                count += 1;
                last = Some(token.to_vec());
            }
        }
        Ok(count)
    }

    /// Deletes the whole index.
    pub fn clear(&self, tx: &mut WriteTx) -> Result<()> {
        tx.clear(WORD_INDEX_TABLE)?;
        tx.clear(WORD_KEYS_TABLE)?;
        Ok(())
    }
}
