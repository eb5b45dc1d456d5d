use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;
use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;
use crate::core::error::Result;
use crate::storage::transaction::{Tx, WriteTx};

pub const STOP_WORDS_TABLE: &str = "text-index";
pub const STOP_WORDS_KEY: &[u8] = b"stop-words";

/// Words left out of the search index. Loaded once when the catalog opens and
/// shared by every analyzer built from it; a changed list takes effect on the
/// next open.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: Arc<HashSet<String>>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        StopWords {
            words: Arc::new(words.into_iter().map(|w| w.as_ref().to_lowercase()).collect()),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Sorted copy of the list.
    pub fn words(&self) -> Vec<String> {
        let mut words: Vec<String> = self.words.iter().cloned().collect();
        words.sort();
        words
    }

    /// Reads the persisted list. `None` when no list was ever stored; an
    /// unreadable list is logged and treated as empty.
    pub fn load(tx: &impl Tx) -> Result<Option<Self>> {
        let Some(encoded) = tx.get(STOP_WORDS_TABLE, STOP_WORDS_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_slice::<Vec<String>>(&encoded) {
            Ok(words) => Ok(Some(StopWords::new(words))),
            Err(e) => {
                warn!(error = %e, "Problem reading stop words from store");
                Ok(Some(StopWords::default()))
            }
        }
    }

    pub fn store(&self, tx: &mut WriteTx) -> Result<()> {
        let encoded = serde_json::to_vec(&self.words())?;
        tx.put(STOP_WORDS_TABLE, STOP_WORDS_KEY, &encoded)
    }
}

pub struct StopWordFilter {
    pub stop_words: StopWords,
}

impl StopWordFilter {
    pub fn new(stop_words: StopWords) -> Self {
        StopWordFilter { stop_words }
    }
}

impl TokenFilter for StopWordFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter()
            .filter(|token| !self.stop_words.contains(&token.text.to_lowercase()))
            .collect()
    }

    fn name(&self) -> &str {
        "stop_words"
    }

    fn clone_box(&self) -> Box<dyn TokenFilter> {
        Box::new(StopWordFilter {
            stop_words: self.stop_words.clone(),
        })
    }
}
