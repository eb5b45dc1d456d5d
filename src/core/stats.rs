use serde::Serialize;

/// Catalog statistics for monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub comics: usize,
    pub books: usize,
    pub missing: usize,
    pub series: usize,
    pub tokens: usize,          // Distinct searchable tokens
    pub stop_words: usize,
    pub version: u64,           // Commits since open
}
