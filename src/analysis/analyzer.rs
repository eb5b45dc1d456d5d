use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::stopword::{StopWordFilter, StopWords};
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{CatalogTokenizer, Tokenizer};

/// Text analysis pipeline
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: String, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            name,
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Token texts only, in field order. Duplicates are kept.
    pub fn terms(&self, text: &str) -> Vec<String> {
        self.analyze(text).into_iter().map(|t| t.text).collect()
    }

    /// Analyzer used for comic metadata and search queries.
    pub fn catalog(stop_words: StopWords) -> Self {
        Analyzer::new("catalog".to_string(), Box::new(CatalogTokenizer::default()))
            .add_filter(Box::new(LowercaseFilter))
            .add_filter(Box::new(StopWordFilter::new(stop_words)))
    }
}

impl Clone for Analyzer {
    fn clone(&self) -> Self {
        Analyzer {
            tokenizer: self.tokenizer.clone_box(),
            filters: self.filters.clone(),
            name: self.name.clone(),
        }
    }
}

/// Splits `text` into lower-cased index terms, leaving out `stop_words`.
pub fn tokenize(text: &str, stop_words: &StopWords) -> Vec<String> {
    Analyzer::catalog(stop_words.clone()).terms(text)
}
