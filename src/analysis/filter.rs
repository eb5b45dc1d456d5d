use crate::analysis::token::Token;

/// One stage of the analysis pipeline. Filters run in the order they were
/// added to the analyzer and may drop or rewrite tokens.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token>;

    fn name(&self) -> &str;

    fn clone_box(&self) -> Box<dyn TokenFilter>;
}

impl Clone for Box<dyn TokenFilter> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
