use std::sync::LazyLock;
use regex::Regex;
use crate::analysis::token::Token;

/// Characters treated as word separators in catalog text.
pub const PUNCTUATION: &str = ",.?;:!()&'\"";

// "Spider-Man's Return" indexes as "spider-man", not "spider-man" + "s".
static POSSESSIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)'s(\s|$)").expect("possessive pattern is valid"));

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;

    fn clone_box(&self) -> Box<dyn Tokenizer>;
}

/// Whitespace tokenizer for comic metadata: drops possessive suffixes and
/// treats [`PUNCTUATION`] and control characters as whitespace. Hyphens
/// survive, so "x-men" stays one token. Words of any length are kept.
#[derive(Clone, Default)]
pub struct CatalogTokenizer;

impl Tokenizer for CatalogTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let stripped = POSSESSIVE.replace_all(text, " ");
        let spaced: String = stripped
            .chars()
            .map(|c| if PUNCTUATION.contains(c) || c.is_control() { ' ' } else { c })
            .collect();

        spaced
            .split_whitespace()
            .enumerate()
            .map(|(position, word)| Token::new(word.to_string(), position as u32))
            .collect()
    }

    fn name(&self) -> &str {
        "catalog"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(CatalogTokenizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        CatalogTokenizer::default()
            .tokenize(text)
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn strips_possessive_and_punctuation() {
        assert_eq!(texts("Spider-Man's Amazing Fate!"), vec!["Spider-Man", "Amazing", "Fate"]);
        assert_eq!(texts("Wolverine's"), vec!["Wolverine"]);
        assert_eq!(texts("SPIDER-MAN'S RETURN"), vec!["SPIDER-MAN", "RETURN"]);
    }

    #[test]
    fn long_words_are_kept() {
        let word = "a".repeat(300);
        assert_eq!(texts(&format!("{} hero", word)), vec![word, "hero".to_string()]);
    }

    #[test]
    fn control_characters_split_words() {
        assert_eq!(texts("dark\u{0}phoenix\u{7}saga"), vec!["dark", "phoenix", "saga"]);
    }

    #[test]
    fn punctuation_splits_words() {
        assert_eq!(
            texts("Batman & Robin: \"Year One\" (part 1), vol.2"),
            vec!["Batman", "Robin", "Year", "One", "part", "1", "vol", "2"]
        );
    }

    #[test]
    fn positions_follow_output_order() {
        let tokens = CatalogTokenizer::default().tokenize("a  b\tc");
        let positions: Vec<u32> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn empty_and_blank_text() {
        assert!(texts("").is_empty());
        assert!(texts(" ,.!? ").is_empty());
    }
}
