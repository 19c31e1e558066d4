use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{BTreeSet, HashSet};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "in", "into",
            "is", "it", "its", "of", "on", "or", "some", "the", "then", "to", "until", "with",
        ];
        words.iter().copied().collect()
    };
}

/// Split recipe text into index terms: NFKC, lowercase, stopwords dropped,
/// English stems. Terms come back deduplicated and sorted.
pub fn terms(text: &str) -> BTreeSet<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    WORD.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|word| !STOPWORDS.contains(word))
        .map(|word| STEMMER.stem(word).into_owned())
        .collect()
}

/// Terms of a recipe's searchable fields, title and ingredients.
pub fn recipe_terms(title: &str, ingredients: &str) -> BTreeSet<String> {
    let mut all = terms(title);
    all.extend(terms(ingredients));
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_plural_ingredients() {
        let t = terms("Tomatoes, onions and carrots");
        assert!(t.contains("tomato"));
        assert!(t.contains("onion"));
        assert!(!t.contains("and"));
    }
}
