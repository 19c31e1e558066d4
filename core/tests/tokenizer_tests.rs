use recipe_core::tokenizer::{recipe_terms, terms};

#[test]
fn it_normalizes_and_stems() {
    let words = terms("Roasted Potatoes with \u{FB01}sh");
    assert!(words.contains("roast"));
    assert!(words.contains("potato"));
    // NFKC folds the ligature
    assert!(words.contains("fish"));
}

#[test]
fn it_filters_stopwords() {
    let words = terms("Salt and pepper to the taste");
    assert!(!words.contains("and"));
    assert!(!words.contains("the"));
    assert!(!words.contains("to"));
    assert!(words.contains("salt"));
}

#[test]
fn recipe_terms_cover_title_and_ingredients() {
    let words = recipe_terms("Leek soup", "leeks, butter");
    assert!(words.contains("soup"));
    assert!(words.contains("butter"));
    assert_eq!(words.iter().filter(|w| w.as_str() == "leek").count(), 1);
}
