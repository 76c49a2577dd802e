use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Target alphabet only; hyphens and everything else act as separators.
    static ref WORD: Regex = Regex::new(r"[а-яё]+").expect("valid regex");
}

/// Split page text into its raw word stream: NFKC normalization, lowercase,
/// then maximal runs of the target alphabet. Hyphenated words yield their parts.
pub fn word_stream(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    WORD.find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}
