//! Approximate word counting for narration scripts.
//!
//! A word is a whitespace-separated token containing at least one
//! alphanumeric character, so stray punctuation ("-", "…") does not count.
//! This is deliberately language-agnostic.

fn is_word(token: &str) -> bool {
    token.chars().any(char::is_alphanumeric)
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().filter(|t| is_word(t)).count()
}

/// Keep the first `max_words` words, preserving the original tokens.
/// Punctuation-only tokens between kept words survive; trailing ones are cut.
/// The result ends with sentence punctuation.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    if count_words(text) <= max_words {
        return text.trim().to_string();
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut words = 0;
    for token in text.split_whitespace() {
        if is_word(token) {
            if words == max_words {
                break;
            }
            words += 1;
        }
        kept.push(token);
    }

    while kept.last().is_some_and(|t| !is_word(t)) {
        kept.pop();
    }

    let mut out = kept.join(" ");
    if let Some(last) = out.chars().last() {
        if !matches!(last, '.' | '!' | '?') {
            out = out.trim_end_matches(|c: char| c == ',' || c == ';' || c == ':').to_string();
            out.push('.');
        }
    }
    out
}
