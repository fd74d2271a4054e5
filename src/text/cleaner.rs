//! Tweet cleaning.
//!
//! Order matters: punctuation is removed before the link filter runs, so
//! `https://t.co/x` reaches the filter as `httpstcox` and is still dropped.

/// Clean a tweet: lowercase it, strip ASCII punctuation, turn newlines into
/// spaces, and drop every whitespace-separated token containing `http`.
pub fn clean_text(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|ch| !ch.is_ascii_punctuation())
        .map(|ch| if ch == '\n' { ' ' } else { ch })
        .collect();

    stripped
        .split_whitespace()
        .filter(|token| !token.contains("http"))
        .collect::<Vec<_>>()
        .join(" ")
}
