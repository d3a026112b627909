//! String utilities for the domain layer.
//!
//! Lengths here count characters, not bytes, so a limit means the same
//! thing for "sugar" and "šećer".

/// The first `max_chars` characters of `s`, followed by `...` if anything
/// was cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    let head = truncate_chars(s, max_chars);
    if head.len() == s.len() {
        s.to_string()
    } else {
        format!("{}...", head)
    }
}

/// Cut a string to at most `max_chars` characters.
///
/// Returns a sub-slice of the original string.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
