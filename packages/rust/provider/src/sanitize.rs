//! Punctuation normalization for provider free text.
//!
//! Typographic quotes, guillemets, dashes, the ellipsis glyph and
//! non-breaking spaces are folded to plain ASCII before the text is handed
//! to prompt-building consumers.

/// Fold typographic punctuation in `text` to its ASCII equivalent.
pub fn sanitize_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => out.push('"'),
            // Guillemets
            '\u{00AB}' | '\u{00BB}' => out.push('"'),
            '\u{2039}' | '\u{203A}' => out.push('\''),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}
