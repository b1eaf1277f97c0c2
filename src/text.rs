//! Escaping of server-provided text before it reaches the terminal.
//!
//! Book titles and authors come from the server verbatim. A terminal
//! interprets ESC sequences and other control characters, so every such
//! character is rewritten as a visible `\u{..}` escape. Everything else,
//! HTML included, is plain text on a terminal and passes through untouched.

use std::borrow::Cow;

/// Return `s` with control characters made visible.
pub fn escape_text(s: &str) -> Cow<'_, str> {
    if !s.chars().any(needs_escape) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        if needs_escape(c) {
            out.push_str(&format!("\\u{{{:x}}}", c as u32));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

fn needs_escape(c: char) -> bool {
    // C0 (includes ESC, CR, LF, TAB), DEL and C1 controls, plus bidi overrides
    c.is_control() || matches!(c, '\u{202a}'..='\u{202e}' | '\u{2066}'..='\u{2069}')
}
