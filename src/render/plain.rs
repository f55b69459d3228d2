//! Plain-text to paragraph conversion

use super::escape::html_escape;
use std::fmt::Write;

/// Wrap every non-blank line of `content` in `<p>...</p>`.
///
/// Lines are split on `\n` (a trailing `\r` is dropped) and trimmed. Line
/// text is inserted verbatim unless `escape` is set.
pub fn to_paragraphs(content: &str, escape: bool) -> String {
    let mut html = String::with_capacity(content.len() + 64);
    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if escape {
            let _ = write!(html, "<p>{}</p>", html_escape(line));
        } else {
            let _ = write!(html, "<p>{line}</p>");
        }
    }
    html
}
