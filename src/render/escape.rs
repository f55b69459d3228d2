//! HTML and URL-path escaping

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;

/// Characters left as-is in a URL path: unreserved marks plus the reserved
/// characters that are legal inside a path (`?` is not)
const PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

/// Escape `&`, `<`, `>`, `"` and `'` for use in HTML text or attributes
pub fn html_escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut escaped = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Encode `name` as a relative URL path.
///
/// `?`, `#` and `%` are escaped so they stay part of the path. A colon in the
/// first segment would read as a URL scheme, so such names get a `./` prefix.
pub fn href_escape(name: &str) -> String {
    let encoded = utf8_percent_encode(name, PATH).to_string();
    let first_segment = encoded.split('/').next().unwrap_or_default();
    if first_segment.contains(':') {
        format!("./{encoded}")
    } else {
        encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape_no_special_chars() {
        assert_eq!(html_escape("notes.txt"), Cow::Borrowed("notes.txt"));
    }

    #[test]
    fn test_html_escape_all_specials() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&#34;x&#34;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_href_plain_names() {
        assert_eq!(href_escape("a.md"), "a.md");
        assert_eq!(href_escape("sub/"), "sub/");
    }

    #[test]
    fn test_href_escapes_query_and_fragment() {
        assert_eq!(href_escape("what?.txt"), "what%3F.txt");
        assert_eq!(href_escape("#1.md"), "%231.md");
        assert_eq!(href_escape("100%.txt"), "100%25.txt");
        assert_eq!(href_escape("my notes.txt"), "my%20notes.txt");
    }

    #[test]
    fn test_href_non_ascii() {
        assert_eq!(href_escape("日记.txt"), "%E6%97%A5%E8%AE%B0.txt");
    }

    #[test]
    fn test_href_colon_prefix() {
        assert_eq!(href_escape("a:b.txt"), "./a:b.txt");
    }

    #[test]
    fn test_href_keeps_path_reserved() {
        assert_eq!(href_escape("a&b=c@d.txt"), "a&b=c@d.txt");
        assert_eq!(href_escape("it's.txt"), "it%27s.txt");
    }
}
