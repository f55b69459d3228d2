//! Directory listing fragment

use super::escape::{href_escape, html_escape};
use crate::fs::Entry;
use std::fmt::Write;

/// Shown instead of an empty listing
pub const EMPTY_PLACEHOLDER: &str = "(empty)";

/// Render `entries` as a `<pre>` block of links, sorted by name.
///
/// Directory names get a trailing `/`. Link targets are URL-path escaped and
/// link text is HTML escaped.
pub fn to_html(mut entries: Vec<Entry>) -> String {
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut links = String::new();
    for entry in &entries {
        let name = if entry.is_dir {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        let _ = writeln!(
            links,
            "<a href=\"{}\">{}</a>",
            href_escape(&name),
            html_escape(&name)
        );
    }
    if links.is_empty() {
        links.push_str(EMPTY_PLACEHOLDER);
    }

    format!("<pre>\n{links}</pre>\n")
}
