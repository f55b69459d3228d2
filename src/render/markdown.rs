//! Markdown to HTML conversion (CommonMark + GitHub extensions)

use comrak::{markdown_to_html, Options};

/// Convert `content` with tables, strikethrough, autolinks, task lists and
/// the tag filter enabled. Raw HTML in the source is not passed through.
pub fn to_html(content: &str) -> String {
    markdown_to_html(content, &gfm_options())
}

fn gfm_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.tagfilter = true;
    options
}
