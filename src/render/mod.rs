//! Content rendering module
//!
//! Classifies a resource, turns it into an HTML fragment and embeds the
//! fragment in the shared page template.

pub mod escape;
pub mod listing;
pub mod markdown;
pub mod plain;
mod template;

pub use template::PageTemplate;

use crate::error::RenderError;
use crate::fs::Entry;
use hyper::body::Bytes;
use std::borrow::Cow;

/// Kind of document produced for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    PlainText,
    Markdown,
    DirectoryListing,
}

/// A resource ready to be turned into a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content<'a> {
    PlainText(Cow<'a, str>),
    Markdown(Cow<'a, str>),
    Listing(Vec<Entry>),
}

impl<'a> Content<'a> {
    /// Classify a file that already passed the visibility filter: `.txt` is
    /// plain text, anything else is Markdown. Invalid UTF-8 is replaced.
    pub fn file(name: &str, bytes: &'a [u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        if name.ends_with(".txt") {
            Self::PlainText(text)
        } else {
            Self::Markdown(text)
        }
    }

    pub const fn content_type(&self) -> ContentType {
        match self {
            Self::PlainText(_) => ContentType::PlainText,
            Self::Markdown(_) => ContentType::Markdown,
            Self::Listing(_) => ContentType::DirectoryListing,
        }
    }
}

/// Output of rendering one file or directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub title: String,
    pub body_fragment: String,
    pub content_type: ContentType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// HTML-escape plain-text lines before wrapping them in paragraphs
    pub escape_plain_text: bool,
}

/// Renders documents against a template parsed once at startup
#[derive(Debug)]
pub struct Renderer {
    template: PageTemplate,
    options: RenderOptions,
}

impl Renderer {
    pub const fn new(template: PageTemplate, options: RenderOptions) -> Self {
        Self { template, options }
    }

    pub fn render(&self, title: &str, content: Content<'_>) -> RenderedDocument {
        let content_type = content.content_type();
        let body_fragment = match content {
            Content::PlainText(text) => plain::to_paragraphs(&text, self.options.escape_plain_text),
            Content::Markdown(text) => markdown::to_html(&text),
            Content::Listing(entries) => listing::to_html(entries),
        };
        RenderedDocument {
            title: title.to_string(),
            body_fragment,
            content_type,
        }
    }

    /// Embed `document` in the page template.
    ///
    /// The returned buffer is immutable; ranges are served by slicing it.
    pub fn render_page(&self, document: &RenderedDocument) -> Result<Bytes, RenderError> {
        let page = self
            .template
            .render(&document.title, &document.body_fragment)?;
        Ok(Bytes::from(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn renderer() -> Renderer {
        Renderer::new(PageTemplate::embedded().unwrap(), RenderOptions::default())
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            Content::file("a.txt", b"").content_type(),
            ContentType::PlainText
        );
        assert_eq!(
            Content::file("a.md", b"").content_type(),
            ContentType::Markdown
        );
        assert_eq!(
            Content::file("a.markdown", b"").content_type(),
            ContentType::Markdown
        );
        assert_eq!(
            Content::Listing(Vec::new()).content_type(),
            ContentType::DirectoryListing
        );
    }

    #[test]
    fn test_plain_text_document() {
        let doc = renderer().render(
            "notes.txt",
            Content::file("notes.txt", b"hello\n\n  world  \n"),
        );
        assert_eq!(doc.title, "notes.txt");
        assert_eq!(doc.body_fragment, "<p>hello</p><p>world</p>");
        assert_eq!(doc.content_type, ContentType::PlainText);
    }

    #[test]
    fn test_plain_text_escape_option() {
        let renderer = Renderer::new(
            PageTemplate::embedded().unwrap(),
            RenderOptions {
                escape_plain_text: true,
            },
        );
        let doc = renderer.render("x.txt", Content::file("x.txt", b"<i>"));
        assert_eq!(doc.body_fragment, "<p>&lt;i&gt;</p>");
    }

    #[test]
    fn test_markdown_document() {
        let doc = renderer().render("readme.md", Content::file("readme.md", b"# Hi"));
        assert_eq!(doc.content_type, ContentType::Markdown);
        assert!(doc.body_fragment.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let doc = renderer().render("x.txt", Content::file("x.txt", b"ok \xff"));
        assert_eq!(doc.body_fragment, "<p>ok \u{fffd}</p>");
    }

    #[test]
    fn test_listing_document_and_page() {
        let renderer = renderer();
        let doc = renderer.render(
            "docs",
            Content::Listing(vec![Entry::file("a.md", 1, UNIX_EPOCH)]),
        );
        assert_eq!(doc.content_type, ContentType::DirectoryListing);

        let page = renderer.render_page(&doc).unwrap();
        let page = std::str::from_utf8(&page).unwrap();
        assert!(page.contains("<title>docs</title>"));
        assert!(page.contains("<a href=\"a.md\">a.md</a>"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = renderer();
        let first = renderer.render("a.md", Content::file("a.md", b"*x*"));
        let second = renderer.render("a.md", Content::file("a.md", b"*x*"));
        assert_eq!(first, second);
        assert_eq!(
            renderer.render_page(&first).unwrap(),
            renderer.render_page(&second).unwrap()
        );
    }
}
