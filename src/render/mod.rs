//! Document rendering for CruX.
//!
//! The cheat sheet comes back from the language model as lightly structured
//! Markdown. It is turned into a PDF for download and into HTML for display.

mod layout;
mod markdown;
mod pdf;

pub use pdf::PdfRenderer;

use crate::error::Result;
use pulldown_cmark::{html, Event, Parser};

/// File name offered for the downloaded document.
pub const DOCUMENT_FILENAME: &str = "CruX_CheatSheet.pdf";

/// MIME type of the downloaded document.
pub const DOCUMENT_MIME_TYPE: &str = "application/pdf";

/// Trait for document renderers.
pub trait DocumentRenderer: Send + Sync {
    /// Render Markdown into document bytes.
    fn render(&self, markdown: &str) -> Result<Vec<u8>>;
}

/// Render Markdown to HTML for on-screen display.
///
/// Raw HTML in the input is escaped rather than passed through.
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, markdown::parser_options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
