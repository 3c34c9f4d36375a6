//! PDF output using printpdf's built-in fonts.

use super::layout::{layout, FontFace, PageLayout, PageSpec};
use super::markdown::parse_blocks;
use super::DocumentRenderer;
use crate::config::RenderSettings;
use crate::error::{CruxError, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use tracing::{debug, instrument};

/// Renders cheat sheet Markdown to an A4 PDF.
pub struct PdfRenderer {
    title: String,
    font_size: f32,
    page: PageSpec,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    mono: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let add = |font: BuiltinFont| {
            doc.add_builtin_font(font)
                .map_err(|e| CruxError::Render(format!("Failed to load font: {e}")))
        };
        Ok(Self {
            regular: add(BuiltinFont::Helvetica)?,
            bold: add(BuiltinFont::HelveticaBold)?,
            mono: add(BuiltinFont::Courier)?,
        })
    }

    fn get(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Mono => &self.mono,
        }
    }
}

impl PdfRenderer {
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            title: settings.title.clone(),
            font_size: settings.font_size,
            page: PageSpec::a4(),
        }
    }

    /// Parse and lay out `markdown` into positioned text runs.
    fn pages(&self, markdown: &str) -> Result<Vec<PageLayout>> {
        let blocks = parse_blocks(markdown);
        if blocks.is_empty() {
            return Err(CruxError::Render(
                "summary contains no sections to render".to_string(),
            ));
        }

        let pages = layout(&blocks, self.page, self.font_size);
        debug!("Laid out {} blocks on {} page(s)", blocks.len(), pages.len());
        Ok(pages)
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new(&RenderSettings::default())
    }
}

impl DocumentRenderer for PdfRenderer {
    #[instrument(skip_all, fields(markdown_chars = markdown.len()))]
    fn render(&self, markdown: &str) -> Result<Vec<u8>> {
        let pages = self.pages(markdown)?;

        let width = Mm(self.page.width_mm);
        let height = Mm(self.page.height_mm);
        let (doc, first_page, first_layer) =
            PdfDocument::new(self.title.clone(), width, height, "Layer 1");
        let fonts = Fonts::load(&doc)?;

        for (i, page) in pages.iter().enumerate() {
            let (page_index, layer_index) = if i == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(width, height, "Layer 1")
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);

            for item in &page.items {
                layer.use_text(
                    item.text.clone(),
                    item.size,
                    Mm(item.x_mm),
                    Mm(item.y_mm),
                    fonts.get(item.face),
                );
            }
        }

        doc.save_to_bytes()
            .map_err(|e| CruxError::Render(format!("Failed to write PDF: {e}")))
    }
}
