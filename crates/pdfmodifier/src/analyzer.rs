//! Read-only view of a document's text spans and fonts.

use pdfmodifier_core::{
    FontInfo, PdfModifierError, SearchMatch, SearchOptions, SpanDescription, SpanId, TextSpan,
};
use pdfmodifier_parse::{Document, ParseOptions, TextIndex, index};

/// A parsed and indexed PDF, opened for inspection.
///
/// # Example
///
/// ```ignore
/// let analyzer = PdfAnalyzer::open(&bytes)?;
/// for hit in analyzer.search("Invoice", &SearchOptions::literal()) {
///     println!("{} on page {}", hit.span_id, hit.page);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PdfAnalyzer {
    doc: Document,
    index: TextIndex,
}

impl PdfAnalyzer {
    /// Parse and index a document.
    ///
    /// # Errors
    ///
    /// Returns [`PdfModifierError`] if the bytes are not a readable PDF or a
    /// page's text state cannot be reconstructed.
    pub fn open(bytes: &[u8]) -> Result<Self, PdfModifierError> {
        Self::open_with_options(bytes, &ParseOptions::default())
    }

    pub fn open_with_options(
        bytes: &[u8],
        options: &ParseOptions,
    ) -> Result<Self, PdfModifierError> {
        let doc = Document::parse_with_options(bytes, options)?;
        Self::from_document(doc)
    }

    pub fn from_document(doc: Document) -> Result<Self, PdfModifierError> {
        let index = index(&doc)?;
        Ok(Self { doc, index })
    }

    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    /// Every span in document order.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.index.spans()
    }

    /// Spans of one page; empty for a page the document does not have.
    pub fn page_spans(&self, page: usize) -> &[TextSpan] {
        self.index.page(page)
    }

    pub fn span(&self, id: SpanId) -> Option<&TextSpan> {
        self.index.get(id)
    }

    /// Text of one page, one line per baseline.
    pub fn page_text(&self, page: usize) -> String {
        self.index.page_text(page)
    }

    /// Search span text. See [`SearchOptions`] for literal vs regex and
    /// case handling.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchMatch> {
        self.index.search(query, options)
    }

    /// Font inventory of every page, in page then resource-name order.
    pub fn fonts(&self) -> Result<Vec<FontInfo>, PdfModifierError> {
        let mut out = Vec::new();
        for page in self.doc.pages() {
            for font in self.doc.page_fonts(page)? {
                out.push(font.info(page.index));
            }
        }
        Ok(out)
    }

    /// Compact description of every span.
    pub fn describe(&self) -> Vec<SpanDescription> {
        self.index.spans().map(SpanDescription::from).collect()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn index(&self) -> &TextIndex {
        &self.index
    }
}
