//! List every text span of a PDF with its id, position and font.
//!
//! Usage: `cargo run --example list_spans -- <path-to-pdf>`

use pdfmodifier::PdfAnalyzer;

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: list_spans <path-to-pdf>");
        std::process::exit(1);
    });

    let bytes = std::fs::read(&path).unwrap_or_else(|e| {
        eprintln!("Error reading {path}: {e}");
        std::process::exit(1);
    });
    let analyzer = PdfAnalyzer::open(&bytes).unwrap_or_else(|e| {
        eprintln!("Error opening PDF: {e}");
        std::process::exit(1);
    });

    for page in 0..analyzer.page_count() {
        let spans = analyzer.page_spans(page);
        println!("--- Page {} ({} spans) ---", page, spans.len());
        for span in spans {
            println!(
                "  [{}] {:?} x0={:.1} top={:.1} x1={:.1} bottom={:.1} font={} size={:.1}",
                span.id,
                span.text,
                span.bbox.x0,
                span.bbox.top,
                span.bbox.x1,
                span.bbox.bottom,
                span.base_font,
                span.font_size
            );
        }
        println!();
    }
}
