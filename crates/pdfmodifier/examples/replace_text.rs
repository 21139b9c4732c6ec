//! Replace every span whose text equals a string and write the result.
//!
//! Usage: `cargo run --example replace_text -- <input.pdf> <output.pdf> <find> <replace>`

use pdfmodifier::{ReplacementSpec, modify};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [input, output, find, replace] = args.as_slice() else {
        eprintln!("Usage: replace_text <input.pdf> <output.pdf> <find> <replace>");
        std::process::exit(1);
    };

    let bytes = std::fs::read(input).unwrap_or_else(|e| {
        eprintln!("Error reading {input}: {e}");
        std::process::exit(1);
    });

    let specs = [ReplacementSpec::exact(find.as_str(), replace.as_str()).preserve_layout(true)];
    let (modified, report) = modify(&bytes, &specs).unwrap_or_else(|e| {
        eprintln!("Error modifying PDF ({}): {e}", e.kind());
        std::process::exit(1);
    });

    for entry in &report.applied {
        println!("{}: {:?} -> {:?}", entry.span_id, entry.original, entry.replacement);
    }
    for entry in &report.skipped {
        println!("skipped: {} ({})", entry.reason, entry.reason.as_str());
    }

    std::fs::write(output, modified).unwrap_or_else(|e| {
        eprintln!("Error writing {output}: {e}");
        std::process::exit(1);
    });
    println!("{} operator(s) rewritten", report.spans_touched);
}
