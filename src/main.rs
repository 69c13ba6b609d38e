//! customer-pdf – command-line record → PDF renderer.
//!
//! Usage:
//!   customer-pdf <record.json> [output.pdf] [--title "Customer Detail"]
//!                [--columns N] [--font regular.ttf] [--font-bold bold.ttf]
//!                [--layout layout.json] [--true-lookahead]
//!
//! If `output.pdf` is omitted the PDF is written next to the input file with
//! the same stem (e.g. `c-001.json` → `c-001.pdf`).

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use customer_pdf::pagination::SeparatorLookahead;
use customer_pdf::pipeline::{generate_document, DocumentConfig};
use customer_pdf::CustomerRecord;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut layout_path: Option<PathBuf> = None;
    let mut font_path: Option<PathBuf> = None;
    let mut bold_font_path: Option<PathBuf> = None;
    let mut config = DocumentConfig::default();
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--title" | "-t" => config.title = expect_value(&mut iter, arg, &args[0]),
            "--columns" | "-c" => {
                let raw = expect_value(&mut iter, arg, &args[0]);
                config.columns = match raw.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        eprintln!("Invalid column count: {raw}");
                        process::exit(1);
                    }
                };
            }
            "--font" => font_path = Some(PathBuf::from(expect_value(&mut iter, arg, &args[0]))),
            "--font-bold" => {
                bold_font_path = Some(PathBuf::from(expect_value(&mut iter, arg, &args[0])))
            }
            "--layout" => layout_path = Some(PathBuf::from(expect_value(&mut iter, arg, &args[0]))),
            "--true-lookahead" => config.separator_lookahead = SeparatorLookahead::NextItem,
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    // Default output: same directory + same stem as input, but with .pdf
    let output = output_path.unwrap_or_else(|| {
        let mut o = input.clone();
        o.set_extension("pdf");
        o
    });

    config.regular_font = font_path.map(|p| read_or_exit(&p));
    config.bold_font = bold_font_path.map(|p| read_or_exit(&p));

    let json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };
    let record = match CustomerRecord::from_json(&json) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error parsing '{}': {e}", input.display());
            process::exit(1);
        }
    };

    match generate_document(&record, &config) {
        Ok(doc) => {
            // Create output directory if necessary.
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating output directory: {e}");
                        process::exit(1);
                    }
                }
            }
            if let Err(e) = fs::write(&output, &doc.bytes) {
                eprintln!("Error writing '{}': {e}", output.display());
                process::exit(1);
            }
            if let Some(path) = layout_path {
                let written = doc
                    .layout
                    .to_json()
                    .and_then(|json| fs::write(&path, json).map_err(Into::into));
                if let Err(e) = written {
                    eprintln!("Error writing layout '{}': {e}", path.display());
                    process::exit(1);
                }
            }
            let pages = doc.page_count();
            eprintln!(
                "Wrote '{}' ({} bytes, {} page{})",
                output.display(),
                doc.bytes.len(),
                pages,
                if pages == 1 { "" } else { "s" }
            );
        }
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    }
}

fn expect_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str, prog: &str) -> String {
    match iter.next() {
        Some(v) => v.clone(),
        None => {
            eprintln!("Missing value for {flag}");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn read_or_exit(path: &Path) -> Vec<u8> {
    match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading font '{}': {e}", path.display());
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("customer-pdf – customer record to PDF renderer");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <record.json> [output.pdf] [flags]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <record.json>  Resolved customer record (images as base64 or data URIs)");
    eprintln!("  [output.pdf]   Output path  (default: same stem as input with .pdf)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --title, -t       Document title in PDF metadata (default: Customer Detail)");
    eprintln!("  --columns, -c     Profile grid columns (default: 2)");
    eprintln!("  --font            Regular TrueType face (default: built-in Helvetica)");
    eprintln!("  --font-bold       Bold TrueType face (default: the regular face)");
    eprintln!("  --layout          Also write the paginated layout as JSON");
    eprintln!("  --true-lookahead  Measure the next address before drawing a separator");
    eprintln!("  --help            Print this message");
}
