use crate::output::read_text_file;
use crate::tree::AcceptAll;
use crate::utils::config::{BINARY_FORMAT_VERSION, ENTRY_POINT_IDENT, UNRESOLVED_MARKER};
use crate::workload::DemoApplication;
use anyhow::{Context, Result};
use log::error;
use std::path::Path;

/// Decode a text trace file and print every tree that survives
///
/// # Returns
/// (trees printed, trees rejected)
pub fn print_trace_file(file_path: &Path, accept_all: bool) -> Result<(usize, usize)> {
    let results = if accept_all {
        read_text_file(file_path, AcceptAll)
    } else {
        read_text_file(file_path, DemoApplication::symbols())
    }
    .with_context(|| format!("Unable to parse trees from {}", file_path.display()))?;

    let mut printed = 0;
    let mut rejected = 0;
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(tree) => {
                print!("{}", tree);
                printed += 1;
            }
            Err(e) => {
                error!("Tree #{}: {}", index, e);
                rejected += 1;
            }
        }
    }

    Ok((printed, rejected))
}

/// Display the text format
pub fn display_format() {
    println!("Call Tree Text Format");
    println!("Binary Format: v{}", BINARY_FORMAT_VERSION);
    println!();
    println!("  {}                          - root of every tree", ENTRY_POINT_IDENT);
    println!("  -Owner.method(type var0 = value)     - call at depth 1");
    println!("  --Owner.method()                     - call at depth 2");
    println!(
        "  -{m}.{m}({m} var0 = value)               - call whose site was not identified",
        m = UNRESOLVED_MARKER
    );
    println!("  <blank line>                         - end of one tree");
    println!();
    println!("Argument values write \\, newline and carriage return as \\\\, \\n and \\r.");
}

/// Display version information
pub fn display_version() {
    println!("Call Tree Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Binary Format: v{}", BINARY_FORMAT_VERSION);
    println!();
    println!("Records nested calls as trees and checks text traces against binary ones.");
}
