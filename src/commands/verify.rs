//! Verify command implementation.
//!
//! Decodes the text file and the binary file written by `generate` and
//! checks that both describe the same trees, in the same order.

use super::models::{VerifyArgs, VerifyReport};
use crate::output::{read_binary_file, read_text_file};
use crate::tree::{AcceptAll, CallSiteResolver, CallTree};
use crate::utils::error::VerifyError;
use crate::workload::DemoApplication;
use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use std::path::Path;

/// Execute the verify command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The comparison report. A report that did not pass is still `Ok`;
/// errors mean the comparison could not be made at all.
///
/// # Errors
/// * Unreadable files
/// * Text trees that cannot be decoded
/// * `VerifyError::CountMismatch` - the files hold different numbers of trees
pub fn execute_verify(args: &VerifyArgs) -> Result<VerifyReport> {
    info!(
        "Verifying {} against {}",
        args.text_path.display(),
        args.binary_path.display()
    );

    let text_trees = if args.accept_all {
        decode_text_trees(&args.text_path, AcceptAll)?
    } else {
        decode_text_trees(&args.text_path, DemoApplication::symbols())?
    };

    let binary_trees = read_binary_file(&args.binary_path)
        .with_context(|| format!("Unable to deserialize {}", args.binary_path.display()))?;

    let report = compare_trees(&text_trees, &binary_trees)?;

    if report.passed {
        info!("✓ {} tree pair(s) match", report.text_trees);
    } else {
        warn!("Trees differ at positions {:?}", report.mismatched);
    }

    Ok(report)
}

/// Decode every tree of a text file, failing if any tree is rejected
fn decode_text_trees<S: CallSiteResolver>(path: &Path, resolver: S) -> Result<Vec<CallTree>> {
    let results = read_text_file(path, resolver)
        .with_context(|| format!("Unable to parse trees from {}", path.display()))?;

    let mut trees = Vec::with_capacity(results.len());
    let mut failures = 0;
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(tree) => trees.push(tree),
            Err(e) => {
                error!("Text tree #{} is unrecoverable: {}", index, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(VerifyError::UndecodableText(failures).into());
    }
    Ok(trees)
}

/// Compare two tree sequences pairwise
///
/// **Public** - pure comparison used by execute_verify
///
/// Every pair must be deep-equal for the report to pass.
pub fn compare_trees(text: &[CallTree], binary: &[CallTree]) -> Result<VerifyReport, VerifyError> {
    if text.len() != binary.len() {
        return Err(VerifyError::CountMismatch {
            text: text.len(),
            binary: binary.len(),
        });
    }

    let mismatched: Vec<usize> = text
        .iter()
        .zip(binary)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(index, _)| index)
        .collect();

    Ok(VerifyReport {
        text_trees: text.len(),
        binary_trees: binary.len(),
        passed: mismatched.is_empty(),
        mismatched,
        verified_at: Utc::now().to_rfc3339(),
    })
}
