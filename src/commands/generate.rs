//! Generate command implementation.
//!
//! The generate command:
//! 1. Builds one demo application per argument pool
//! 2. Runs every application on its own tree in a worker pool
//! 3. Writes all trees to the text file
//! 4. Writes the same trees to the binary file

use super::models::GenerateArgs;
use crate::output::{write_binary_file, write_text_file};
use crate::tree::CallTree;
use crate::utils::config::{ARGS_PER_APP, ARG_BLOCK_STRIDE};
use crate::workload::DemoApplication;
use anyhow::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;
use std::time::Instant;

/// Execute the generate command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The generated trees, in application order
///
/// # Errors
/// * Thread pool creation failures
/// * File write errors
pub fn execute_generate(args: GenerateArgs) -> Result<Vec<CallTree>> {
    let start_time = Instant::now();
    let seed = args.seed.unwrap_or_else(rand::random);

    info!(
        "Generating {} tree(s) on {} worker(s), seed {}",
        args.apps, args.workers, seed
    );

    // Step 1: Run the workload
    info!("Step 1/3: Running demo applications...");
    let trees = run_applications(args.apps, args.workers, seed)?;

    if args.print_trees {
        for tree in &trees {
            print!("{}", tree);
        }
    }

    // Step 2: Text output
    info!("Step 2/3: Writing text trees...");
    write_text_file(&trees, &args.text_path).context("Failed to write text trees")?;
    info!("✓ Text trees written to: {}", args.text_path.display());

    // Step 3: Binary output
    info!("Step 3/3: Writing binary trees...");
    write_binary_file(&trees, &args.binary_path).context("Failed to write binary trees")?;
    info!("✓ Binary trees written to: {}", args.binary_path.display());

    let elapsed = start_time.elapsed();
    info!("Generate completed in {:.2}s", elapsed.as_secs_f64());

    Ok(trees)
}

/// Run `apps` demo applications in a pool of `workers` threads
///
/// Each application owns its tree end-to-end; results keep application order.
pub fn run_applications(apps: usize, workers: usize, seed: u64) -> Result<Vec<CallTree>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("Failed to create worker pool")?;

    Ok(pool.install(|| {
        (0..apps)
            .into_par_iter()
            .map(|index| run_application(index, seed))
            .collect()
    }))
}

/// Argument pool of application `index`: ten consecutive numbers from `100 * index`
pub fn app_arguments(index: usize) -> Vec<String> {
    let start = ARG_BLOCK_STRIDE * index;
    (start..start + ARGS_PER_APP).map(|n| n.to_string()).collect()
}

fn run_application(index: usize, seed: u64) -> CallTree {
    let mut app = DemoApplication::new(app_arguments(index), seed.wrapping_add(index as u64));
    let mut tree = CallTree::new();
    app.run(&mut tree);

    debug!(
        "Application {} recorded {} entries (max depth {})",
        index,
        tree.node_count(),
        tree.max_depth()
    );

    tree
}

/// Validate generate arguments
///
/// **Public** - can be called before execute_generate for early validation
pub fn validate_args(args: &GenerateArgs) -> Result<()> {
    if args.apps == 0 {
        anyhow::bail!("apps must be greater than 0");
    }

    if args.workers == 0 {
        anyhow::bail!("workers must be greater than 0");
    }

    if args.text_path.as_os_str().is_empty() || args.binary_path.as_os_str().is_empty() {
        anyhow::bail!("Output paths cannot be empty");
    }

    if args.text_path == args.binary_path {
        anyhow::bail!("Text and binary outputs must be different files");
    }

    Ok(())
}
