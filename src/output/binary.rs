//! Binary trace files.

use super::text::{calculate_file_size, create_output_file};
use crate::codec::{read_trees_binary, write_trees_binary};
use crate::tree::CallTree;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write trees to a binary file
///
/// **Public** - structural counterpart of [`super::write_text_file`]
///
/// # Returns
/// Number of trees written
pub fn write_binary_file<'a, I>(trees: I, output_path: impl AsRef<Path>) -> Result<usize, OutputError>
where
    I: IntoIterator<Item = &'a CallTree>,
{
    let output_path = output_path.as_ref();

    info!("Writing binary trees to: {}", output_path.display());

    let mut writer = BufWriter::new(create_output_file(output_path)?);
    let count = write_trees_binary(trees, &mut writer)?;

    info!(
        "{} tree(s) serialized ({} bytes)",
        count,
        calculate_file_size(output_path)
    );

    Ok(count)
}

/// Read every tree from a binary file
///
/// # Errors
/// * `OutputError::ReadFailed` - File cannot be opened
/// * `OutputError::BinaryFailed` - A record is truncated or corrupt
pub fn read_binary_file(input_path: impl AsRef<Path>) -> Result<Vec<CallTree>, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading binary trees from: {}", input_path.display());

    let file = File::open(input_path).map_err(|source| OutputError::ReadFailed {
        path: input_path.display().to_string(),
        source,
    })?;

    let trees = read_trees_binary(BufReader::new(file))?;

    debug!("{} tree(s) deserialized", trees.len());

    Ok(trees)
}
