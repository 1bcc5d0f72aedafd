//! Text trace files.
//!
//! Writes call trees to disk in the line-per-entry format and reads them back.

use crate::codec::{write_trees, TextDecoder};
use crate::tree::{CallSiteResolver, CallTree};
use crate::utils::error::{DecodeError, OutputError};
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write trees to a text file
///
/// **Public** - main entry point for text output
///
/// # Arguments
/// * `trees` - Trees to write, in order
/// * `output_path` - Path to output file
///
/// # Returns
/// Number of trees written
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_text_file<'a, I>(trees: I, output_path: impl AsRef<Path>) -> Result<usize, OutputError>
where
    I: IntoIterator<Item = &'a CallTree>,
{
    let output_path = output_path.as_ref();

    info!("Writing text trees to: {}", output_path.display());

    let mut writer = BufWriter::new(create_output_file(output_path)?);
    let count = write_trees(trees, &mut writer)?;

    info!(
        "{} tree(s) written ({} bytes)",
        count,
        calculate_file_size(output_path)
    );

    Ok(count)
}

/// Decode every tree in a text file
///
/// Failures are per tree: a rejected batch shows up as an `Err` entry and
/// decoding continues with the next one.
///
/// # Errors
/// * `OutputError::ReadFailed` - File cannot be opened
pub fn read_text_file<S: CallSiteResolver>(
    input_path: impl AsRef<Path>,
    resolver: S,
) -> Result<Vec<Result<CallTree, DecodeError>>, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading text trees from: {}", input_path.display());

    let file = File::open(input_path).map_err(|source| OutputError::ReadFailed {
        path: input_path.display().to_string(),
        source,
    })?;

    let results: Vec<_> = TextDecoder::new(BufReader::new(file), resolver).collect();

    debug!("{} tree batch(es) read", results.len());

    Ok(results)
}

/// Validate the path, create missing parent directories and open the file
///
/// **Internal** - shared with the binary writer
pub(crate) fn create_output_file(output_path: &Path) -> Result<File, OutputError> {
    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    File::create(output_path).map_err(OutputError::WriteFailed)
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Calculate file size in bytes
pub(crate) fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{AcceptAll, CallSite};

    fn sample() -> CallTree {
        let mut tree = CallTree::new();
        drop(tree.step_in(CallSite::new("A", "f", ["int"]), [1]));
        tree
    }

    #[test]
    fn test_write_and_read_text_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("data.txt");
        let trees = vec![sample(), CallTree::new()];

        assert_eq!(write_text_file(&trees, &path).unwrap(), 2);

        let loaded: Vec<CallTree> = read_text_file(&path, AcceptAll)
            .unwrap()
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(loaded, trees);
    }

    #[test]
    fn test_validate_output_path_empty() {
        assert!(validate_output_path(Path::new("")).is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(validate_output_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/data.txt");

        write_text_file([&sample()], &nested_path).unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = read_text_file(temp_dir.path().join("absent.txt"), AcceptAll);
        assert!(matches!(result, Err(OutputError::ReadFailed { .. })));
    }
}
