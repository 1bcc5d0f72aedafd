//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while mapping a signature to a call site
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unknown owner type: {0}")]
    TypeNotFound(String),

    #[error("No method {owner_type}.{method_name} matches parameters ({params})")]
    MethodNotFound {
        owner_type: String,
        method_name: String,
        params: String,
    },

    #[error("{candidates} methods named {owner_type}.{method_name} match parameters ({params})")]
    MethodAmbiguous {
        owner_type: String,
        method_name: String,
        params: String,
        candidates: usize,
    },
}

/// Errors that can occur while decoding the text format
///
/// Any of these rejects the whole tree the offending line belongs to.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Unresolvable call site on line {line}: {source}")]
    Unresolvable {
        line: usize,
        #[source]
        source: ResolveError,
    },

    #[error("Tree starting on line {0} does not begin with the entry point")]
    MissingRoot(usize),

    #[error("Line {line} jumps to depth {depth} below an entry of depth {parent_depth}")]
    DepthGap {
        line: usize,
        depth: usize,
        parent_depth: usize,
    },

    #[error("Failed to read trace text: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while reading or writing the binary format
#[derive(Error, Debug)]
pub enum BinaryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Binary encoding failed: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Unsupported binary format version: {0}")]
    UnsupportedVersion(u16),

    #[error("Corrupt tree record: {0}")]
    Corrupt(String),
}

/// Errors that can occur while writing or opening trace files
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode binary trees: {0}")]
    BinaryFailed(#[from] BinaryError),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors raised by the verification step
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Amount of trees parsed from text = {text} and deserialized = {binary}")]
    CountMismatch { text: usize, binary: usize },

    #[error("{0} tree(s) in the text file could not be decoded")]
    UndecodableText(usize),

    #[error("Parsed and deserialized trees differ at positions {0:?}")]
    TreesDiffer(Vec<usize>),
}
