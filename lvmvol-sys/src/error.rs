// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Error types for system-level operations
#[derive(Error, Debug)]
pub enum SysError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not supported: {0}")]
    Unsupported(String),

    #[error("command '{program}' failed with args {args:?}: {output}")]
    CommandFailed {
        program: String,
        args: Vec<String>,
        output: String,
    },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("required tool not found: {0}")]
    ToolMissing(String),

    #[error(transparent)]
    Attr(#[from] lvmvol_types::AttrError),
}

/// Result type alias for system operations
pub type Result<T> = std::result::Result<T, SysError>;
