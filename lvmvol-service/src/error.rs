// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Service-specific errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("volume not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no volume group fits the request")]
    NoGroupFits,

    #[error("system operation failed: {0}")]
    Sys(#[from] lvmvol_sys::SysError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
