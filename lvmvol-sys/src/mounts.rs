// SPDX-License-Identifier: GPL-3.0-only

//! Kernel mount-table reading
//!
//! The mount table is the only authority on whether a path is actually
//! mounted; the directory tree the service keeps for bookkeeping says
//! nothing about live kernel state. Reads always go back to the file,
//! never to a cache.

use std::fs;
use std::path::{Path, PathBuf};

use lvmvol_types::MountInfo;

use crate::{Result, SysError};

pub const PROC_MOUNTS: &str = "/proc/mounts";

/// Parse one `/proc/mounts` line.
///
/// The first four whitespace-separated fields are device, location,
/// format and options; trailing dump/pass numbers are ignored.
pub fn parse_mount_line(line: &str) -> Result<MountInfo> {
    if line.is_empty() {
        return Err(SysError::Decode("can't parse empty mounts line".to_string()));
    }

    let mut fields = line.split_whitespace();
    let (device, location, format, options) = match (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) {
        (Some(device), Some(location), Some(format), Some(options)) => {
            (device, location, format, options)
        }
        _ => {
            return Err(SysError::Decode(format!(
                "not enough fields in mounts line '{line}'"
            )));
        }
    };

    Ok(MountInfo {
        device: device.to_string(),
        location: location.to_string(),
        format: format.to_string(),
        options: options.to_string(),
    })
}

/// Read a mounts file line by line, skipping blanks. The first malformed
/// line fails the whole read.
pub fn parse_mounts_file(path: &Path) -> Result<Vec<MountInfo>> {
    let contents = fs::read_to_string(path)?;

    let mut infos = Vec::new();
    for line in contents.lines() {
        if line.is_empty() {
            continue;
        }
        infos.push(parse_mount_line(line)?);
    }

    Ok(infos)
}

/// Live view over a kernel mounts file.
#[derive(Debug, Clone)]
pub struct MountTable {
    path: PathBuf,
}

impl Default for MountTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MountTable {
    pub fn new() -> Self {
        Self::at(PROC_MOUNTS)
    }

    /// Read from a non-default mounts file; used by tests and containers
    /// with an alternate proc root.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot all current entries.
    pub fn entries(&self) -> Result<Vec<MountInfo>> {
        parse_mounts_file(&self.path)
    }

    /// Whether `location` is currently an active mountpoint.
    pub fn is_mounted(&self, location: &Path) -> Result<bool> {
        let entries = self.entries()?;
        Ok(entries
            .iter()
            .any(|entry| Path::new(&entry.location) == location))
    }
}
