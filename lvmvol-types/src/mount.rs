// SPDX-License-Identifier: GPL-3.0-only

//! Kernel mount-table entry

use serde::{Deserialize, Serialize};

/// One live entry from the kernel mount table (`/proc/mounts` format).
///
/// Only the first four whitespace-separated fields are kept; the trailing
/// dump/pass numbers carry no information for mount tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountInfo {
    /// Mounted device (e.g., "/dev/mapper/vg0-data")
    pub device: String,

    /// Mountpoint path
    pub location: String,

    /// Filesystem format (e.g., "ext4")
    pub format: String,

    /// Comma-separated mount options
    pub options: String,
}
