// SPDX-License-Identifier: GPL-3.0-only

//! Client-facing volume representation

use serde::{Deserialize, Serialize};

/// The only view of a volume exposed to a consuming client: its name and,
/// when resolved, the mountpoint its data is reachable at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfo {
    /// Volume name
    pub name: String,

    /// Mountpoint path; empty when no mountpoint is tracked for the volume
    #[serde(default)]
    pub mountpoint: String,
}

/// Static driver capability descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesInfo {
    /// Volume scope; always "global" - volumes are not bound to a single
    /// client
    pub scope: String,
}

impl Default for CapabilitiesInfo {
    fn default() -> Self {
        Self {
            scope: "global".to_string(),
        }
    }
}
