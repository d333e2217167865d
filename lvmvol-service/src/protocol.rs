// SPDX-License-Identifier: GPL-3.0-only

//! Wire protocol for the volume lifecycle operations
//!
//! Requests arrive as one JSON object per line over the unix socket.
//! Create options travel as a flat string-to-string map; the boundary
//! converts them into the typed [`CreateOptions`] the driver consumes,
//! ignoring unrecognized keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lvmvol_types::{CapabilitiesInfo, VolumeInfo};

/// Typed creation options. Every field is optional; empty means "not
/// supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOptions {
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub thinpool: String,
    #[serde(default)]
    pub snapshot: String,
    #[serde(default)]
    pub keyfile: String,
    #[serde(default)]
    pub volumegroup: String,
    #[serde(default)]
    pub fstype: String,
}

impl CreateOptions {
    /// Lift a raw options map into the typed structure. Unrecognized
    /// keys are ignored, absent keys default to empty.
    pub fn from_map(options: &BTreeMap<String, String>) -> Self {
        let fetch = |key: &str| options.get(key).cloned().unwrap_or_default();

        Self {
            size: fetch("size"),
            thinpool: fetch("thinpool"),
            snapshot: fetch("snapshot"),
            keyfile: fetch("keyfile"),
            volumegroup: fetch("volumegroup"),
            fstype: fetch("fstype"),
        }
    }
}

/// One lifecycle request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Create {
        name: String,
        #[serde(default)]
        options: BTreeMap<String, String>,
    },
    Get {
        name: String,
    },
    List,
    Remove {
        name: String,
    },
    Path {
        name: String,
    },
    Mount {
        name: String,
        #[serde(default)]
        id: String,
    },
    Unmount {
        name: String,
        #[serde(default)]
        id: String,
    },
    Capabilities,
}

/// One lifecycle response. `err` is empty on success; the payload fields
/// are filled per operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub err: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<VolumeInfo>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mountpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<CapabilitiesInfo>,
}

impl Response {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn error(err: impl ToString) -> Self {
        Self {
            err: err.to_string(),
            ..Default::default()
        }
    }
}
