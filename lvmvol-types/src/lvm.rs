// SPDX-License-Identifier: GPL-3.0-only

//! LVM catalog record types
//!
//! Field names mirror the columns of `pvs`/`vgs`/`lvs` in
//! `--report-format=json` mode, where every value — capacities and counts
//! included — arrives as a string (e.g. `"vg_size": "48.00"` with
//! megabyte-normalized units).

use serde::{Deserialize, Deserializer, Serialize};

fn f64_from_report<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.trim().parse().map_err(serde::de::Error::custom)
}

fn u32_from_report<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.trim().parse().map_err(serde::de::Error::custom)
}

/// Physical volume information, one per `pvs` report row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalVolumeInfo {
    /// Device path (e.g., "/dev/sda2")
    #[serde(rename = "pv_name")]
    pub device: String,

    /// Owning volume group name (empty when unassigned)
    #[serde(rename = "vg_name", default)]
    pub vg_name: String,

    /// On-disk metadata format (e.g., "lvm2")
    #[serde(rename = "pv_fmt", default)]
    pub format: String,

    /// Raw positional attribute code
    #[serde(rename = "pv_attr", default)]
    pub attr: String,

    /// Total capacity in megabytes
    #[serde(rename = "pv_size", deserialize_with = "f64_from_report")]
    pub size: f64,

    /// Free capacity in megabytes
    #[serde(rename = "pv_free", deserialize_with = "f64_from_report")]
    pub free: f64,
}

/// Volume group information, one per `vgs` report row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeGroupInfo {
    /// Volume group name
    #[serde(rename = "vg_name")]
    pub name: String,

    /// Raw positional attribute code
    #[serde(rename = "vg_attr", default)]
    pub attr: String,

    /// Total capacity in megabytes
    #[serde(rename = "vg_size", deserialize_with = "f64_from_report")]
    pub size: f64,

    /// Free capacity in megabytes; never exceeds `size`
    #[serde(rename = "vg_free", deserialize_with = "f64_from_report")]
    pub free: f64,

    /// Number of member physical volumes
    #[serde(rename = "pv_count", deserialize_with = "u32_from_report", default)]
    pub pv_count: u32,

    /// Number of member logical volumes
    #[serde(rename = "lv_count", deserialize_with = "u32_from_report", default)]
    pub lv_count: u32,

    /// Number of snapshots
    #[serde(rename = "snap_count", deserialize_with = "u32_from_report", default)]
    pub snap_count: u32,
}

impl VolumeGroupInfo {
    /// Get used capacity in megabytes
    pub fn used(&self) -> f64 {
        (self.size - self.free).max(0.0)
    }
}

/// Logical volume information, one per `lvs` report row
///
/// Identity is `(vg_name, name)`: the same bare name may exist in two
/// groups, and bare-name lookups resolve to the first match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalVolumeInfo {
    /// Logical volume name
    #[serde(rename = "lv_name")]
    pub name: String,

    /// Owning volume group name
    #[serde(rename = "vg_name", default)]
    pub vg_name: String,

    /// Fully qualified "vg/lv" name
    #[serde(rename = "lv_full_name", default)]
    pub full_name: String,

    /// Device-mapper path (e.g., "/dev/mapper/vg0-data"); empty for
    /// volumes without an active mapping
    #[serde(rename = "lv_dm_path", default)]
    pub dm_path: String,

    /// Size in megabytes
    #[serde(rename = "lv_size", deserialize_with = "f64_from_report")]
    pub size: f64,

    /// Raw 10-character attribute code (see [`crate::attr::LvAttr`])
    #[serde(rename = "lv_attr", default)]
    pub attr: String,

    /// Thin pool backing this volume, when thinly provisioned
    #[serde(rename = "pool_lv", default)]
    pub pool: String,

    /// Origin volume, when this volume is a snapshot
    #[serde(rename = "origin", default)]
    pub origin: String,

    /// Source physical volume of an in-flight `pvmove`
    #[serde(rename = "move_pv", default)]
    pub move_pv: String,

    /// Mirror log device, for mirrored volumes
    #[serde(rename = "mirror_log", default)]
    pub mirror_log: String,

    /// Source volume of an in-flight `lvconvert`
    #[serde(rename = "convert_lv", default)]
    pub convert: String,
}

impl LogicalVolumeInfo {
    /// Owning group as reported, falling back to the "vg/lv" prefix when
    /// the direct field came back blank.
    pub fn group(&self) -> &str {
        if !self.vg_name.is_empty() {
            return &self.vg_name;
        }

        match self.full_name.split_once('/') {
            Some((vg, _)) => vg,
            None => "",
        }
    }
}
