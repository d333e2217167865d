// SPDX-License-Identifier: GPL-3.0-only

//! Decoders for `--report-format=json` output
//!
//! Every LVM query wraps its rows in a single-element `report` array:
//!
//! ```json
//! {"report": [{"vg": [{"vg_name": "vg0", "vg_size": "48.00", ...}]}]}
//! ```
//!
//! Decoding fails on empty input and on any wrapper that does not carry
//! exactly one report section.

use serde::Deserialize;

use lvmvol_types::{LogicalVolumeInfo, PhysicalVolumeInfo, VolumeGroupInfo};

use crate::{Result, SysError};

#[derive(Debug, Deserialize)]
struct PhysicalVolumesReport {
    report: Vec<PhysicalVolumesSection>,
}

#[derive(Debug, Deserialize)]
struct PhysicalVolumesSection {
    #[serde(default)]
    pv: Vec<PhysicalVolumeInfo>,
}

#[derive(Debug, Deserialize)]
struct VolumeGroupsReport {
    report: Vec<VolumeGroupsSection>,
}

#[derive(Debug, Deserialize)]
struct VolumeGroupsSection {
    #[serde(default)]
    vg: Vec<VolumeGroupInfo>,
}

#[derive(Debug, Deserialize)]
struct LogicalVolumesReport {
    report: Vec<LogicalVolumesSection>,
}

#[derive(Debug, Deserialize)]
struct LogicalVolumesSection {
    #[serde(default)]
    lv: Vec<LogicalVolumeInfo>,
}

fn check_input(raw: &[u8]) -> Result<()> {
    if raw.is_empty() {
        return Err(SysError::Decode("can't decode empty response".to_string()));
    }
    Ok(())
}

fn single_section<T>(mut sections: Vec<T>, report: &str) -> Result<T> {
    if sections.len() != 1 {
        return Err(SysError::Decode(format!(
            "unexpected number of {report} report sections: {}",
            sections.len()
        )));
    }
    Ok(sections.remove(0))
}

/// Decode the JSON output of `pvs` into physical volume records.
pub fn decode_physical_volumes(raw: &[u8]) -> Result<Vec<PhysicalVolumeInfo>> {
    check_input(raw)?;

    let report: PhysicalVolumesReport = serde_json::from_slice(raw)
        .map_err(|e| SysError::Decode(format!("errored decoding pvs response: {e}")))?;

    Ok(single_section(report.report, "pvs")?.pv)
}

/// Decode the JSON output of `vgs` into volume group records.
pub fn decode_volume_groups(raw: &[u8]) -> Result<Vec<VolumeGroupInfo>> {
    check_input(raw)?;

    let report: VolumeGroupsReport = serde_json::from_slice(raw)
        .map_err(|e| SysError::Decode(format!("errored decoding vgs response: {e}")))?;

    Ok(single_section(report.report, "vgs")?.vg)
}

/// Decode the JSON output of `lvs` into logical volume records.
pub fn decode_logical_volumes(raw: &[u8]) -> Result<Vec<LogicalVolumeInfo>> {
    check_input(raw)?;

    let report: LogicalVolumesReport = serde_json::from_slice(raw)
        .map_err(|e| SysError::Decode(format!("errored decoding lvs response: {e}")))?;

    Ok(single_section(report.report, "lvs")?.lv)
}
