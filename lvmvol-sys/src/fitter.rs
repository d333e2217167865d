// SPDX-License-Identifier: GPL-3.0-only

//! Volume group selection

use lvmvol_types::VolumeGroupInfo;

/// Pick the volume group that best accommodates `min_free` megabytes.
///
/// A candidate qualifies when its free capacity strictly exceeds
/// `min_free` (pass 0 for "any group with free space"). Among qualifying
/// candidates the one with the most free capacity wins; the first seen
/// wins ties. Returns `None` when nothing qualifies.
pub fn pick_best_group(min_free: f64, groups: &[VolumeGroupInfo]) -> Option<&VolumeGroupInfo> {
    let mut best: Option<&VolumeGroupInfo> = None;

    for group in groups {
        if group.free <= min_free {
            continue;
        }

        if best.is_none_or(|current| group.free > current.free) {
            best = Some(group);
        }
    }

    best
}
