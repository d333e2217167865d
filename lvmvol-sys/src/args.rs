// SPDX-License-Identifier: GPL-3.0-only

//! Argument builders for the volume lifecycle commands
//!
//! Builders are pure validation + assembly: nothing here touches a device.
//! The only filesystem access is the keyfile inspection on creation, which
//! must happen before `lvcreate` ever runs.

use std::path::Path;

use crate::{Result, SysError};

/// Configuration for creating one logical volume.
///
/// Empty strings mean "not supplied"; this mirrors the flat string map the
/// wire protocol carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LvCreationConfig {
    pub name: String,
    pub size: String,
    pub snapshot: String,
    pub keyfile: String,
    pub thinpool: String,
    pub volume_group: String,
    pub fs_type: String,
}

/// Configuration for removing one logical volume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LvRemovalConfig {
    pub lv_name: String,
    pub vg_name: String,
}

/// Build the `lvcreate` argument list for a creation config.
///
/// Three shapes are possible, always prefixed with
/// `--setactivationskip n --name NAME`:
/// - plain:    `--size SIZE VG`
/// - thin:     `--virtualsize SIZE --thin VG/POOL`
/// - snapshot: `--snapshot [--size SIZE] VG/ORIGIN`
///
/// A snapshot into a thin pool is taken without a size; supplying one is
/// rejected, as is a keyfile on any snapshot.
pub fn build_creation_args(cfg: &LvCreationConfig) -> Result<Vec<String>> {
    tracing::debug!(
        name = %cfg.name,
        size = %cfg.size,
        snapshot = %cfg.snapshot,
        thinpool = %cfg.thinpool,
        volume_group = %cfg.volume_group,
        "building logical volume creation args"
    );

    let is_snapshot = !cfg.snapshot.is_empty();
    let has_size = !cfg.size.is_empty();
    let has_keyfile = !cfg.keyfile.is_empty();
    let has_thinpool = !cfg.thinpool.is_empty();
    let is_thin_snapshot = is_snapshot && has_thinpool;

    if cfg.name.is_empty() {
        return Err(SysError::InvalidInput("a name must be set".to_string()));
    }

    if cfg.volume_group.is_empty() {
        return Err(SysError::InvalidInput(
            "a volume group must be specified".to_string(),
        ));
    }

    if has_keyfile {
        if is_snapshot {
            return Err(SysError::InvalidInput(
                "can't have snapshot with keyfile".to_string(),
            ));
        }

        inspect_keyfile(&cfg.keyfile)?;
    }

    if !has_size && !is_thin_snapshot {
        return Err(SysError::InvalidInput("a size must be provided".to_string()));
    }

    if has_size && is_thin_snapshot {
        return Err(SysError::InvalidInput(
            "can't specify size for thin snapshots".to_string(),
        ));
    }

    let mut args = vec![
        "--setactivationskip".to_string(),
        "n".to_string(),
        "--name".to_string(),
        cfg.name.clone(),
    ];

    if is_snapshot {
        args.push("--snapshot".to_string());

        if has_size {
            args.push("--size".to_string());
            args.push(cfg.size.clone());
        }

        args.push(format!("{}/{}", cfg.volume_group, cfg.snapshot));
    } else if has_thinpool {
        args.push("--virtualsize".to_string());
        args.push(cfg.size.clone());
        args.push("--thin".to_string());
        args.push(format!("{}/{}", cfg.volume_group, cfg.thinpool));
    } else {
        args.push("--size".to_string());
        args.push(cfg.size.clone());
        args.push(cfg.volume_group.clone());
    }

    Ok(args)
}

/// Build the `lvremove` argument list: `--force VG/LV`.
pub fn build_removal_args(cfg: &LvRemovalConfig) -> Result<Vec<String>> {
    if cfg.lv_name.is_empty() {
        return Err(SysError::InvalidInput(
            "the logical volume name must be specified".to_string(),
        ));
    }

    if cfg.vg_name.is_empty() {
        return Err(SysError::InvalidInput(
            "the volume group name must be specified".to_string(),
        ));
    }

    Ok(vec![
        "--force".to_string(),
        format!("{}/{}", cfg.vg_name, cfg.lv_name),
    ])
}

/// Build the `mkfs` argument list. Only ext4 and xfs are supported.
pub fn build_mkfs_args(fs_type: &str, device: &str) -> Result<Vec<String>> {
    if fs_type.is_empty() || device.is_empty() {
        return Err(SysError::InvalidInput(
            "both fstype and device must be specified".to_string(),
        ));
    }

    match fs_type {
        "ext4" | "xfs" => {}
        other => {
            return Err(SysError::Unsupported(format!("fs type {other}")));
        }
    }

    Ok(vec![
        "-t".to_string(),
        fs_type.to_string(),
        device.to_string(),
    ])
}

/// Build the filesystem-probe argument list for `lsblk`: empty output
/// means the device carries no filesystem yet.
pub fn build_format_probe_args(device: &str) -> Result<Vec<String>> {
    if device.is_empty() {
        return Err(SysError::InvalidInput(
            "a device must be specified".to_string(),
        ));
    }

    Ok(vec![
        "--noheadings".to_string(),
        "--discard".to_string(),
        "--output=FSTYPE".to_string(),
        device.to_string(),
    ])
}

/// Build the `mount` argument list: `DEVICE LOCATION`.
pub fn build_mount_args(device: &str, location: &str) -> Result<Vec<String>> {
    if device.is_empty() || location.is_empty() {
        return Err(SysError::InvalidInput(
            "both device and location must be specified".to_string(),
        ));
    }

    Ok(vec![device.to_string(), location.to_string()])
}

/// Build `cryptsetup luksFormat` arguments for a device + keyfile.
pub fn build_luks_format_args(device: &str, keyfile: &str) -> Result<Vec<String>> {
    if device.is_empty() || keyfile.is_empty() {
        return Err(SysError::InvalidInput(
            "both device and keyfile must be specified".to_string(),
        ));
    }

    Ok(vec![
        "luksFormat".to_string(),
        "-q".to_string(),
        "--key-file".to_string(),
        keyfile.to_string(),
        device.to_string(),
    ])
}

/// Build `cryptsetup luksOpen` arguments mapping a device to a name.
pub fn build_luks_open_args(device: &str, name: &str, keyfile: &str) -> Result<Vec<String>> {
    if device.is_empty() || name.is_empty() || keyfile.is_empty() {
        return Err(SysError::InvalidInput(
            "device, name and keyfile must be specified".to_string(),
        ));
    }

    Ok(vec![
        "luksOpen".to_string(),
        "--key-file".to_string(),
        keyfile.to_string(),
        device.to_string(),
        name.to_string(),
    ])
}

/// Build `cryptsetup luksClose` arguments for a mapped name.
pub fn build_luks_close_args(name: &str) -> Result<Vec<String>> {
    if name.is_empty() {
        return Err(SysError::InvalidInput("a name must be specified".to_string()));
    }

    Ok(vec!["luksClose".to_string(), name.to_string()])
}

/// Verify that a keyfile exists, is a regular file, and that the
/// encryption tool is present on PATH.
pub fn inspect_keyfile(keyfile: &str) -> Result<()> {
    let meta = std::fs::metadata(Path::new(keyfile)).map_err(|e| {
        SysError::InvalidInput(format!("failed to inspect keyfile {keyfile}: {e}"))
    })?;

    if !meta.is_file() {
        return Err(SysError::InvalidInput(format!(
            "keyfile {keyfile} must be a regular file"
        )));
    }

    which::which("cryptsetup")
        .map_err(|_| SysError::ToolMissing("cryptsetup".to_string()))?;

    Ok(())
}
