// SPDX-License-Identifier: GPL-3.0-only

//! The volume lifecycle orchestrator
//!
//! The driver holds no per-volume state. Each operation re-derives a
//! volume's situation from three independent sources of truth: the LVM
//! catalog, the mountpoint directory tree, and the kernel mount table.
//! Because those three cannot be locked individually, one coarse mutex
//! serializes every operation for its full duration, blocking subprocess
//! calls included. Nothing is cached and nothing retried; a failed step
//! surfaces with its cause chain and the operation stops there.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use lvmvol_sys::args::{LvCreationConfig, LvRemovalConfig, build_creation_args, build_removal_args};
use lvmvol_sys::{Lvm, MountTable, pick_best_group};
use lvmvol_types::{CapabilitiesInfo, LogicalVolumeInfo, VolumeInfo};

use crate::dirs::DirManager;
use crate::error::{Result, ServiceError};
use crate::protocol::CreateOptions;

/// Everything the driver composes, fixed at construction.
pub struct DriverConfig {
    pub lvm: Lvm,
    pub dir_manager: DirManager,
    pub whitelist: BTreeSet<String>,
    pub mount_table: MountTable,
    /// Filesystem used when a device must be formatted on first mount.
    pub default_fs_type: String,
}

struct Inner {
    lvm: Lvm,
    dirs: DirManager,
    whitelist: BTreeSet<String>,
    mounts: MountTable,
    default_fs_type: String,
}

pub struct Driver {
    inner: Mutex<Inner>,
}

impl Inner {
    fn require_volume(&self, name: &str) -> Result<LogicalVolumeInfo> {
        self.lvm
            .get_logical_volume(name)?
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))
    }

    fn tracked_mountpoint(&self, name: &str) -> Result<Option<PathBuf>> {
        self.dirs.get(name)
    }
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        for group in &config.whitelist {
            tracing::info!(vg = %group, "volume group whitelisted");
        }

        Self {
            inner: Mutex::new(Inner {
                lvm: config.lvm,
                dirs: config.dir_manager,
                whitelist: config.whitelist,
                mounts: config.mount_table,
                default_fs_type: config.default_fs_type,
            }),
        }
    }

    // The lock is never held across a panic'ing section we care to
    // recover state from; a poisoned guard is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create a new logical volume.
    ///
    /// When no group is supplied, selection runs over the whitelisted
    /// groups only and picks the one with the most free space. Nothing
    /// else happens on create: no directory, no formatting, no mount.
    pub fn create(&self, name: &str, options: &CreateOptions) -> Result<()> {
        let inner = self.lock();

        tracing::debug!(name, ?options, "starting creation");

        let volume_group = if options.volumegroup.is_empty() {
            let groups = inner.lvm.list_volume_groups()?;
            let allowed: Vec<_> = groups
                .into_iter()
                .filter(|group| inner.whitelist.contains(&group.name))
                .collect();

            pick_best_group(0.0, &allowed)
                .ok_or(ServiceError::NoGroupFits)?
                .name
                .clone()
        } else {
            options.volumegroup.clone()
        };

        let config = LvCreationConfig {
            name: name.to_string(),
            size: options.size.clone(),
            snapshot: options.snapshot.clone(),
            keyfile: options.keyfile.clone(),
            thinpool: options.thinpool.clone(),
            volume_group,
            fs_type: options.fstype.clone(),
        };

        let creation_args = build_creation_args(&config)?;
        inner.lvm.create_lv(&creation_args)?;

        tracing::debug!(name, "finished creation");
        Ok(())
    }

    /// Inspect one volume. The volume must exist in the catalog; a
    /// missing mountpoint directory yields an empty mountpoint, not an
    /// error.
    pub fn get(&self, name: &str) -> Result<VolumeInfo> {
        let inner = self.lock();

        let volume = inner.require_volume(name)?;
        let mountpoint = inner
            .tracked_mountpoint(name)?
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(VolumeInfo {
            name: volume.name,
            mountpoint,
        })
    }

    /// List all catalog volumes as name-only records; mountpoints are
    /// not resolved in bulk.
    pub fn list(&self) -> Result<Vec<VolumeInfo>> {
        let inner = self.lock();

        tracing::debug!("listing volumes");
        let volumes = inner.lvm.list_logical_volumes()?;

        Ok(volumes
            .into_iter()
            .map(|volume| VolumeInfo {
                name: volume.name,
                mountpoint: String::new(),
            })
            .collect())
    }

    /// Resolve a volume's mountpoint; empty when none is tracked.
    pub fn path(&self, name: &str) -> Result<String> {
        let inner = self.lock();

        inner.require_volume(name)?;
        Ok(inner
            .tracked_mountpoint(name)?
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default())
    }

    /// Destroy a volume.
    ///
    /// A live mountpoint is unmounted, and the bookkeeping directory
    /// removed, before the volume itself is destroyed: the volume never
    /// goes away while something still references its mountpoint.
    pub fn remove(&self, name: &str) -> Result<()> {
        let inner = self.lock();

        tracing::debug!(name, "starting removal");
        let volume = inner.require_volume(name)?;

        if let Some(mountpoint) = inner.tracked_mountpoint(name)? {
            if inner.mounts.is_mounted(&mountpoint)? {
                inner.lvm.unmount(&mountpoint)?;
            }
            inner.dirs.delete(name)?;
        }

        let removal_args = build_removal_args(&LvRemovalConfig {
            lv_name: volume.name.clone(),
            vg_name: volume.group().to_string(),
        })?;
        inner.lvm.remove_lv(&removal_args)?;

        tracing::debug!(name, "finished removal");
        Ok(())
    }

    /// Mount a volume, formatting its device first if it carries no
    /// filesystem yet.
    ///
    /// Idempotent: when the mountpoint directory already existed and the
    /// kernel reports it as an active mount, the call returns that path
    /// without touching the device again. When the mount itself fails
    /// the directory is intentionally left behind so a retry can reuse
    /// it.
    pub fn mount(&self, name: &str) -> Result<PathBuf> {
        let inner = self.lock();

        tracing::debug!(name, "starting mount");
        let volume = inner.require_volume(name)?;

        let mountpoint = match inner.tracked_mountpoint(name)? {
            Some(existing) => {
                if inner.mounts.is_mounted(&existing)? {
                    tracing::debug!(name, mountpoint = %existing.display(), "already mounted");
                    return Ok(existing);
                }
                existing
            }
            None => inner.dirs.create(name)?,
        };

        if volume.dm_path.is_empty() {
            return Err(ServiceError::InvalidArgument(format!(
                "volume {name} exposes no device-mapper path"
            )));
        }

        if !inner.lvm.is_device_formatted(&volume.dm_path)? {
            tracing::info!(name, device = %volume.dm_path, "formatting unformatted device");
            inner.lvm.make_fs(&inner.default_fs_type, &volume.dm_path)?;
        }

        inner.lvm.mount(&volume.dm_path, &mountpoint)?;

        tracing::debug!(name, mountpoint = %mountpoint.display(), "finished mount");
        Ok(mountpoint)
    }

    /// Unmount a volume; an untracked mountpoint is a successful no-op.
    pub fn unmount(&self, name: &str) -> Result<()> {
        let inner = self.lock();

        match inner.tracked_mountpoint(name)? {
            Some(mountpoint) => inner.lvm.unmount(&mountpoint).map_err(Into::into),
            None => Ok(()),
        }
    }

    /// Static capability descriptor; consults no state.
    pub fn capabilities(&self) -> CapabilitiesInfo {
        CapabilitiesInfo::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use lvmvol_sys::testing::ScriptedRunner;

    const EMPTY_LVS: &[u8] = br#"{"report":[{"lv":[]}]}"#;

    const DATA1_LVS: &[u8] = br#"{"report":[{"lv":[
        {"lv_name":"data1","vg_name":"vg0","lv_full_name":"vg0/data1",
         "lv_dm_path":"/dev/mapper/vg0-data1","lv_size":"10.00",
         "lv_attr":"-wi-a-----"}
    ]}]}"#;

    const VGS_SAMPLE: &[u8] = br#"{"report":[{"vg":[
        {"vg_name":"vg0","pv_count":"1","lv_count":"0","snap_count":"0",
         "vg_attr":"wz--n-","vg_size":"48.00","vg_free":"20.00"},
        {"vg_name":"vg1","pv_count":"1","lv_count":"0","snap_count":"0",
         "vg_attr":"wz--n-","vg_size":"96.00","vg_free":"90.00"},
        {"vg_name":"big","pv_count":"1","lv_count":"0","snap_count":"0",
         "vg_attr":"wz--n-","vg_size":"900.00","vg_free":"900.00"}
    ]}]}"#;

    struct Harness {
        runner: ScriptedRunner,
        driver: Driver,
        root: tempfile::TempDir,
        mounts: tempfile::NamedTempFile,
    }

    fn harness(whitelist: &[&str]) -> Harness {
        let runner = ScriptedRunner::new();
        let root = tempfile::tempdir().expect("temp root");
        let mounts = tempfile::NamedTempFile::new().expect("mounts file");

        let driver = Driver::new(DriverConfig {
            lvm: Lvm::with_runner(Box::new(runner.clone())),
            dir_manager: DirManager::new(root.path()).expect("valid root"),
            whitelist: whitelist.iter().map(|s| s.to_string()).collect(),
            mount_table: MountTable::at(mounts.path()),
            default_fs_type: "ext4".to_string(),
        });

        Harness {
            runner,
            driver,
            root,
            mounts,
        }
    }

    impl Harness {
        fn programs_called(&self) -> Vec<String> {
            self.runner
                .calls()
                .iter()
                .map(|call| call.program.clone())
                .collect()
        }

        fn record_kernel_mount(&mut self, device: &str, location: &std::path::Path) {
            writeln!(
                self.mounts,
                "{} {} ext4 rw,relatime 0 0",
                device,
                location.display()
            )
            .expect("write mounts line");
            self.mounts.flush().expect("flush mounts");
        }
    }

    #[test]
    fn create_with_explicit_group_bypasses_whitelist() {
        let h = harness(&["vg0"]);

        let options = CreateOptions {
            size: "10M".to_string(),
            volumegroup: "vg9".to_string(),
            ..Default::default()
        };
        h.driver.create("data1", &options).expect("creation runs");

        let calls = h.runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "lvcreate");
        assert_eq!(
            calls[0].args,
            vec![
                "--setactivationskip",
                "n",
                "--name",
                "data1",
                "--size",
                "10M",
                "vg9"
            ]
        );
    }

    #[test]
    fn create_auto_selects_best_whitelisted_group() {
        let h = harness(&["vg0", "vg1"]);
        h.runner.set_default_output("vgs", VGS_SAMPLE);

        let options = CreateOptions {
            size: "10M".to_string(),
            ..Default::default()
        };
        h.driver.create("data1", &options).expect("creation runs");

        // "big" has the most free space but is not whitelisted
        let calls = h.runner.calls();
        assert_eq!(calls[1].program, "lvcreate");
        assert_eq!(calls[1].args.last().map(String::as_str), Some("vg1"));
    }

    #[test]
    fn create_fails_when_no_whitelisted_group_fits() {
        let h = harness(&[]);
        h.runner.set_default_output("vgs", VGS_SAMPLE);

        let options = CreateOptions {
            size: "10M".to_string(),
            ..Default::default()
        };
        let err = h.driver.create("data1", &options).expect_err("no group");
        assert!(matches!(err, ServiceError::NoGroupFits));

        // selection failure happens before any lvcreate
        assert_eq!(h.programs_called(), vec!["vgs"]);
    }

    #[test]
    fn get_requires_catalog_membership() {
        let h = harness(&[]);
        h.runner.set_default_output("lvs", EMPTY_LVS);

        assert!(matches!(
            h.driver.get("data1"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn get_reports_empty_mountpoint_for_untracked_volume() {
        let h = harness(&[]);
        h.runner.set_default_output("lvs", DATA1_LVS);

        let volume = h.driver.get("data1").expect("volume exists");
        assert_eq!(volume.name, "data1");
        assert_eq!(volume.mountpoint, "");
    }

    #[test]
    fn list_returns_name_only_records() {
        let h = harness(&[]);
        h.runner.set_default_output("lvs", DATA1_LVS);

        let volumes = h.driver.list().expect("listing");
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].name, "data1");
        assert_eq!(volumes[0].mountpoint, "");
    }

    #[test]
    fn mount_formats_only_unformatted_devices() {
        let h = harness(&[]);
        h.runner.set_default_output("lvs", DATA1_LVS);
        h.runner.push_output("lsblk", b"\n");

        let mountpoint = h.driver.mount("data1").expect("mount runs");
        assert_eq!(mountpoint, h.root.path().join("data1"));
        assert!(mountpoint.is_dir());
        assert_eq!(h.programs_called(), vec!["lvs", "lsblk", "mkfs", "mount"]);

        // an already-formatted device is mounted without mkfs
        let h2 = harness(&[]);
        h2.runner.set_default_output("lvs", DATA1_LVS);
        h2.runner.push_output("lsblk", b"ext4\n");

        h2.driver.mount("data1").expect("mount runs");
        assert_eq!(h2.programs_called(), vec!["lvs", "lsblk", "mount"]);
    }

    #[test]
    fn second_mount_short_circuits_via_mount_table() {
        let mut h = harness(&[]);
        h.runner.set_default_output("lvs", DATA1_LVS);
        h.runner.push_output("lsblk", b"\n");

        let first = h.driver.mount("data1").expect("first mount");
        h.record_kernel_mount("/dev/mapper/vg0-data1", &first);

        let second = h.driver.mount("data1").expect("second mount");
        assert_eq!(first, second);

        // exactly one probe, one format, one kernel mount across both calls
        assert_eq!(h.runner.calls_to("lsblk"), 1);
        assert_eq!(h.runner.calls_to("mkfs"), 1);
        assert_eq!(h.runner.calls_to("mount"), 1);
    }

    #[test]
    fn mount_requires_device_mapper_path() {
        let h = harness(&[]);
        h.runner.set_default_output(
            "lvs",
            br#"{"report":[{"lv":[
                {"lv_name":"data1","vg_name":"vg0","lv_full_name":"vg0/data1",
                 "lv_dm_path":"","lv_size":"10.00","lv_attr":""}
            ]}]}"#,
        );

        let err = h.driver.mount("data1").expect_err("no dm path");
        assert!(matches!(err, ServiceError::InvalidArgument(_)));

        // the directory stays behind for a retry
        assert!(h.root.path().join("data1").is_dir());
    }

    #[test]
    fn remove_unmounts_before_destroying() {
        let mut h = harness(&[]);
        h.runner.set_default_output("lvs", DATA1_LVS);
        h.runner.push_output("lsblk", b"\n");

        let mountpoint = h.driver.mount("data1").expect("mount runs");
        h.record_kernel_mount("/dev/mapper/vg0-data1", &mountpoint);

        h.driver.remove("data1").expect("removal runs");

        let programs = h.programs_called();
        let umount_at = programs.iter().position(|p| p == "umount");
        let lvremove_at = programs.iter().position(|p| p == "lvremove");
        assert!(umount_at.expect("umount issued") < lvremove_at.expect("lvremove issued"));
        assert!(!mountpoint.exists());

        let lvremove = h
            .runner
            .calls()
            .into_iter()
            .find(|call| call.program == "lvremove")
            .expect("lvremove call");
        assert_eq!(lvremove.args, vec!["--force", "vg0/data1"]);
    }

    #[test]
    fn remove_without_tracked_mountpoint_only_destroys() {
        let h = harness(&[]);
        h.runner.set_default_output("lvs", DATA1_LVS);

        h.driver.remove("data1").expect("removal runs");
        assert_eq!(h.programs_called(), vec!["lvs", "lvremove"]);
    }

    #[test]
    fn unmount_is_a_noop_without_tracked_mountpoint() {
        let h = harness(&[]);

        h.driver.unmount("data1").expect("no-op unmount");
        assert!(h.programs_called().is_empty());
    }

    #[test]
    fn capabilities_are_static_and_global() {
        let h = harness(&[]);
        assert_eq!(h.driver.capabilities().scope, "global");
        assert!(h.programs_called().is_empty());
    }

    #[test]
    fn full_lifecycle_round_trip() {
        let mut h = harness(&["vg0"]);
        h.runner.set_default_output("vgs", VGS_SAMPLE);
        h.runner.set_default_output("lvs", DATA1_LVS);
        h.runner.push_output("lsblk", b"\n");

        let options = CreateOptions {
            size: "10M".to_string(),
            volumegroup: "vg0".to_string(),
            ..Default::default()
        };
        h.driver.create("data1", &options).expect("create");

        let mounted_at = h.driver.mount("data1").expect("mount");
        h.record_kernel_mount("/dev/mapper/vg0-data1", &mounted_at);

        let path = h.driver.path("data1").expect("path");
        assert_eq!(path, mounted_at.to_string_lossy());

        h.driver.unmount("data1").expect("unmount");
        h.driver.remove("data1").expect("remove");

        // no directory entry left behind
        assert!(!h.root.path().join("data1").exists());

        // and the catalog no longer lists it
        h.runner.set_default_output("lvs", EMPTY_LVS);
        assert!(matches!(
            h.driver.get("data1"),
            Err(ServiceError::NotFound(_))
        ));
    }
}
