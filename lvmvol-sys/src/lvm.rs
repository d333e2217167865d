// SPDX-License-Identifier: GPL-3.0-only

//! The volume-manager facade
//!
//! [`Lvm`] wraps the LVM toolchain (`pvs`/`vgs`/`lvs`/`lvcreate`/
//! `lvremove`), the filesystem tools (`mkfs`, `lsblk`, `mount`,
//! `umount`), and `cryptsetup`. It is stateless: every query re-invokes
//! the tools and re-decodes their reports.

use std::path::Path;

use lvmvol_types::{LogicalVolumeInfo, PhysicalVolumeInfo, VolumeGroupInfo};

use crate::args;
use crate::exec::{CommandRunner, SystemRunner};
use crate::reports;
use crate::{Result, SysError};

/// Shared flags for all three query commands: megabyte-normalized
/// suffix-free capacities and machine-readable output.
const QUERY_ARGS: [&str; 4] = [
    "--units=m",
    "--nosuffix",
    "--noheadings",
    "--report-format=json",
];

pub struct Lvm {
    runner: Box<dyn CommandRunner>,
}

impl Default for Lvm {
    fn default() -> Self {
        Self::new()
    }
}

impl Lvm {
    /// Facade over the real system tools.
    pub fn new() -> Self {
        Self::with_runner(Box::new(SystemRunner))
    }

    /// Facade over an arbitrary runner; tests inject scripted ones.
    pub fn with_runner(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn query(&self, program: &str) -> Result<Vec<u8>> {
        let args: Vec<String> = QUERY_ARGS.iter().map(|s| s.to_string()).collect();
        self.runner.run(program, &args)
    }

    /// List all physical volumes known to the LVM controller.
    pub fn list_physical_volumes(&self) -> Result<Vec<PhysicalVolumeInfo>> {
        tracing::debug!("retrieving physical volumes");
        reports::decode_physical_volumes(&self.query("pvs")?)
    }

    /// List all volume groups known to the LVM controller.
    pub fn list_volume_groups(&self) -> Result<Vec<VolumeGroupInfo>> {
        tracing::debug!("retrieving volume groups");
        reports::decode_volume_groups(&self.query("vgs")?)
    }

    /// List all logical volumes, back-filling each record's owning group
    /// from its "vg/lv" full name when the direct field came back blank.
    pub fn list_logical_volumes(&self) -> Result<Vec<LogicalVolumeInfo>> {
        tracing::debug!("retrieving logical volumes");
        let mut volumes = reports::decode_logical_volumes(&self.query("lvs")?)?;

        for volume in &mut volumes {
            if volume.vg_name.is_empty() {
                volume.vg_name = volume.group().to_string();
            }
        }

        Ok(volumes)
    }

    /// Look a logical volume up by bare name.
    ///
    /// Names are not unique across groups; when the same name exists in
    /// two groups this returns the first match the report listed.
    pub fn get_logical_volume(&self, name: &str) -> Result<Option<LogicalVolumeInfo>> {
        if name.is_empty() {
            return Err(SysError::InvalidInput("a name must be provided".to_string()));
        }

        let volumes = self.list_logical_volumes()?;
        Ok(volumes.into_iter().find(|volume| volume.name == name))
    }

    /// Run `lvcreate` with args from [`args::build_creation_args`].
    pub fn create_lv(&self, creation_args: &[String]) -> Result<()> {
        self.runner.run("lvcreate", creation_args)?;
        Ok(())
    }

    /// Run `lvremove` with args from [`args::build_removal_args`].
    pub fn remove_lv(&self, removal_args: &[String]) -> Result<()> {
        self.runner.run("lvremove", removal_args)?;
        Ok(())
    }

    /// Create a filesystem on a device.
    pub fn make_fs(&self, fs_type: &str, device: &str) -> Result<()> {
        let mkfs_args = args::build_mkfs_args(fs_type, device)?;
        self.runner.run("mkfs", &mkfs_args)?;
        Ok(())
    }

    /// Probe a device for an existing filesystem; true iff the probe
    /// reported one.
    pub fn is_device_formatted(&self, device: &str) -> Result<bool> {
        let probe_args = args::build_format_probe_args(device)?;
        let output = self.runner.run("lsblk", &probe_args)?;
        Ok(!String::from_utf8_lossy(&output).trim().is_empty())
    }

    /// Mount a device at a location.
    pub fn mount(&self, device: &str, location: &Path) -> Result<()> {
        let mount_args = args::build_mount_args(device, &location.to_string_lossy())?;
        self.runner.run("mount", &mount_args)?;
        Ok(())
    }

    /// Unmount whatever is mounted at a location.
    pub fn unmount(&self, location: &Path) -> Result<()> {
        let location = location.to_string_lossy();
        if location.is_empty() {
            return Err(SysError::InvalidInput(
                "a location must be specified".to_string(),
            ));
        }

        self.runner.run("umount", &[location.into_owned()])?;
        Ok(())
    }

    /// Initialize a LUKS container on a device.
    pub fn luks_format(&self, device: &str, keyfile: &str) -> Result<()> {
        let luks_args = args::build_luks_format_args(device, keyfile)?;
        self.runner.run("cryptsetup", &luks_args)?;
        Ok(())
    }

    /// Open a LUKS container under a mapped name. The keyfile is
    /// re-inspected here: open may run long after creation validated it.
    pub fn luks_open(&self, device: &str, name: &str, keyfile: &str) -> Result<()> {
        args::inspect_keyfile(keyfile)?;
        let luks_args = args::build_luks_open_args(device, name, keyfile)?;
        self.runner.run("cryptsetup", &luks_args)?;
        Ok(())
    }

    /// Close a mapped LUKS container.
    pub fn luks_close(&self, name: &str) -> Result<()> {
        let luks_args = args::build_luks_close_args(name)?;
        self.runner.run("cryptsetup", &luks_args)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;

    #[test]
    fn queries_use_machine_readable_flags() {
        let runner = ScriptedRunner::new();
        runner.push_output(
            "vgs",
            br#"{"report":[{"vg":[]}]}"#,
        );

        let lvm = Lvm::with_runner(Box::new(runner.clone()));
        let groups = lvm.list_volume_groups().expect("scripted query");
        assert!(groups.is_empty());

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "vgs");
        assert_eq!(calls[0].args, QUERY_ARGS);
    }

    #[test]
    fn logical_volume_listing_backfills_group_name() {
        let runner = ScriptedRunner::new();
        runner.push_output(
            "lvs",
            br#"{"report":[{"lv":[
                {"lv_name":"data","vg_name":"","lv_full_name":"vg0/data",
                 "lv_dm_path":"/dev/mapper/vg0-data","lv_size":"10.00","lv_attr":"-wi-a-----"}
            ]}]}"#,
        );

        let lvm = Lvm::with_runner(Box::new(runner));
        let volumes = lvm.list_logical_volumes().expect("scripted query");
        assert_eq!(volumes[0].vg_name, "vg0");
    }

    #[test]
    fn get_returns_first_match_or_none() {
        let report = br#"{"report":[{"lv":[
            {"lv_name":"data","vg_name":"vg0","lv_full_name":"vg0/data",
             "lv_dm_path":"","lv_size":"10.00","lv_attr":""},
            {"lv_name":"data","vg_name":"vg1","lv_full_name":"vg1/data",
             "lv_dm_path":"","lv_size":"20.00","lv_attr":""}
        ]}]}"#;

        let runner = ScriptedRunner::new();
        runner.push_output("lvs", report);
        runner.push_output("lvs", report);

        let lvm = Lvm::with_runner(Box::new(runner));

        let found = lvm
            .get_logical_volume("data")
            .expect("scripted query")
            .expect("volume exists");
        assert_eq!(found.vg_name, "vg0");

        assert!(
            lvm.get_logical_volume("missing")
                .expect("scripted query")
                .is_none()
        );
    }

    #[test]
    fn format_probe_interprets_empty_output_as_unformatted() {
        let runner = ScriptedRunner::new();
        runner.push_output("lsblk", b"\n");
        runner.push_output("lsblk", b"ext4\n");

        let lvm = Lvm::with_runner(Box::new(runner));
        assert!(!lvm.is_device_formatted("/dev/x").expect("probe"));
        assert!(lvm.is_device_formatted("/dev/x").expect("probe"));
    }

    #[test]
    fn command_failures_surface_with_output() {
        let runner = ScriptedRunner::new();
        runner.push_failure("lvcreate", "Volume group \"vg9\" not found");

        let lvm = Lvm::with_runner(Box::new(runner));
        let err = lvm
            .create_lv(&["--name".to_string(), "lv0".to_string()])
            .expect_err("scripted failure");

        assert!(err.to_string().contains("vg9"));
    }
}
