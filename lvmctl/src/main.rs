// SPDX-License-Identifier: GPL-3.0-only

//! lvmctl - operator CLI over the LVM facade
//!
//! Talks to the LVM toolchain directly; useful for verifying an
//! environment before pointing the service at it.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lvmvol_sys::Lvm;
use lvmvol_sys::args::{
    LvCreationConfig, LvRemovalConfig, build_creation_args, build_removal_args,
};
use lvmvol_types::{LvAttr, bytes_to_pretty};

#[derive(Debug, Parser)]
#[command(name = "lvmctl", about, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the environment by dumping everything LVM reports
    Check,
    /// List logical volumes
    Ls,
    /// Inspect one logical volume
    Get {
        /// Name of the volume to inspect
        name: String,
    },
    /// Create a logical volume
    Create {
        /// Name of the volume to create
        #[arg(long)]
        name: String,
        /// Maximum size of the volume (e.g. "10M")
        #[arg(long, default_value = "")]
        size: String,
        /// Thin pool to base the volume on
        #[arg(long, default_value = "")]
        thinpool: String,
        /// Volume to take a snapshot of
        #[arg(long, default_value = "")]
        snapshot: String,
        /// Keyfile to encrypt the volume with
        #[arg(long, default_value = "")]
        keyfile: String,
        /// Volume group to create the volume in
        #[arg(long, default_value = "")]
        volumegroup: String,
    },
    /// Remove a logical volume
    Rm {
        /// Name of the volume to remove
        name: String,
    },
}

fn megabytes_to_pretty(megabytes: f64) -> String {
    bytes_to_pretty((megabytes * 1024.0 * 1024.0) as u64)
}

fn check(lvm: &Lvm) -> Result<()> {
    let pvs = lvm.list_physical_volumes()?;
    println!("\nPHYSICAL VOLUMES");
    println!("{:<24} {:<12} {:>12} {:>12}", "NAME", "VG", "SIZE", "FREE");
    for pv in pvs {
        println!(
            "{:<24} {:<12} {:>12} {:>12}",
            pv.device,
            pv.vg_name,
            megabytes_to_pretty(pv.size),
            megabytes_to_pretty(pv.free)
        );
    }

    let vgs = lvm.list_volume_groups()?;
    println!("\nVOLUME GROUPS");
    println!("{:<24} {:>12} {:>12}", "NAME", "SIZE", "FREE");
    for vg in vgs {
        println!(
            "{:<24} {:>12} {:>12}",
            vg.name,
            megabytes_to_pretty(vg.size),
            megabytes_to_pretty(vg.free)
        );
    }

    let lvs = lvm.list_logical_volumes()?;
    println!("\nLOGICAL VOLUMES");
    println!("{:<24} {:<12} {:>12} {:<12}", "NAME", "VG", "SIZE", "POOL");
    for lv in lvs {
        println!(
            "{:<24} {:<12} {:>12} {:<12}",
            lv.name,
            lv.vg_name,
            megabytes_to_pretty(lv.size),
            lv.pool
        );
    }

    Ok(())
}

fn ls(lvm: &Lvm) -> Result<()> {
    println!("{:<24} {:<12} {:>12}", "NAME", "VG", "SIZE");
    for lv in lvm.list_logical_volumes()? {
        println!(
            "{:<24} {:<12} {:>12}",
            lv.name,
            lv.vg_name,
            megabytes_to_pretty(lv.size)
        );
    }
    Ok(())
}

fn get(lvm: &Lvm, name: &str) -> Result<()> {
    let volume = lvm
        .get_logical_volume(name)?
        .with_context(|| format!("volume named {name} not found"))?;

    println!("{:<16}{}", "NAME", volume.full_name);
    println!("{:<16}{}", "DEVICE", volume.dm_path);
    println!("{:<16}{}", "SIZE", megabytes_to_pretty(volume.size));
    if !volume.pool.is_empty() {
        println!("{:<16}{}", "POOL", volume.pool);
    }
    if !volume.origin.is_empty() {
        println!("{:<16}{}", "ORIGIN", volume.origin);
    }

    if !volume.attr.is_empty() {
        let attr = LvAttr::parse(&volume.attr)
            .with_context(|| format!("couldn't decode attr '{}'", volume.attr))?;
        println!("{:<16}{}", "TYPE", attr.volume_type);
        println!("{:<16}{}", "PERMISSIONS", attr.permissions);
        println!("{:<16}{}", "STATE", attr.state);
        println!("{:<16}{}", "TARGET", attr.target_type);
        println!("{:<16}{}", "HEALTH", attr.health);
    }

    Ok(())
}

fn rm(lvm: &Lvm, name: &str) -> Result<()> {
    let volume = lvm
        .get_logical_volume(name)?
        .with_context(|| format!("volume named {name} not found"))?;

    let args = build_removal_args(&LvRemovalConfig {
        lv_name: volume.name.clone(),
        vg_name: volume.group().to_string(),
    })?;
    lvm.remove_lv(&args)?;

    println!("removed {}", volume.full_name);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let lvm = Lvm::new();

    match cli.command {
        Command::Check => check(&lvm),
        Command::Ls => ls(&lvm),
        Command::Get { name } => get(&lvm, &name),
        Command::Create {
            name,
            size,
            thinpool,
            snapshot,
            keyfile,
            volumegroup,
        } => {
            if volumegroup.is_empty() {
                bail!("a volume group must be specified");
            }

            let args = build_creation_args(&LvCreationConfig {
                name: name.clone(),
                size,
                snapshot,
                keyfile,
                thinpool,
                volume_group: volumegroup,
                fs_type: String::new(),
            })?;
            lvm.create_lv(&args)?;

            println!("created {name}");
            Ok(())
        }
        Command::Rm { name } => rm(&lvm, &name),
    }
}
