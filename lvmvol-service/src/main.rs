// SPDX-License-Identifier: GPL-3.0-only

//! lvmvol service - unix-socket volume lifecycle service backed by LVM
//!
//! Exposes Create/Get/List/Remove/Path/Mount/Unmount/Capabilities over a
//! local socket, provisioning logical volumes and attaching them as
//! mountable directories under a fixed root.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod dirs;
mod driver;
mod error;
mod protocol;
mod server;
mod whitelist;

use dirs::DirManager;
use driver::{Driver, DriverConfig};
use lvmvol_sys::{Lvm, MountTable};
use server::Server;

#[derive(Debug, Parser)]
#[command(name = "lvmvol-service", about, version)]
struct Cli {
    /// Unix socket to listen on
    #[arg(long, default_value = "/run/lvmvol/lvmvol.sock")]
    socket: PathBuf,

    /// Root directory holding one mountpoint per volume
    #[arg(long, default_value = "/mnt/lvmvol")]
    root: PathBuf,

    /// Volume-group whitelist file, one group name per line
    #[arg(long, default_value = "/mnt/lvmvol/whitelist")]
    whitelist: PathBuf,

    /// Filesystem created on first mount of an unformatted device
    #[arg(long, default_value = "ext4")]
    fs_type: String,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lvmvol_service=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    tracing::info!(
        "starting lvmvol service v{}",
        env!("CARGO_PKG_VERSION")
    );

    if !nix::unistd::Uid::effective().is_root() {
        anyhow::bail!("service must run with root privileges");
    }

    let whitelist = whitelist::load_whitelist(&cli.whitelist).with_context(|| {
        format!(
            "couldn't read volume groups from whitelist file {}",
            cli.whitelist.display()
        )
    })?;

    let dir_manager = DirManager::new(&cli.root)
        .with_context(|| format!("couldn't set up mount root {}", cli.root.display()))?;

    let driver = Driver::new(DriverConfig {
        lvm: Lvm::new(),
        dir_manager,
        whitelist,
        mount_table: MountTable::new(),
        default_fs_type: cli.fs_type,
    });
    tracing::info!("driver initialized");

    Server::new(driver, cli.socket).serve()?;
    Ok(())
}
