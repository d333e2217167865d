// SPDX-License-Identifier: GPL-3.0-only

//! Low-level system operations for the lvmvol volume service
//!
//! This crate shells out to the LVM toolchain and reads kernel state; it
//! holds no durable state of its own. It provides:
//! - Subprocess execution with locale-stable numeric output
//! - Decoders for `pvs`/`vgs`/`lvs` JSON reports
//! - Argument builders and thin wrappers for volume lifecycle commands
//! - Kernel mount-table reading
//!
//! Everything side-effecting goes through the [`exec::CommandRunner`]
//! trait so callers can substitute scripted runners in tests.

pub mod args;
pub mod error;
pub mod exec;
pub mod fitter;
pub mod lvm;
pub mod mounts;
pub mod reports;
pub mod testing;

pub use error::{Result, SysError};
pub use exec::{CommandRunner, SystemRunner};
pub use fitter::pick_best_group;
pub use lvm::Lvm;
pub use mounts::MountTable;
