// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for the lvmvol volume service
//!
//! This crate defines the types shared across the stack:
//!
//! - **lvmvol-sys**: decodes LVM report output directly into these types
//! - **lvmvol-service**: serializes these types over its wire protocol
//! - **lvmctl**: consumes these types for operator-facing output
//!
//! All catalog records (`PhysicalVolumeInfo`, `VolumeGroupInfo`,
//! `LogicalVolumeInfo`) are ephemeral: they are reconstructed from LVM's
//! own reports on every query and never cached anywhere.

pub mod attr;
pub mod bytes;
pub mod lvm;
pub mod mount;
pub mod volume;

pub use attr::{AttrError, LvAttr};
pub use bytes::{bytes_to_pretty, pretty_to_bytes};
pub use lvm::{LogicalVolumeInfo, PhysicalVolumeInfo, VolumeGroupInfo};
pub use mount::MountInfo;
pub use volume::{CapabilitiesInfo, VolumeInfo};
