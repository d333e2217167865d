// SPDX-License-Identifier: GPL-3.0-only

//! Mountpoint directory bookkeeping
//!
//! One subdirectory of a fixed root per provisioned volume. Directory
//! existence is the only durable record the service keeps outside LVM
//! itself, so validation is strict and all reads go straight to disk.

use std::fs;
use std::path::{Path, PathBuf};

use nix::unistd::{AccessFlags, access};

use crate::error::{Result, ServiceError};

/// Volume name grammar: alphanumeric first character, then alphanumeric,
/// underscore or hyphen, 2 to 251 characters overall.
fn is_valid_name(name: &str) -> bool {
    let len = name.chars().count();
    if !(2..=251).contains(&len) {
        return false;
    }

    let mut chars = name.chars();
    let first = match chars.next() {
        Some(ch) => ch,
        None => return false,
    };

    first.is_ascii_alphanumeric()
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

/// Manages the per-volume mountpoint directories under a single root.
#[derive(Debug, Clone)]
pub struct DirManager {
    root: PathBuf,
}

impl DirManager {
    /// Create a manager rooted at an absolute, writable path. The root is
    /// created when missing.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if root.as_os_str().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "a root must be specified".to_string(),
            ));
        }

        if !root.is_absolute() {
            return Err(ServiceError::InvalidArgument(format!(
                "root {} must be an absolute path",
                root.display()
            )));
        }

        if !root.exists() {
            fs::create_dir_all(&root)?;
        }

        access(&root, AccessFlags::W_OK).map_err(|e| {
            ServiceError::InvalidArgument(format!("root {} must be writable: {e}", root.display()))
        })?;

        Ok(Self { root })
    }

    fn validate(name: &str) -> Result<()> {
        if !is_valid_name(name) {
            return Err(ServiceError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// The mountpoint a name maps to. Pure: validates and joins, never
    /// touches disk.
    pub fn mountpoint(&self, name: &str) -> Result<PathBuf> {
        Self::validate(name)?;
        Ok(self.root.join(name))
    }

    /// Names of all managed subdirectories.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut directories = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                directories.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        directories.sort();
        Ok(directories)
    }

    /// Look a name up in the listing; `None` when no directory exists.
    pub fn get(&self, name: &str) -> Result<Option<PathBuf>> {
        Self::validate(name)?;

        let exists = self.list()?.iter().any(|dir| dir == name);
        Ok(exists.then(|| self.root.join(name)))
    }

    /// Create the mountpoint directory; succeeds when already present.
    pub fn create(&self, name: &str) -> Result<PathBuf> {
        let path = self.mountpoint(name)?;
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Recursively remove an existing mountpoint directory.
    pub fn delete(&self, name: &str) -> Result<()> {
        Self::validate(name)?;

        match self.get(name)? {
            Some(path) => {
                fs::remove_dir_all(path)?;
                Ok(())
            }
            None => Err(ServiceError::NotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (tempfile::TempDir, DirManager) {
        let root = tempfile::tempdir().expect("temp root");
        let manager = DirManager::new(root.path()).expect("valid root");
        (root, manager)
    }

    #[test]
    fn new_rejects_empty_and_relative_roots() {
        assert!(DirManager::new("").is_err());
        assert!(DirManager::new("var/log").is_err());
    }

    #[test]
    fn new_creates_missing_root() {
        let parent = tempfile::tempdir().expect("temp root");
        let root = parent.path().join("volumes");

        DirManager::new(&root).expect("root gets created");
        assert!(root.is_dir());
    }

    #[test]
    fn mountpoint_is_deterministic_join() {
        let (root, manager) = manager();
        let mp = manager.mountpoint("abc").expect("valid name");
        assert_eq!(mp, root.path().join("abc"));
        // repeated resolution yields the same path, no disk access involved
        assert_eq!(manager.mountpoint("abc").expect("valid name"), mp);
        assert!(!mp.exists());
    }

    #[test]
    fn bad_names_fail_every_operation() {
        let (_root, manager) = manager();

        for name in ["", "a", "./", "'aa", "bb+", "a b c", "-leading", "_x"] {
            assert!(manager.mountpoint(name).is_err(), "name {name:?}");
            assert!(manager.get(name).is_err(), "name {name:?}");
            assert!(manager.create(name).is_err(), "name {name:?}");
            assert!(manager.delete(name).is_err(), "name {name:?}");
        }

        let too_long = format!("a{}", "b".repeat(251));
        assert!(manager.create(&too_long).is_err());
    }

    #[test]
    fn create_is_idempotent() {
        let (root, manager) = manager();

        let path = manager.create("abc").expect("first create");
        assert_eq!(path, root.path().join("abc"));
        assert!(path.is_dir());

        assert_eq!(manager.create("abc").expect("second create"), path);
    }

    #[test]
    fn list_returns_subdirectories_only() {
        let (root, manager) = manager();
        assert!(manager.list().expect("empty listing").is_empty());

        manager.create("abc").expect("create");
        manager.create("def").expect("create");
        std::fs::write(root.path().join("not-a-dir"), b"x").expect("write file");

        assert_eq!(manager.list().expect("listing"), vec!["abc", "def"]);
    }

    #[test]
    fn get_finds_only_existing_directories() {
        let (root, manager) = manager();

        assert!(manager.get("abc").expect("valid name").is_none());

        manager.create("abc").expect("create");
        assert_eq!(
            manager.get("abc").expect("valid name"),
            Some(root.path().join("abc"))
        );
    }

    #[test]
    fn delete_requires_existence() {
        let (_root, manager) = manager();

        assert!(matches!(
            manager.delete("abc"),
            Err(ServiceError::NotFound(_))
        ));

        let path = manager.create("abc").expect("create");
        manager.delete("abc").expect("delete");
        assert!(!path.exists());
    }
}
