// SPDX-License-Identifier: GPL-3.0-only

//! Volume-group whitelist
//!
//! Auto-selection on create only considers groups named in this file.
//! An explicit group supplied by the caller is honored regardless; the
//! whitelist gates selection, it is not an access-control boundary.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Load the whitelist: one group name per line, blanks ignored,
/// duplicates collapsed.
pub fn load_whitelist(path: &Path) -> Result<BTreeSet<String>> {
    let contents = fs::read_to_string(path)?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn collapses_duplicates_and_skips_blanks() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "vg0\n\nvg1\nvg0\n  \n").expect("write");
        file.flush().expect("flush");

        let whitelist = load_whitelist(file.path()).expect("readable file");
        assert_eq!(whitelist.len(), 2);
        assert!(whitelist.contains("vg0"));
        assert!(whitelist.contains("vg1"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_whitelist(Path::new("/definitely/not/here")).is_err());
    }
}
