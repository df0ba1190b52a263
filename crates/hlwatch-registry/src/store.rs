//! JSON file holding the tracked address list.
//!
//! The file is a plain JSON array of address strings:
//!
//! ```json
//! [
//!   "0x5d2f4460ac3514ada79f5d9838916e508ab39bb7"
//! ]
//! ```
//!
//! Writes go to a sibling temp file that is then renamed over the target,
//! so a crash mid-write leaves either the old list or the new one.

use crate::error::RegistryResult;
use hlwatch_core::UserAddress;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Address list file.
#[derive(Debug, Clone)]
pub struct AddressFile {
    path: PathBuf,
}

impl AddressFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the list.
    ///
    /// A missing or unreadable-as-JSON file yields an empty list. Entries
    /// that are not valid addresses, and repeats, are skipped.
    pub fn load(&self) -> RegistryResult<Vec<UserAddress>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Address file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let entries = match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Array(entries)) => entries,
            _ => {
                warn!(path = %self.path.display(), "Address file is not a JSON array, starting empty");
                return Ok(Vec::new());
            }
        };

        let mut addresses: Vec<UserAddress> = Vec::with_capacity(entries.len());
        for entry in entries {
            let parsed = entry.as_str().map(UserAddress::parse);
            match parsed {
                Some(Ok(address)) if !addresses.contains(&address) => addresses.push(address),
                Some(Ok(address)) => warn!(address = %address, "Skipping duplicate address"),
                _ => warn!(entry = %entry, "Skipping invalid address entry"),
            }
        }
        Ok(addresses)
    }

    /// Replace the file with `addresses`.
    pub fn save(&self, addresses: &[UserAddress]) -> RegistryResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(addresses)?;
        let tmp = self.tmp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), count = addresses.len(), "Saved address file");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "addresses.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const A: &str = "0x5d2f4460ac3514ada79f5d9838916e508ab39bb7";
    const B: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let file = AddressFile::new(dir.path().join("addresses.json"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let file = AddressFile::new(dir.path().join("nested").join("addresses.json"));
        let addresses = vec![UserAddress::parse(A).unwrap(), UserAddress::parse(B).unwrap()];

        file.save(&addresses).unwrap();
        assert_eq!(file.load().unwrap(), addresses);

        let raw = fs::read_to_string(file.path()).unwrap();
        assert_eq!(raw, format!("[\n  \"{A}\",\n  \"{B}\"\n]"));
        assert!(!dir.path().join("nested").join("addresses.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("addresses.json");
        fs::write(&path, "{not json").unwrap();
        assert!(AddressFile::new(&path).load().unwrap().is_empty());

        fs::write(&path, r#"{"addresses": []}"#).unwrap();
        assert!(AddressFile::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_and_duplicate_entries_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("addresses.json");
        fs::write(&path, format!(r#"["{A}", "0x123", 42, "{A}", "{B}"]"#)).unwrap();

        let loaded = AddressFile::new(&path).load().unwrap();
        let loaded: Vec<_> = loaded.iter().map(UserAddress::as_str).collect();
        assert_eq!(loaded, vec![A, B]);
    }
}
