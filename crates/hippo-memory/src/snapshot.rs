// SPDX-FileCopyrightText: 2026 Hippo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON file I/O for snapshots and checkpoints.
//!
//! Writes are plain overwrites: concurrent writers to the same path race and
//! the last one wins.

use std::path::Path;

use hippo_core::error::HippoError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Serializes `value` as pretty JSON to `path`, creating parent directories.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), HippoError> {
    let body = serde_json::to_vec_pretty(value)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, body).await?;
    Ok(())
}

/// Reads and parses a JSON file.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, HippoError> {
    let body = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.json");
        let mut value = BTreeMap::new();
        value.insert("k".to_string(), 1u32);
        write_json(&path, &value).await.unwrap();
        let back: BTreeMap<String, u32> = read_json(&path).await.unwrap();
        assert_eq!(back, value);
    }

    #[tokio::test]
    async fn missing_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json::<serde_json::Value>(&dir.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, HippoError::Storage { .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let err = read_json::<serde_json::Value>(&path).await.unwrap_err();
        assert!(matches!(err, HippoError::Storage { .. }));
    }
}
