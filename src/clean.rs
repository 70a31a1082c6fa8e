// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Directory Cleaning
//!
//! Empties a build-output directory while keeping the directory itself.
//! This is destructive and irreversible, so it is only ever pointed at
//! paths below the configured output directory.

use crate::core::error::{AssetFlowError, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Recursively removes every file and subdirectory under `path`, leaving
/// `path` in place.
///
/// A path that does not exist is a no-op. Subdirectories are emptied
/// depth-first before they are removed. Symbolic links are removed, never
/// followed. The first IO failure aborts the walk and is returned with the
/// path it happened on.
///
/// # Examples
///
/// ```
/// use assetflow::clean::clean_dir;
/// # let temp = std::env::temp_dir().join("assetflow-clean-doc");
/// # std::fs::create_dir_all(temp.join("nested")).unwrap();
/// # std::fs::write(temp.join("nested/file.txt"), "x").unwrap();
///
/// clean_dir(&temp).unwrap();
/// assert!(temp.exists());
/// assert_eq!(std::fs::read_dir(&temp).unwrap().count(), 0);
/// # std::fs::remove_dir(&temp).unwrap();
/// ```
pub fn clean_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        debug!("Nothing to clean at {:?}", path);
        return Ok(());
    }

    let entries = fs::read_dir(path)
        .map_err(|e| AssetFlowError::io_error(path.to_path_buf(), e))?;

    for entry in entries {
        let entry =
            entry.map_err(|e| AssetFlowError::io_error(path.to_path_buf(), e))?;
        let child = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| AssetFlowError::io_error(child.clone(), e))?;

        if file_type.is_dir() {
            clean_dir(&child)?;
            fs::remove_dir(&child)
                .map_err(|e| AssetFlowError::io_error(child.clone(), e))?;
        } else {
            fs::remove_file(&child)
                .map_err(|e| AssetFlowError::io_error(child.clone(), e))?;
        }
        debug!("Removed {:?}", child);
    }

    Ok(())
}
