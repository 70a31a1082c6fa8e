// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Passthrough Copying
//!
//! Static assets that are copied verbatim from the source tree into the
//! output tree. A missing source is skipped, not reported as an error.

use crate::core::error::{AssetFlowError, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What a [`PassthroughRule`] copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum CopyMode {
    /// Regular files directly inside the source directory whose name ends
    /// with `.<extension>`. Subdirectories are ignored.
    TopLevelFiles {
        /// Extension without the leading dot.
        extension: String,
    },
    /// The whole directory, recursively.
    Directory,
}

/// One passthrough copy registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassthroughRule {
    /// Source directory.
    pub source: PathBuf,
    /// Destination directory.
    pub target: PathBuf,
    /// What to copy from `source`.
    pub mode: CopyMode,
}

impl PassthroughRule {
    /// Copies top-level `*.<extension>` files from `source` into `target`.
    pub fn files_with_extension<S, T>(
        source: S,
        target: T,
        extension: &str,
    ) -> Self
    where
        S: Into<PathBuf>,
        T: Into<PathBuf>,
    {
        Self {
            source: source.into(),
            target: target.into(),
            mode: CopyMode::TopLevelFiles {
                extension: extension.trim_start_matches('.').to_string(),
            },
        }
    }

    /// Copies the whole `source` directory into `target`.
    pub fn directory<S, T>(source: S, target: T) -> Self
    where
        S: Into<PathBuf>,
        T: Into<PathBuf>,
    {
        Self {
            source: source.into(),
            target: target.into(),
            mode: CopyMode::Directory,
        }
    }

    /// Performs the copy and returns the number of files written.
    pub fn apply(&self) -> Result<usize> {
        if !self.source.is_dir() {
            debug!(
                "Passthrough source {:?} does not exist, skipping",
                self.source
            );
            return Ok(0);
        }

        match &self.mode {
            CopyMode::TopLevelFiles { extension } => {
                copy_top_level(&self.source, &self.target, extension)
            }
            CopyMode::Directory => copy_tree(&self.source, &self.target),
        }
    }
}

fn copy_top_level(source: &Path, target: &Path, extension: &str) -> Result<usize> {
    let suffix = format!(".{}", extension);
    let mut copied = 0;

    for entry in read_dir(source)? {
        let entry =
            entry.map_err(|e| AssetFlowError::io_error(source.to_path_buf(), e))?;
        let path = entry.path();
        let is_match = path.is_file()
            && entry.file_name().to_string_lossy().ends_with(&suffix);
        if is_match {
            copy_file(&path, &target.join(entry.file_name()))?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn copy_tree(source: &Path, target: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in read_dir(source)? {
        let entry =
            entry.map_err(|e| AssetFlowError::io_error(source.to_path_buf(), e))?;
        let path = entry.path();
        let dest = target.join(entry.file_name());

        if path.is_dir() {
            copied += copy_tree(&path, &dest)?;
        } else if path.is_file() {
            copy_file(&path, &dest)?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn read_dir(path: &Path) -> Result<fs::ReadDir> {
    fs::read_dir(path).map_err(|e| AssetFlowError::io_error(path.to_path_buf(), e))
}

/// Copies `source` to `dest`, creating parent directories as needed.
pub fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AssetFlowError::io_error(parent.to_path_buf(), e))?;
    }
    _ = fs::copy(source, dest)
        .map_err(|e| AssetFlowError::io_error(source.to_path_buf(), e))?;
    debug!("Copied {:?} -> {:?}", source, dest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_top_level_css_only() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir_all(src.join("partials")).unwrap();
        fs::write(src.join("site.css"), "body {}").unwrap();
        fs::write(src.join("print.css"), "@media print {}").unwrap();
        fs::write(src.join("site.scss"), "$x: 1;").unwrap();
        fs::write(src.join("partials").join("nested.css"), "a {}").unwrap();
        let out = temp_dir.path().join("out");

        let rule = PassthroughRule::files_with_extension(&src, &out, ".css");
        assert_eq!(rule.apply().unwrap(), 2);

        assert!(out.join("site.css").exists());
        assert!(out.join("print.css").exists());
        assert!(!out.join("site.scss").exists());
        assert!(!out.join("partials").exists());
    }

    #[test]
    fn test_directory_copy_is_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("img");
        fs::create_dir_all(src.join("icons")).unwrap();
        fs::write(src.join("logo.png"), [0u8, 1, 2]).unwrap();
        fs::write(src.join("icons").join("star.svg"), "<svg/>").unwrap();
        let out = temp_dir.path().join("dist").join("img");

        let rule = PassthroughRule::directory(&src, &out);
        assert_eq!(rule.apply().unwrap(), 2);
        assert_eq!(fs::read(out.join("logo.png")).unwrap(), vec![0u8, 1, 2]);
        assert!(out.join("icons").join("star.svg").exists());
    }

    #[test]
    fn test_missing_source_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let rule = PassthroughRule::directory(
            temp_dir.path().join("fonts"),
            temp_dir.path().join("dist/fonts"),
        );
        assert_eq!(rule.apply().unwrap(), 0);
        assert!(!temp_dir.path().join("dist").exists());
    }
}
