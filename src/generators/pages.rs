//! # Page Generation
//!
//! Walks the source tree and writes every content page into the output
//! directory at the same relative path:
//!
//! - `*.md` pages are rendered with the configured [`MarkdownRenderer`] and
//!   written as `*.html`;
//! - `*.html` pages are copied verbatim.
//!
//! Hidden entries, `_`-prefixed entries, the asset directory (`public`) and
//! the output directory itself are skipped.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::configure::ASSET_ROOT;
use crate::core::error::{AssetFlowError, Result};
use crate::core::traits::Processor;
use crate::passthrough::copy_file;
use crate::processors::markdown::MarkdownRenderer;

/// Counts reported by one generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageCounts {
    /// Markdown pages rendered to HTML.
    pub rendered: usize,
    /// HTML pages copied verbatim.
    pub copied: usize,
}

/// Renders and copies the content pages of a site.
#[derive(Debug)]
pub struct PageGenerator<'a> {
    source_root: &'a Path,
    output_dir: &'a Path,
    renderer: &'a MarkdownRenderer,
}

impl<'a> PageGenerator<'a> {
    /// Creates a generator reading from `source_root` and writing to
    /// `output_dir`.
    pub fn new(
        source_root: &'a Path,
        output_dir: &'a Path,
        renderer: &'a MarkdownRenderer,
    ) -> Self {
        Self {
            source_root,
            output_dir,
            renderer,
        }
    }

    /// Generates every page under the source root.
    pub fn generate(&self) -> Result<PageCounts> {
        fs::create_dir_all(self.output_dir).map_err(|e| {
            AssetFlowError::io_error(self.output_dir.to_path_buf(), e)
        })?;
        let output = fs::canonicalize(self.output_dir).ok();

        let mut counts = PageCounts::default();
        self.walk(self.source_root, output.as_deref(), &mut counts)?;
        Ok(counts)
    }

    fn walk(
        &self,
        dir: &Path,
        output: Option<&Path>,
        counts: &mut PageCounts,
    ) -> Result<()> {
        let entries = fs::read_dir(dir)
            .map_err(|e| AssetFlowError::io_error(dir.to_path_buf(), e))?;

        for entry in entries {
            let entry = entry
                .map_err(|e| AssetFlowError::io_error(dir.to_path_buf(), e))?;
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if name.starts_with('.') || name.starts_with('_') {
                continue;
            }

            if path.is_dir() {
                if self.is_excluded_dir(dir, &name, &path, output) {
                    debug!("Skipping directory {:?}", path);
                    continue;
                }
                self.walk(&path, output, counts)?;
            } else if path.is_file() {
                self.generate_page(&path, counts)?;
            }
        }

        Ok(())
    }

    fn is_excluded_dir(
        &self,
        parent: &Path,
        name: &str,
        path: &Path,
        output: Option<&Path>,
    ) -> bool {
        if parent == self.source_root && name == ASSET_ROOT {
            return true;
        }
        if path == self.output_dir {
            return true;
        }
        match (output, fs::canonicalize(path)) {
            (Some(output), Ok(candidate)) => output == candidate,
            _ => false,
        }
    }

    fn generate_page(&self, path: &Path, counts: &mut PageCounts) -> Result<()> {
        let extension = path.extension().and_then(|e| e.to_str());
        let relative = path.strip_prefix(self.source_root).map_err(|e| {
            AssetFlowError::internal_error(format!(
                "Failed to determine relative path of {:?}: {}",
                path, e
            ))
        })?;

        match extension {
            Some("md") => {
                let content = fs::read_to_string(path)
                    .map_err(|e| AssetFlowError::io_error(path.to_path_buf(), e))?;
                let html = self.renderer.process(content)?;
                let dest = self.output_dir.join(relative).with_extension("html");
                write_page(&dest, &html)?;
                debug!("Rendered {:?} -> {:?}", path, dest);
                counts.rendered += 1;
            }
            Some("html") => {
                copy_file(path, &self.output_dir.join(relative))?;
                counts.copied += 1;
            }
            _ => {}
        }

        Ok(())
    }
}

fn write_page(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AssetFlowError::io_error(parent.to_path_buf(), e))?;
    }
    let file = File::create(path)
        .map_err(|e| AssetFlowError::io_error(path.to_path_buf(), e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(content.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|e| AssetFlowError::io_error(path.to_path_buf(), e))?;
    Ok(())
}
