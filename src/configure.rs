// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Build Configurator
//!
//! One-shot setup of everything the generation pass needs: the passthrough
//! copy rules for static assets, the Markdown renderer with its extensions
//! and the output directory.

use crate::core::config::BuildConfig;
use crate::core::error::Result;
use crate::passthrough::PassthroughRule;
use crate::processors::markdown::MarkdownRenderer;
use crate::processors::syntax::{SyntaxHighlighter, DEFAULT_THEME};
use log::info;
use std::path::{Path, PathBuf};

/// Directory under the source root (and the output root) holding assets.
pub const ASSET_ROOT: &str = "public";

/// Asset category copied as top-level `.css` files only.
pub const STYLESHEET_CATEGORY: &str = "css";

/// Asset categories copied as whole directories.
pub const DIRECTORY_CATEGORIES: [&str; 3] = ["js", "img", "fonts"];

/// Everything the generation pass is configured with.
#[derive(Debug)]
pub struct BuildSetup {
    /// Passthrough copy rules, in registration order.
    pub passthrough: Vec<PassthroughRule>,
    /// Renderer for Markdown pages.
    pub renderer: MarkdownRenderer,
    /// Where the generated site is written.
    pub output_dir: PathBuf,
}

/// Builds the [`BuildSetup`] for `config`.
///
/// Registers, in order:
///
/// - the stylesheet rule `<source>/public/css/*.css` into
///   `<output>/public/css`, then whole-directory rules for `js`, `img` and
///   `fonts`;
/// - a syntect highlighter with the default theme;
/// - a Markdown renderer with raw HTML, automatic links, typographic
///   substitutions and slug heading anchors.
///
/// # Errors
///
/// Fails only if the highlighter cannot be created.
pub fn configure(config: &BuildConfig) -> Result<BuildSetup> {
    let passthrough = passthrough_rules(&config.source_root, &config.output_dir);

    let highlighter = SyntaxHighlighter::new(DEFAULT_THEME)?;
    let renderer = MarkdownRenderer::new()
        .with_html(true)
        .with_linkify(true)
        .with_typographer(true)
        .with_tables(true)
        .with_strikethrough(true)
        .with_heading_anchors(true)
        .with_highlighter(highlighter);

    info!(
        "Configured {} passthrough rule(s), output to {:?}",
        passthrough.len(),
        config.output_dir
    );

    Ok(BuildSetup {
        passthrough,
        renderer,
        output_dir: config.output_dir.clone(),
    })
}

/// The four asset rules for `source_root`, targeting `output_dir`.
pub fn passthrough_rules(source_root: &Path, output_dir: &Path) -> Vec<PassthroughRule> {
    let source = source_root.join(ASSET_ROOT);
    let target = output_dir.join(ASSET_ROOT);

    let mut rules = vec![PassthroughRule::files_with_extension(
        source.join(STYLESHEET_CATEGORY),
        target.join(STYLESHEET_CATEGORY),
        "css",
    )];
    rules.extend(DIRECTORY_CATEGORIES.iter().map(|category| {
        PassthroughRule::directory(source.join(category), target.join(category))
    }));
    rules
}
