// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # AssetFlow Library
//!
//! AssetFlow is the build configuration of a small static site: it slugifies
//! heading text, copies static assets, renders Markdown pages and, in
//! production builds, renames compiled stylesheets with a random suffix and
//! rewrites the links to them.
//!
//! A build is an ordered [`Pipeline`] of stages driven by one immutable
//! [`BuildConfig`](crate::core::config::BuildConfig).

#![doc = include_str!("../README.md")]
#![crate_name = "assetflow"]
#![crate_type = "lib"]

/// Configuration, errors and the shared traits.
pub mod core;

/// Stylesheet renaming and link rewriting.
pub mod cache_bust;

/// Directory cleaning.
pub mod clean;

/// Provides command-line interface utilities.
pub mod cli;

/// One-shot build configuration.
pub mod configure;

/// Provides output generation utilities.
pub mod generators;

/// Asset passthrough copying.
pub mod passthrough;

/// The ordered build pipeline.
pub mod pipeline;

/// Provides content processing utilities.
pub mod processors;

/// URL slugs for heading anchors.
pub mod slug;

/// The standard build stages.
pub mod stages;

pub use crate::cache_bust::{CacheToken, RenameMap};
pub use crate::configure::{configure, BuildSetup};
pub use crate::core::config::{BuildConfig, ConfigBuilder, Profile};
pub use crate::core::error::{AssetFlowError, Result};
pub use crate::pipeline::{BuildContext, BuildReport, Pipeline};
pub use crate::slug::slugify;
