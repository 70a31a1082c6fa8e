// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Build Stages
//!
//! The three stages of the standard [`Pipeline`](crate::Pipeline):
//!
//! | Phase          | Stage                | Effect                                         |
//! |----------------|----------------------|------------------------------------------------|
//! | `before-build` | [`CleanStylesheets`] | empties `<output>/public/css`                  |
//! | `generate`     | [`Generate`]         | passthrough copies and page generation         |
//! | `after-build`  | [`CacheBust`]        | renames stylesheets, rewrites `index.html`     |

use crate::cache_bust::{bust_stylesheets, CacheToken};
use crate::clean::clean_dir;
use crate::configure::BuildSetup;
use crate::core::error::Result;
use crate::core::traits::{BuildStage, Phase};
use crate::generators::PageGenerator;
use crate::pipeline::BuildContext;
use log::info;

/// Empties the compiled-stylesheet directory before each build, so renamed
/// copies from earlier builds never pile up.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanStylesheets;

impl BuildStage for CleanStylesheets {
    fn name(&self) -> &'static str {
        "clean-stylesheets"
    }

    fn phase(&self) -> Phase {
        Phase::BeforeBuild
    }

    fn run(&self, mut context: BuildContext) -> Result<BuildContext> {
        let dir = context.config.stylesheet_dir();
        clean_dir(&dir)?;
        info!("Cleaned {:?}", dir);
        context.report.cleaned = Some(dir);
        Ok(context)
    }
}

/// Applies the passthrough rules, then renders and copies content pages.
#[derive(Debug)]
pub struct Generate {
    setup: BuildSetup,
}

impl Generate {
    /// Creates the stage from the configurator's output.
    pub fn new(setup: BuildSetup) -> Self {
        Self { setup }
    }
}

impl BuildStage for Generate {
    fn name(&self) -> &'static str {
        "generate"
    }

    fn phase(&self) -> Phase {
        Phase::Generate
    }

    fn run(&self, mut context: BuildContext) -> Result<BuildContext> {
        let mut copied = 0;
        for rule in &self.setup.passthrough {
            copied += rule.apply()?;
        }
        info!("Copied {} asset file(s)", copied);

        let counts = PageGenerator::new(
            &context.config.source_root,
            &self.setup.output_dir,
            &self.setup.renderer,
        )
        .generate()?;
        info!(
            "Rendered {} page(s), copied {} page(s)",
            counts.rendered, counts.copied
        );

        context.report.assets_copied += copied;
        context.report.pages_rendered += counts.rendered;
        context.report.pages_copied += counts.copied;
        Ok(context)
    }
}

/// Renames stylesheets with a random suffix and rewrites the root HTML
/// document. Does nothing unless the build profile is production.
#[derive(Debug, Clone, Default)]
pub struct CacheBust {
    token: Option<CacheToken>,
}

impl CacheBust {
    /// A stage drawing a fresh token on every run.
    pub fn new() -> Self {
        Self::default()
    }

    /// A stage that always uses `token`.
    pub fn with_token(token: CacheToken) -> Self {
        Self { token: Some(token) }
    }
}

impl BuildStage for CacheBust {
    fn name(&self) -> &'static str {
        "cache-bust"
    }

    fn phase(&self) -> Phase {
        Phase::AfterBuild
    }

    fn run(&self, mut context: BuildContext) -> Result<BuildContext> {
        if !context.config.profile.is_production() {
            info!("Not a production build, stylesheets keep their names");
            return Ok(context);
        }

        let token = self.token.clone().unwrap_or_else(CacheToken::generate);
        let renames = bust_stylesheets(
            &context.config.stylesheet_dir(),
            &context.config.index_html(),
            &token,
        )?;
        context.report.cache_bust = Some(renames);
        Ok(context)
    }
}
