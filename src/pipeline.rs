// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Build Pipeline
//!
//! An explicit, ordered list of named [`BuildStage`]s. Each stage takes the
//! [`BuildContext`] left by the previous one and hands back the context for
//! the next, so the whole build state is visible in one value.
//!
//! ```rust,no_run
//! use assetflow::core::config::ConfigBuilder;
//! use assetflow::{configure, Pipeline};
//!
//! let config = ConfigBuilder::new().with_env().build().unwrap();
//! let setup = configure(&config).unwrap();
//! let report = Pipeline::standard(setup).run(config).unwrap();
//! println!("rendered {} page(s)", report.pages_rendered);
//! ```

use crate::cache_bust::RenameMap;
use crate::configure::BuildSetup;
use crate::core::config::BuildConfig;
use crate::core::error::Result;
use crate::core::traits::{BuildStage, Phase};
use crate::stages::{CacheBust, CleanStylesheets, Generate};
use log::{debug, info};
use serde::Serialize;
use std::path::PathBuf;

/// What a build did, filled in stage by stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Names of the stages that ran, in order.
    pub stages: Vec<String>,
    /// Directory emptied before the build, if any.
    pub cleaned: Option<PathBuf>,
    /// Asset files copied by passthrough rules.
    pub assets_copied: usize,
    /// Markdown pages rendered.
    pub pages_rendered: usize,
    /// HTML pages copied verbatim.
    pub pages_copied: usize,
    /// Stylesheet renames, when cache-busting ran.
    pub cache_bust: Option<RenameMap>,
}

/// State passed from stage to stage.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Configuration of this build.
    pub config: BuildConfig,
    /// Report accumulated so far.
    pub report: BuildReport,
}

impl BuildContext {
    /// Starts a context for `config` with an empty report.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            report: BuildReport::default(),
        }
    }
}

/// Ordered list of build stages.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn BuildStage>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard build: clean stylesheets, generate, cache-bust.
    pub fn standard(setup: BuildSetup) -> Self {
        Self::new()
            .with_stage(CleanStylesheets)
            .with_stage(Generate::new(setup))
            .with_stage(CacheBust::new())
    }

    /// Adds `stage` after every stage of the same or an earlier phase.
    pub fn with_stage<S: BuildStage + 'static>(mut self, stage: S) -> Self {
        let phase = stage.phase();
        let index = self
            .stages
            .iter()
            .position(|existing| existing.phase() > phase)
            .unwrap_or(self.stages.len());
        self.stages.insert(index, Box::new(stage));
        self
    }

    /// `(phase, name)` of every stage, in run order.
    pub fn stage_names(&self) -> Vec<(Phase, &'static str)> {
        self.stages.iter().map(|s| (s.phase(), s.name())).collect()
    }

    /// Runs every stage in order and returns the final report.
    ///
    /// The first failing stage aborts the build; later stages do not run.
    pub fn run(&self, config: BuildConfig) -> Result<BuildReport> {
        debug!("Pipeline stages: {:?}", self.stage_names());
        let mut context = BuildContext::new(config);

        for stage in &self.stages {
            info!("[{}] {}", stage.phase(), stage.name());
            context = stage.run(context)?;
            context.report.stages.push(stage.name().to_string());
        }

        info!(
            "Build finished: {} asset(s), {} page(s) rendered, {} page(s) copied",
            context.report.assets_copied,
            context.report.pages_rendered,
            context.report.pages_copied
        );
        Ok(context.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Profile;
    use crate::core::error::AssetFlowError;
    use crate::cache_bust::CacheToken;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct Named(&'static str, Phase);

    impl BuildStage for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn phase(&self) -> Phase {
            self.1
        }

        fn run(&self, context: BuildContext) -> Result<BuildContext> {
            Ok(context)
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl BuildStage for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn phase(&self) -> Phase {
            Phase::Generate
        }

        fn run(&self, _context: BuildContext) -> Result<BuildContext> {
            Err(AssetFlowError::internal_error("boom"))
        }
    }

    #[test]
    fn test_stages_sorted_by_phase() {
        let pipeline = Pipeline::new()
            .with_stage(Named("after", Phase::AfterBuild))
            .with_stage(Named("gen", Phase::Generate))
            .with_stage(Named("before", Phase::BeforeBuild))
            .with_stage(Named("gen-2", Phase::Generate));

        let names: Vec<_> =
            pipeline.stage_names().into_iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["before", "gen", "gen-2", "after"]);
    }

    #[test]
    fn test_failure_stops_pipeline() {
        let temp_dir = TempDir::new().unwrap();
        let config = BuildConfig {
            source_root: temp_dir.path().to_path_buf(),
            output_dir: temp_dir.path().join("dist"),
            profile: Profile::Development,
        };
        let pipeline = Pipeline::new()
            .with_stage(Failing)
            .with_stage(Named("after", Phase::AfterBuild));
        assert!(pipeline.run(config).is_err());
    }

    #[test]
    fn test_standard_pipeline_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("site");
        let output = temp_dir.path().join("dist");
        fs::create_dir_all(root.join("public/css")).unwrap();
        fs::create_dir_all(root.join("public/img")).unwrap();
        fs::write(root.join("public/css/site.css"), "body {}").unwrap();
        fs::write(root.join("public/img/logo.svg"), "<svg/>").unwrap();
        fs::write(
            root.join("index.md"),
            "<link rel=\"stylesheet\" href=\"/public/css/site.css\">\n\n# Home\n",
        )
        .unwrap();
        fs::write(
            root.join("about.md"),
            "<link rel=\"stylesheet\" href=\"/public/css/site.css\">\n\n# About\n",
        )
        .unwrap();

        // A stale stylesheet from an earlier production build.
        fs::create_dir_all(output.join("public/css")).unwrap();
        fs::write(output.join("public/css/site-0000aaaa.css"), "old").unwrap();

        let config = BuildConfig {
            source_root: root,
            output_dir: output.clone(),
            profile: Profile::Production,
        };
        let setup = crate::configure(&config).unwrap();
        let token = CacheToken::new("cafebabe").unwrap();
        let pipeline = Pipeline::new()
            .with_stage(CleanStylesheets)
            .with_stage(Generate::new(setup))
            .with_stage(CacheBust::with_token(token));

        let report = pipeline.run(config).unwrap();

        assert_eq!(
            report.stages,
            vec!["clean-stylesheets", "generate", "cache-bust"]
        );
        assert_eq!(report.assets_copied, 2);
        assert_eq!(report.pages_rendered, 2);
        let renames = report.cache_bust.unwrap();
        assert_eq!(renames.get("site.css"), Some("site-cafebabe.css"));

        let css: Vec<_> = fs::read_dir(output.join("public/css"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(css, vec!["site-cafebabe.css".to_string()]);

        let html = fs::read_to_string(output.join("index.html")).unwrap();
        assert!(html.contains("href=\"/public/css/site-cafebabe.css\""));
        assert!(output.join("public/img/logo.svg").exists());

        // Only the root page is rewritten.
        let about = fs::read_to_string(output.join("about.html")).unwrap();
        assert!(about.contains("href=\"/public/css/site.css\""));
    }
}
