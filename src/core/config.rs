//! # Configuration Module
//!
//! Builds the immutable [`BuildConfig`] record that every build stage reads.
//! Values are layered from several sources, later ones winning:
//!
//! 1. built-in defaults (`.` as source root, `dist` as output, development);
//! 2. an optional TOML file;
//! 3. the `publicDIR` and `MY_ENVIRONMENT` environment variables;
//! 4. explicit overrides, usually coming from command-line flags.
//!
//! The environment is read once, inside [`ConfigBuilder`]. Nothing else in
//! the crate looks at process-wide state.
//!
//! ## Example
//!
//! ```rust,no_run
//! use assetflow::core::config::{ConfigBuilder, Profile};
//!
//! let config = ConfigBuilder::new()
//!     .with_file("assetflow.toml")
//!     .with_env()
//!     .with_profile(Profile::Production)
//!     .build()
//!     .unwrap();
//!
//! assert!(config.profile.is_production());
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::error::{AssetFlowError, Result};

/// Environment variable naming the root of the content tree.
pub const ENV_SOURCE_ROOT: &str = "publicDIR";

/// Environment variable selecting the build profile.
pub const ENV_ENVIRONMENT: &str = "MY_ENVIRONMENT";

/// The only value of [`ENV_ENVIRONMENT`] that selects production.
pub const PRODUCTION: &str = "production";

/// Default output directory for generated files.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Default content root.
pub const DEFAULT_SOURCE_ROOT: &str = ".";

/// Operational profile of a build.
///
/// Only [`Profile::Production`] enables cache-busting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Local builds; stylesheets keep their names.
    #[default]
    Development,
    /// Release builds; stylesheets are renamed with a random suffix.
    Production,
}

impl Profile {
    /// Maps a raw flag value onto a profile.
    ///
    /// The match is exact and case-sensitive: `"production"` selects
    /// production, anything else (including `"Production"`) development.
    pub fn from_flag(value: &str) -> Self {
        if value == PRODUCTION {
            Profile::Production
        } else {
            Profile::Development
        }
    }

    /// Returns `true` for [`Profile::Production`].
    pub fn is_production(self) -> bool {
        self == Profile::Production
    }
}

/// The configuration record for a single build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    /// Root of the content tree; assets live under `<source_root>/public`.
    pub source_root: PathBuf,
    /// Directory the build writes into.
    pub output_dir: PathBuf,
    /// Selected profile.
    pub profile: Profile,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from(DEFAULT_SOURCE_ROOT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            profile: Profile::default(),
        }
    }
}

impl BuildConfig {
    /// The directory compiled stylesheets are written to:
    /// `<output_dir>/public/css`.
    pub fn stylesheet_dir(&self) -> PathBuf {
        self.output_dir.join("public").join("css")
    }

    /// The root HTML document rewritten by cache-busting:
    /// `<output_dir>/index.html`.
    pub fn index_html(&self) -> PathBuf {
        self.output_dir.join("index.html")
    }
}

/// Shape of the optional TOML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    source_root: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    profile: Option<String>,
}

/// Values captured from the environment.
#[derive(Debug, Default, Clone)]
struct EnvValues {
    source_root: Option<String>,
    environment: Option<String>,
}

/// Builds a [`BuildConfig`] from defaults, a file, the environment and
/// explicit overrides.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    env: Option<EnvValues>,
    source_root: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    profile: Option<Profile>,
}

impl ConfigBuilder {
    /// Initialises a new `ConfigBuilder` with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TOML configuration file.
    ///
    /// Recognised keys are `source_root`, `output_dir` and `profile`.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Captures `publicDIR` and `MY_ENVIRONMENT` from the process
    /// environment.
    pub fn with_env(self) -> Self {
        self.with_env_lookup(|key| env::var(key).ok())
    }

    /// Captures the environment flags through `lookup` instead of the
    /// process environment.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.env = Some(EnvValues {
            source_root: lookup(ENV_SOURCE_ROOT),
            environment: lookup(ENV_ENVIRONMENT),
        });
        self
    }

    /// Overrides the content root.
    pub fn with_source_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Overrides the output directory.
    pub fn with_output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Overrides the profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Layers every source onto the defaults and validates the result.
    pub fn build(self) -> Result<BuildConfig> {
        let mut config = BuildConfig::default();

        if let Some(path) = &self.config_file {
            apply_file(&mut config, load_from_file(path)?);
        }

        if let Some(env) = &self.env {
            apply_env(&mut config, env);
        }

        if let Some(source_root) = self.source_root {
            config.source_root = source_root;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(profile) = self.profile {
            config.profile = profile;
        }

        validate_config(&config)?;
        debug!("Resolved build configuration: {:?}", config);
        Ok(config)
    }
}

fn load_from_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        AssetFlowError::config_error(
            format!("Failed to read config file: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    toml::from_str(&content).map_err(|e| {
        AssetFlowError::config_error(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
        )
    })
}

fn apply_file(config: &mut BuildConfig, file: ConfigFile) {
    if let Some(source_root) = file.source_root {
        config.source_root = source_root;
    }
    if let Some(output_dir) = file.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(profile) = file.profile {
        config.profile = Profile::from_flag(&profile);
    }
}

fn apply_env(config: &mut BuildConfig, env: &EnvValues) {
    // An empty `publicDIR` counts as unset.
    if let Some(root) = env.source_root.as_deref().filter(|r| !r.is_empty())
    {
        config.source_root = PathBuf::from(root);
    }
    if let Some(environment) = env.environment.as_deref() {
        config.profile = Profile::from_flag(environment);
    }
}

fn validate_config(config: &BuildConfig) -> Result<()> {
    let root = &config.source_root;
    if !root.exists() {
        return Err(AssetFlowError::config_error(
            format!("source directory does not exist: {}", root.display()),
            Some(root.clone()),
        ));
    }
    if !root.is_dir() {
        return Err(AssetFlowError::config_error(
            format!("source path is not a directory: {}", root.display()),
            Some(root.clone()),
        ));
    }

    if config.output_dir.as_os_str().is_empty() {
        return Err(AssetFlowError::config_error(
            "output directory cannot be empty",
            None,
        ));
    }

    if same_dir(root, &config.output_dir) {
        return Err(AssetFlowError::config_error(
            "output directory cannot be the source directory",
            Some(config.output_dir.clone()),
        ));
    }

    if config.output_dir.exists() && !config.output_dir.is_dir() {
        return Err(AssetFlowError::config_error(
            format!(
                "output path is not a directory: {}",
                config.output_dir.display()
            ),
            Some(config.output_dir.clone()),
        ));
    }

    Ok(())
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
