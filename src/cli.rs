// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for AssetFlow
//!
//! This module defines the command structure of the `assetflow` binary and
//! runs the subcommands against the library.
//!
//! # Examples
//!
//! ```
//! use assetflow::cli;
//!
//! let matches = cli::build().get_matches_from(vec![
//!     "assetflow",
//!     "build",
//!     "--output",
//!     "site",
//!     "--production",
//! ]);
//!
//! let build_cmd = matches.subcommand_matches("build").unwrap();
//! assert!(build_cmd.get_flag("production"));
//! ```

use crate::core::config::{ConfigBuilder, Profile};
use crate::core::error::{AssetFlowError, Result};
use crate::pipeline::Pipeline;
use crate::slug::slugify;
use crate::stages::CleanStylesheets;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};
use std::path::PathBuf;

/// The current version of AssetFlow, as defined in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .help("Output directory [default: dist]")
        .value_parser(value_parser!(PathBuf))
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help("TOML configuration file")
        .value_parser(value_parser!(PathBuf))
}

/// Builds and configures the AssetFlow command-line interface.
pub fn build() -> Command {
    debug!("Building CLI command structure");

    Command::new("assetflow")
        .author("AssetFlow Contributors")
        .about("Markdown pages, passthrough assets and stylesheet cache-busting for small static sites.")
        .version(VERSION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Raise the log level to debug (-v) or trace (-vv)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("build")
                .about("Build the site")
                .arg(
                    Arg::new("source")
                        .short('s')
                        .long("source")
                        .help("Source root [default: $publicDIR or .]")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(output_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("production")
                        .long("production")
                        .help("Build with the production profile")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the build report as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("clean")
                .about("Empty the compiled stylesheet directory")
                .arg(output_arg())
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("slug")
                .about("Print the URL slug of a piece of text")
                .arg(
                    Arg::new("text")
                        .help("Text to slugify")
                        .required(true)
                        .value_parser(value_parser!(String)),
                ),
        )
        .after_help(
            "\x1b[1;4mEnvironment:\x1b[0m\n\n  publicDIR        source root\n  \
             MY_ENVIRONMENT   set to `production` to enable cache-busting\n  \
             RUST_LOG         log filter\n\n\
             \x1b[1;4mLicense:\x1b[0m\n  The project is licensed under the terms of \
             both the MIT license and the Apache License (Version 2.0).",
        )
}

/// Executes the subcommand selected in `matches`.
///
/// # Errors
///
/// Returns the first configuration or build error.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("build", sub_matches)) => build_site(sub_matches),
        Some(("clean", sub_matches)) => clean_site(sub_matches),
        Some(("slug", sub_matches)) => {
            let text = sub_matches
                .get_one::<String>("text")
                .ok_or_else(|| AssetFlowError::internal_error("Missing text argument"))?;
            println!("{}", slugify(text));
            Ok(())
        }
        _ => Err(AssetFlowError::internal_error("Unknown command")),
    }
}

/// Layers the config file, the environment and the shared flags.
fn config_builder(matches: &ArgMatches) -> ConfigBuilder {
    let mut builder = ConfigBuilder::new();
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        builder = builder.with_file(path);
    }
    builder = builder.with_env();
    if let Some(output) = matches.get_one::<PathBuf>("output") {
        builder = builder.with_output_dir(output);
    }
    builder
}

fn build_site(matches: &ArgMatches) -> Result<()> {
    let mut builder = config_builder(matches);
    if let Some(source) = matches.get_one::<PathBuf>("source") {
        builder = builder.with_source_root(source);
    }
    if matches.get_flag("production") {
        builder = builder.with_profile(Profile::Production);
    }
    let config = builder.build()?;
    info!(
        "Building {:?} into {:?} ({:?})",
        config.source_root, config.output_dir, config.profile
    );

    let setup = crate::configure(&config)?;
    let report = Pipeline::standard(setup).run(config)?;

    if matches.get_flag("json") {
        let json = serde_json::to_string_pretty(&report).map_err(|e| {
            AssetFlowError::internal_error(format!(
                "Failed to serialise build report: {}",
                e
            ))
        })?;
        println!("{}", json);
    } else {
        println!(
            "Built {} page(s) ({} rendered, {} copied), {} asset(s)",
            report.pages_rendered + report.pages_copied,
            report.pages_rendered,
            report.pages_copied,
            report.assets_copied
        );
        if let Some(renames) = &report.cache_bust {
            for (original, renamed) in renames.iter() {
                println!("  {} -> {}", original, renamed);
            }
        }
    }
    Ok(())
}

fn clean_site(matches: &ArgMatches) -> Result<()> {
    let config = config_builder(matches).build()?;
    let report = Pipeline::new().with_stage(CleanStylesheets).run(config)?;
    if let Some(dir) = report.cleaned {
        println!("Cleaned {}", dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_matches(args: Vec<&str>) -> ArgMatches {
        build().get_matches_from(args)
    }

    #[test]
    fn test_build_command() {
        let matches = get_matches(vec![
            "assetflow",
            "build",
            "--source",
            "site",
            "--output",
            "out",
            "--production",
            "--json",
        ]);
        let build_cmd = matches.subcommand_matches("build").unwrap();

        assert_eq!(
            build_cmd.get_one::<PathBuf>("source").unwrap().as_path(),
            PathBuf::from("site").as_path()
        );
        assert_eq!(
            build_cmd.get_one::<PathBuf>("output").unwrap().as_path(),
            PathBuf::from("out").as_path()
        );
        assert!(build_cmd.get_flag("production"));
        assert!(build_cmd.get_flag("json"));
    }

    #[test]
    fn test_build_defaults() {
        let matches = get_matches(vec!["assetflow", "build"]);
        let build_cmd = matches.subcommand_matches("build").unwrap();

        assert!(build_cmd.get_one::<PathBuf>("source").is_none());
        assert!(build_cmd.get_one::<PathBuf>("output").is_none());
        assert!(!build_cmd.get_flag("production"));
    }

    #[test]
    fn test_clean_command() {
        let matches =
            get_matches(vec!["assetflow", "clean", "-c", "assetflow.toml"]);
        let clean_cmd = matches.subcommand_matches("clean").unwrap();

        assert_eq!(
            clean_cmd.get_one::<PathBuf>("config").unwrap().as_path(),
            PathBuf::from("assetflow.toml").as_path()
        );
    }

    #[test]
    fn test_global_verbosity() {
        let matches = get_matches(vec!["assetflow", "slug", "Hi", "-vv"]);
        assert_eq!(matches.get_count("verbose"), 2);
    }

    #[test]
    fn test_slug_requires_text() {
        assert!(build()
            .try_get_matches_from(vec!["assetflow", "slug"])
            .is_err());
    }
}
