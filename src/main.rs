// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # AssetFlow CLI
//!
//! This is the main entry point for the AssetFlow command-line interface.
//! It parses the arguments, initialises the logger and runs the selected
//! subcommand.

use anyhow::Context;
use assetflow::cli;
use env_logger::Env;
use log::info;

/// Maps the `-v` count to the default log filter.
fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Runs the subcommand, attaching context to library errors.
fn run() -> Result<(), anyhow::Error> {
    let matches = cli::build().get_matches();

    env_logger::Builder::from_env(
        Env::default().default_filter_or(default_filter(matches.get_count("verbose"))),
    )
    .init();
    info!("Starting AssetFlow v{}", cli::VERSION);

    let command = matches.subcommand_name().unwrap_or("assetflow").to_string();
    cli::execute(&matches).with_context(|| format!("`{}` failed", command))?;

    info!("AssetFlow completed successfully");
    Ok(())
}

/// The main entry point for the AssetFlow CLI.
fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
