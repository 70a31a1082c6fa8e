// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build script that refuses toolchains older than the declared
//! `rust-version`.

use std::process;

/// Minimum supported Rust version, kept in sync with `Cargo.toml`.
const MIN_VERSION: &str = "1.80.0";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    match version_check::is_min_version(MIN_VERSION) {
        Some(true) => {}
        Some(false) => {
            eprintln!(
                "AssetFlow requires Rust {} or newer. Please update your toolchain.",
                MIN_VERSION
            );
            process::exit(1);
        }
        None => {
            println!("cargo:warning=Unable to determine the rustc version");
        }
    }
}
