// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests of the `assetflow` binary.

#![allow(unused_results)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A source tree with one stylesheet, one image and a page linking the
/// stylesheet.
fn site(root: &Path) {
    fs::create_dir_all(root.join("public/css")).unwrap();
    fs::create_dir_all(root.join("public/img")).unwrap();
    fs::write(root.join("public/css/site.css"), "body { margin: 0 }").unwrap();
    fs::write(root.join("public/img/logo.svg"), "<svg/>").unwrap();
    fs::write(
        root.join("index.md"),
        "<link rel=\"stylesheet\" href=\"/public/css/site.css\">\n\n# Welcome (home)\n",
    )
    .unwrap();
}

fn assetflow(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("assetflow").unwrap();
    cmd.current_dir(cwd)
        .env_remove("publicDIR")
        .env_remove("MY_ENVIRONMENT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_slug_command() {
    let temp_dir = TempDir::new().unwrap();
    assetflow(temp_dir.path())
        .args(["slug", "Hello World (demo)"])
        .assert()
        .success()
        .stdout("hello-world-demo\n");
}

#[test]
fn test_production_build_from_environment() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("site");
    site(&root);

    let output = assetflow(temp_dir.path())
        .env("publicDIR", &root)
        .env("MY_ENVIRONMENT", "production")
        .args(["build", "-o", "dist", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let token = report["cache_bust"]["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 8);
    let renamed = format!("site-{}.css", token);
    assert_eq!(report["cache_bust"]["renames"]["site.css"], renamed.as_str());
    assert_eq!(report["pages_rendered"], 1);
    assert_eq!(report["assets_copied"], 2);

    let dist = temp_dir.path().join("dist");
    let css: Vec<_> = fs::read_dir(dist.join("public/css"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(css, vec![renamed.clone()]);

    let html = fs::read_to_string(dist.join("index.html")).unwrap();
    assert!(html.contains(&format!("href=\"/public/css/{}\"", renamed)));
    assert!(html.contains("<h1 id=\"welcome-home\">"));
    assert!(dist.join("public/img/logo.svg").exists());
}

#[test]
fn test_development_build_keeps_names() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("site");
    site(&root);

    assetflow(temp_dir.path())
        .args(["build", "-s"])
        .arg(&root)
        .args(["-o", "dist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Built 1 page(s)"));

    let dist = temp_dir.path().join("dist");
    assert!(dist.join("public/css/site.css").exists());
    let html = fs::read_to_string(dist.join("index.html")).unwrap();
    assert!(html.contains("href=\"/public/css/site.css\""));
}

#[test]
fn test_production_flag_overrides_environment() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("site");
    site(&root);

    assetflow(temp_dir.path())
        .env("publicDIR", &root)
        .env("MY_ENVIRONMENT", "staging")
        .args(["build", "-o", "dist", "--production"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"site\.css -> site-[0-9a-f]{8}\.css").unwrap());

    assert!(!temp_dir.path().join("dist/public/css/site.css").exists());
}

#[test]
fn test_build_fails_without_source() {
    let temp_dir = TempDir::new().unwrap();

    assetflow(temp_dir.path())
        .args(["build", "-s", "missing", "-o", "dist"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    assert!(!temp_dir.path().join("dist").exists());
}

#[test]
fn test_clean_command() {
    let temp_dir = TempDir::new().unwrap();
    let css = temp_dir.path().join("dist/public/css");
    fs::create_dir_all(css.join("maps")).unwrap();
    fs::write(css.join("site-0000aaaa.css"), "old").unwrap();
    fs::write(css.join("maps/site.css.map"), "{}").unwrap();
    fs::write(temp_dir.path().join("dist/index.html"), "<html></html>").unwrap();

    assetflow(temp_dir.path())
        .args(["clean", "-o", "dist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned"));

    assert!(css.is_dir());
    assert_eq!(fs::read_dir(&css).unwrap().count(), 0);
    assert!(temp_dir.path().join("dist/index.html").exists());
}

#[test]
fn test_config_file_sets_output() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("site");
    site(&root);
    fs::write(
        temp_dir.path().join("assetflow.toml"),
        "source_root = \"site\"\noutput_dir = \"build\"\n",
    )
    .unwrap();

    assetflow(temp_dir.path())
        .args(["build", "-c", "assetflow.toml"])
        .assert()
        .success();

    assert!(temp_dir.path().join("build/index.html").exists());
}

#[test]
fn test_unknown_config_key_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("assetflow.toml"), "theme = \"dark\"\n").unwrap();

    assetflow(temp_dir.path())
        .args(["build", "-c", "assetflow.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}
