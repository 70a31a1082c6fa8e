// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Stylesheet Cache-Busting
//!
//! Renames compiled stylesheets with a random suffix and points the root
//! HTML document at the new names, so browsers fetch fresh copies after
//! each release.
//!
//! The work is split into two pure steps that share one [`RenameMap`]:
//!
//! - [`plan_renames`] decides the new name of every stylesheet;
//! - [`rewrite_stylesheet_links`] inserts the map's token into every local
//!   stylesheet `<link>` href.
//!
//! [`bust_stylesheets`] composes them with the file-system calls.
//!
//! ```
//! use assetflow::cache_bust::{plan_renames, rewrite_stylesheet_links, CacheToken};
//!
//! let token = CacheToken::new("0badf00d").unwrap();
//! let map = plan_renames(["site.css", "logo.svg"], &token);
//! assert_eq!(map.get("site.css"), Some("site-0badf00d.css"));
//! assert_eq!(map.len(), 1);
//!
//! let html = r#"<link rel="stylesheet" href="/public/css/site.css">"#;
//! let rewritten = rewrite_stylesheet_links(html, &map).unwrap();
//! assert_eq!(rewritten, r#"<link rel="stylesheet" href="/public/css/site-0badf00d.css">"#);
//! ```

use crate::core::error::{AssetFlowError, Result};
use log::{debug, info};
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Extension of the files that get renamed.
const STYLESHEET_EXTENSION: &str = ".css";

/// Hrefs starting with this prefix point off-site and are never rewritten.
const EXTERNAL_PREFIX: &str = "https";

/// Length of a [`CacheToken`].
pub const TOKEN_LEN: usize = 8;

/// A pattern compiled on first use, keeping any compile error for the
/// caller to report.
type Pattern = LazyLock<std::result::Result<Regex, regex::Error>>;

/// Matches a whole `<link ...>` tag.
static LINK_TAG: Pattern = LazyLock::new(|| Regex::new(r"(?i)<link\b[^>]*>"));

/// Matches a quoted `href` attribute inside a tag.
static HREF: Pattern = LazyLock::new(|| {
    Regex::new(r#"(?i)(\bhref\s*=\s*)(?:"([^"]*)"|'([^']*)')"#)
});

/// Random suffix shared by every rename and rewrite of one run.
///
/// Always eight lowercase hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CacheToken(String);

impl CacheToken {
    /// Draws a fresh random token.
    pub fn generate() -> Self {
        let value: u32 = rand::random();
        CacheToken(format!("{:08x}", value))
    }

    /// Wraps an existing token after checking its shape.
    ///
    /// # Errors
    ///
    /// Returns [`AssetFlowError::InvalidToken`] unless `value` is exactly
    /// eight characters from `0-9a-f`.
    pub fn new<S: Into<String>>(value: S) -> Result<Self> {
        let value = value.into();
        let valid = value.len() == TOKEN_LEN
            && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if valid {
            Ok(CacheToken(value))
        } else {
            Err(AssetFlowError::InvalidToken(value))
        }
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Inserts `-<token>` in front of the `.css` extension.
    fn apply(&self, name: &str) -> Option<String> {
        name.strip_suffix(STYLESHEET_EXTENSION)
            .map(|stem| format!("{}-{}{}", stem, self.0, STYLESHEET_EXTENSION))
    }
}

impl fmt::Display for CacheToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Old-name to new-name mapping produced by one cache-busting run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameMap {
    token: CacheToken,
    renames: BTreeMap<String, String>,
}

impl RenameMap {
    /// The token every new name carries.
    pub fn token(&self) -> &CacheToken {
        &self.token
    }

    /// The new name for `original`, if it is renamed.
    pub fn get(&self, original: &str) -> Option<&str> {
        self.renames.get(original).map(String::as_str)
    }

    /// Number of renamed files.
    pub fn len(&self) -> usize {
        self.renames.len()
    }

    /// Returns `true` when nothing is renamed.
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    /// Iterates `(old, new)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.renames.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Computes the new name of every stylesheet in `names`.
///
/// Only names ending in `.css` are included; `site.css` becomes
/// `site-<token>.css`.
pub fn plan_renames<I, S>(names: I, token: &CacheToken) -> RenameMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let renames = names
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref();
            token.apply(name).map(|new| (name.to_string(), new))
        })
        .collect();

    RenameMap {
        token: token.clone(),
        renames,
    }
}

/// Rewrites stylesheet hrefs in `html` with the token of `map`.
///
/// Only quoted `href` attributes inside `<link>` tags are considered. Every
/// href that does not start with `https` and ends in `.css` gets
/// `-<token>` inserted before the extension, mirroring the renames; the
/// directory part and the quote style are kept. Everything else passes
/// through unchanged.
pub fn rewrite_stylesheet_links(html: &str, map: &RenameMap) -> Result<String> {
    let link_tag = compiled(&LINK_TAG)?;
    let href = compiled(&HREF)?;

    let rewritten = link_tag.replace_all(html, |tag: &Captures<'_>| {
        href.replace_all(&tag[0], |attr: &Captures<'_>| {
            rewrite_href(attr, map.token())
        })
        .into_owned()
    });

    Ok(rewritten.into_owned())
}

fn rewrite_href(attr: &Captures<'_>, token: &CacheToken) -> String {
    let (value, quote) = match (attr.get(2), attr.get(3)) {
        (Some(value), _) => (value.as_str(), '"'),
        (None, Some(value)) => (value.as_str(), '\''),
        (None, None) => return attr[0].to_string(),
    };

    let replacement = if value.starts_with(EXTERNAL_PREFIX) {
        None
    } else {
        token.apply(value)
    };
    format!(
        "{}{}{}{}",
        &attr[1],
        quote,
        replacement.as_deref().unwrap_or(value),
        quote
    )
}

fn compiled(pattern: &'static Pattern) -> Result<&'static Regex> {
    LazyLock::force(pattern).as_ref().map_err(|e| {
        AssetFlowError::internal_error(format!("invalid pattern: {}", e))
    })
}

/// Renames every stylesheet in `stylesheet_dir` and rewrites `index_html`
/// to match.
///
/// Steps run in order: list the directory, plan the renames with `token`,
/// rename the files, then read, rewrite and overwrite `index_html`.
///
/// # Errors
///
/// A missing stylesheet directory, a missing `index_html`, or any failed
/// rename, read or write is returned as an IO error. Renames that already
/// happened are not rolled back.
pub fn bust_stylesheets(
    stylesheet_dir: &Path,
    index_html: &Path,
    token: &CacheToken,
) -> Result<RenameMap> {
    let mut names = Vec::new();
    let entries = fs::read_dir(stylesheet_dir).map_err(|e| {
        AssetFlowError::io_error(stylesheet_dir.to_path_buf(), e)
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| {
            AssetFlowError::io_error(stylesheet_dir.to_path_buf(), e)
        })?;
        let file_type = entry
            .file_type()
            .map_err(|e| AssetFlowError::io_error(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => debug!("Skipping non UTF-8 file name {:?}", name),
        }
    }

    let map = plan_renames(&names, token);

    for (old, new) in map.iter() {
        let from = stylesheet_dir.join(old);
        let to = stylesheet_dir.join(new);
        fs::rename(&from, &to)
            .map_err(|e| AssetFlowError::io_error(from.clone(), e))?;
        debug!("Renamed {:?} -> {:?}", from, to);
    }

    let html = fs::read_to_string(index_html)
        .map_err(|e| AssetFlowError::io_error(index_html.to_path_buf(), e))?;
    let rewritten = rewrite_stylesheet_links(&html, &map)?;
    fs::write(index_html, rewritten)
        .map_err(|e| AssetFlowError::io_error(index_html.to_path_buf(), e))?;

    info!(
        "Cache-busted {} stylesheet(s) with token {}",
        map.len(),
        map.token()
    );
    Ok(map)
}
