// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Heading-anchor slugs.
//!
//! ```
//! use assetflow::slug::slugify;
//!
//! assert_eq!(slugify("Hello World (demo)"), "hello-world-demo");
//! assert_eq!(slugify("Café au lait"), "caf%C3%A9-au-lait");
//! ```

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left literal in a fragment, the same set JavaScript's
/// `encodeURIComponent` leaves alone.
const FRAGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Whitespace as JavaScript's `trim` and `\s` see it: Unicode `White_Space`
/// without NEL (U+0085), plus the byte-order mark (U+FEFF).
fn is_js_whitespace(c: char) -> bool {
    c == '\u{feff}' || (c != '\u{85}' && c.is_whitespace())
}

/// Maps heading text to a URL-safe fragment identifier.
///
/// The text is trimmed and lowercased, parentheses are dropped, every run of
/// whitespace becomes a single `-`, and the result is percent-encoded.
/// Empty or whitespace-only input yields an empty string. Uniqueness within
/// a document is up to the caller.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim_matches(is_js_whitespace).to_lowercase();
    let stripped: String =
        lowered.chars().filter(|c| !matches!(c, '(' | ')')).collect();

    let mut joined = String::with_capacity(stripped.len());
    let mut in_whitespace = false;
    for c in stripped.chars() {
        if is_js_whitespace(c) {
            if !in_whitespace {
                joined.push('-');
            }
            in_whitespace = true;
        } else {
            joined.push(c);
            in_whitespace = false;
        }
    }

    utf8_percent_encode(&joined, FRAGMENT_ENCODE_SET).to_string()
}
