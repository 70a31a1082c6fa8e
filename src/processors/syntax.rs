//! Syntax highlighting for fenced code blocks.

use crate::core::error::{AssetFlowError, Result};
use log::debug;
use syntect::{
    highlighting::ThemeSet, html::highlighted_html_for_string,
    parsing::SyntaxSet,
};

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Syntax highlighter backed by syntect's bundled syntaxes and themes.
#[derive(Debug)]
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: String,
}

impl SyntaxHighlighter {
    /// Creates a highlighter using `theme`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `theme` is not one of the bundled
    /// themes.
    pub fn new(theme: &str) -> Result<Self> {
        let theme_set = ThemeSet::load_defaults();
        if !theme_set.themes.contains_key(theme) {
            let known: Vec<&str> =
                theme_set.themes.keys().map(String::as_str).collect();
            return Err(AssetFlowError::config_error(
                format!(
                    "unknown highlighting theme `{}` (available: {})",
                    theme,
                    known.join(", ")
                ),
                None,
            ));
        }

        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme: theme.to_string(),
        })
    }

    /// Name of the active theme.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Highlights `code` written in `lang`.
    ///
    /// Unknown or missing languages produce an escaped
    /// `<pre><code class="language-…">` block instead.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let syntax =
            lang.and_then(|l| self.syntax_set.find_syntax_by_token(l));
        let theme = self.theme_set.themes.get(&self.theme);

        match (syntax, theme) {
            (Some(syntax), Some(theme)) => {
                match highlighted_html_for_string(
                    code,
                    &self.syntax_set,
                    syntax,
                    theme,
                ) {
                    Ok(html) => html,
                    Err(e) => {
                        debug!("Highlighting failed, using plain block: {}", e);
                        plain_block(code, lang)
                    }
                }
            }
            _ => plain_block(code, lang),
        }
    }
}

fn plain_block(code: &str, lang: Option<&str>) -> String {
    let class = lang
        .filter(|l| !l.is_empty())
        .map(|l| format!(" class=\"language-{}\"", escape_html(l)))
        .unwrap_or_default();
    format!("<pre><code{}>{}</code></pre>\n", class, escape_html(code))
}

/// Escapes the five HTML special characters.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_rust() {
        let highlighter = SyntaxHighlighter::new(DEFAULT_THEME).unwrap();
        let html = highlighter
            .highlight("fn main() {\n    println!(\"Hello\");\n}\n", Some("rust"));
        assert!(html.starts_with("<pre"));
        assert!(html.contains("<span"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let highlighter = SyntaxHighlighter::new(DEFAULT_THEME).unwrap();
        let html = highlighter.highlight("a < b", Some("no-such-lang"));
        assert_eq!(
            html,
            "<pre><code class=\"language-no-such-lang\">a &lt; b</code></pre>\n"
        );
    }

    #[test]
    fn test_no_language() {
        let highlighter = SyntaxHighlighter::new(DEFAULT_THEME).unwrap();
        let html = highlighter.highlight("plain", None);
        assert_eq!(html, "<pre><code>plain</code></pre>\n");
    }

    #[test]
    fn test_unknown_theme_is_config_error() {
        let err = SyntaxHighlighter::new("no-such-theme").unwrap_err();
        assert!(matches!(err, AssetFlowError::ConfigError { .. }));
        assert!(err.to_string().contains(DEFAULT_THEME));
    }

    #[test]
    fn test_default_theme_loads() {
        let highlighter = SyntaxHighlighter::new(DEFAULT_THEME).unwrap();
        assert_eq!(highlighter.theme(), DEFAULT_THEME);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }
}
