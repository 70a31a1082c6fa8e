//! # Content Processors Module
//!
//! Processors that turn page sources into HTML. Each one implements the
//! [`Processor`](crate::core::traits::Processor) trait.
//!
//! ## Available Processors
//!
//! - [`markdown`]: renders Markdown with raw HTML, automatic links,
//!   typographic substitutions and heading anchors
//! - [`syntax`]: syntect-based highlighting for fenced code blocks
//!
//! ## Usage
//!
//! ```rust
//! use assetflow::core::traits::Processor;
//! use assetflow::processors::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new().with_heading_anchors(true);
//! let html = renderer.process("# Hello World".to_string()).unwrap();
//! assert_eq!(html, "<h1 id=\"hello-world\">Hello World</h1>\n");
//! ```

/// Markdown rendering.
pub mod markdown;

/// Code block highlighting.
pub mod syntax;

pub use markdown::MarkdownRenderer;
pub use syntax::SyntaxHighlighter;
