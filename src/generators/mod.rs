//! # Output Generators
//!
//! Writers for the generated site.
//!
//! - [`pages`]: renders Markdown pages and copies HTML pages into the
//!   output directory

/// Content page generation.
pub mod pages;

pub use pages::{PageCounts, PageGenerator};
