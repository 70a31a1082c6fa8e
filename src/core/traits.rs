//! # Core Traits Module
//!
//! The two seams of the AssetFlow build:
//!
//! - [`Processor`]: turns one piece of content into another (Markdown into
//!   HTML, for instance)
//! - [`BuildStage`]: one named step of the build pipeline, run in
//!   [`Phase`] order with an explicit [`BuildContext`]

use std::fmt;

use serde::Serialize;

use crate::core::error::Result;
use crate::pipeline::BuildContext;

/// Core trait for implementing content processors.
///
/// # Type Parameters
///
/// * `Input`: The type of content being processed
/// * `Output`: The type of content produced
pub trait Processor: Send + Sync + fmt::Debug {
    /// The type of input content for the processor.
    type Input;
    /// The type of output content produced by the processor.
    type Output;

    /// Processes the input content.
    ///
    /// # Returns
    ///
    /// A `Result` containing either the processed content or an error.
    fn process(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Lifecycle phase a [`BuildStage`] belongs to.
///
/// Phases run in declaration order; stages inside one phase keep the order
/// they were added in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Runs before any output is written.
    BeforeBuild,
    /// Writes the output tree.
    Generate,
    /// Runs after the output tree is complete.
    AfterBuild,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::BeforeBuild => "before-build",
            Phase::Generate => "generate",
            Phase::AfterBuild => "after-build",
        })
    }
}

/// One named step of the build.
///
/// A stage receives the context produced by the previous stage and returns
/// the context for the next one. Returning an error aborts the build.
pub trait BuildStage: fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Lifecycle phase of this stage.
    fn phase(&self) -> Phase;

    /// Runs the stage.
    fn run(&self, context: BuildContext) -> Result<BuildContext>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        let mut phases =
            vec![Phase::AfterBuild, Phase::BeforeBuild, Phase::Generate];
        phases.sort();
        assert_eq!(
            phases,
            vec![Phase::BeforeBuild, Phase::Generate, Phase::AfterBuild]
        );
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::BeforeBuild.to_string(), "before-build");
        assert_eq!(Phase::AfterBuild.to_string(), "after-build");
    }
}
