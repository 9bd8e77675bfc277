pub mod cases;
pub mod error;
pub mod exit_codes;
pub mod harness;
pub mod mutators;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod target;

pub use cases::{Case, CaseResult, CaseStatus, ExecutionOutcome, MutationSet};
pub use error::FuzzError;
pub use harness::Harness;
pub use pipeline::Pipeline;
pub use target::{Shell, Target};

/// The seed used when none is given on the command line.
pub const DEFAULT_SEED: &str = "<tag attribute=\"value\">content</tag>";
