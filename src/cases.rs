use serde::{Deserialize, Serialize};

use crate::error::FuzzError;

/// Mutator name recorded for the unmodified seed.
pub const SEED: &str = "seed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub mutator: String,
    pub input: String,
}

/// The seed followed by one derived input per registered mutator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationSet {
    pub cases: Vec<Case>,
}

impl MutationSet {
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn seed(&self) -> Option<&str> {
        self.cases.first().map(|c| c.input.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Case> {
        self.cases.iter()
    }
}

impl<'a> IntoIterator for &'a MutationSet {
    type Item = &'a Case;
    type IntoIter = std::slice::Iter<'a, Case>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub input: String,
    /// `128 + signal` when the process was killed by a signal.
    pub exit_code: i32,
    pub signal: Option<i32>,
    pub timed_out: bool,
    /// The target closed stdin before the whole input was written.
    pub input_truncated: bool,
    /// stdout and stderr, interleaved as written.
    pub output: String,
    pub duration_ms: u64,
}

impl ExecutionOutcome {
    pub fn is_anomalous(&self) -> bool {
        self.exit_code != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStatus {
    Completed(ExecutionOutcome),
    LaunchFailed(String),
    IoFailed(String),
}

impl From<FuzzError> for CaseStatus {
    fn from(e: FuzzError) -> Self {
        match &e {
            FuzzError::Launch { .. } | FuzzError::CommandNotFound { .. } => {
                CaseStatus::LaunchFailed(e.to_string())
            }
            FuzzError::Io { .. } | FuzzError::SeedFile { .. } => CaseStatus::IoFailed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    pub index: usize,
    pub mutator: String,
    pub input: String,
    pub status: CaseStatus,
}

impl CaseResult {
    pub fn is_anomalous(&self) -> bool {
        matches!(&self.status, CaseStatus::Completed(o) if o.is_anomalous())
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self.status, CaseStatus::Completed(_))
    }

    pub fn outcome(&self) -> Option<&ExecutionOutcome> {
        match &self.status {
            CaseStatus::Completed(o) => Some(o),
            _ => None,
        }
    }
}
