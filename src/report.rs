use serde::{Deserialize, Serialize};

use crate::cases::{CaseResult, CaseStatus};
use crate::mutators::Mutator;

#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub command: Vec<String>,
    pub seed: String,
    pub total: usize,
    pub anomalous: usize,
    pub launch_failed: usize,
    pub io_failed: usize,
    pub duration_ms: u64,
    pub cases: Vec<CaseReport>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaseReport {
    pub index: usize,
    pub mutator: String,
    pub input: String,
    /// One of `ok`, `anomalous`, `launch_failed`, `io_failed`.
    pub status: String,
    pub anomalous: bool,
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
    pub timed_out: bool,
    pub input_truncated: bool,
    pub output: Option<String>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new(command: Vec<String>, seed: &str, results: &[CaseResult]) -> Self {
        let cases: Vec<CaseReport> = results.iter().map(CaseReport::from).collect();
        let count = |status: &str| cases.iter().filter(|c| c.status == status).count();

        RunReport {
            command,
            seed: seed.to_string(),
            total: cases.len(),
            anomalous: count("anomalous"),
            launch_failed: count("launch_failed"),
            io_failed: count("io_failed"),
            duration_ms: cases.iter().map(|c| c.duration_ms).sum(),
            cases,
        }
    }

    pub fn failures(&self) -> usize {
        self.launch_failed + self.io_failed
    }
}

impl From<&CaseResult> for CaseReport {
    fn from(r: &CaseResult) -> Self {
        let mut report = CaseReport {
            index: r.index,
            mutator: r.mutator.clone(),
            input: r.input.clone(),
            status: String::new(),
            anomalous: r.is_anomalous(),
            exit_code: None,
            signal: None,
            timed_out: false,
            input_truncated: false,
            output: None,
            error: None,
            duration_ms: 0,
        };

        match &r.status {
            CaseStatus::Completed(o) => {
                report.status = if o.is_anomalous() { "anomalous" } else { "ok" }.to_string();
                report.exit_code = Some(o.exit_code);
                report.signal = o.signal;
                report.timed_out = o.timed_out;
                report.input_truncated = o.input_truncated;
                report.output = Some(o.output.clone());
                report.duration_ms = o.duration_ms;
            }
            CaseStatus::LaunchFailed(e) => {
                report.status = "launch_failed".to_string();
                report.error = Some(e.clone());
            }
            CaseStatus::IoFailed(e) => {
                report.status = "io_failed".to_string();
                report.error = Some(e.clone());
            }
        }

        report
    }
}

/// One row of `fuzzer mutators --json`. `index` matches the case index the
/// mutator's input gets in a run; the seed is case 0.
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub index: usize,
    pub name: String,
}

pub fn catalog_entries(catalog: &[Mutator]) -> Vec<CatalogEntry> {
    catalog
        .iter()
        .enumerate()
        .map(|(i, m)| CatalogEntry {
            index: i + 1,
            name: m.name.to_string(),
        })
        .collect()
}

/// Trims `output` and prefixes every line with four spaces.
pub fn indent(output: &str) -> String {
    output
        .trim()
        .lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inline char diff of a derived input against the seed: removed text as
/// `[-..-]`, added text as `{+..+}`. Control characters are escaped.
pub fn input_diff(seed: &str, input: &str) -> String {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_chars(seed, input);
    let mut out = String::new();
    let mut open: Option<ChangeTag> = None;

    for change in diff.iter_all_changes() {
        let tag = change.tag();
        if open != Some(tag) {
            close(&mut out, open);
            match tag {
                ChangeTag::Delete => out.push_str("[-"),
                ChangeTag::Insert => out.push_str("{+"),
                ChangeTag::Equal => {}
            }
            open = Some(tag);
        }
        for c in change.value().chars() {
            if c.is_control() {
                out.extend(c.escape_default());
            } else {
                out.push(c);
            }
        }
    }
    close(&mut out, open);
    out
}

fn close(out: &mut String, tag: Option<similar::ChangeTag>) {
    match tag {
        Some(similar::ChangeTag::Delete) => out.push_str("-]"),
        Some(similar::ChangeTag::Insert) => out.push_str("+}"),
        _ => {}
    }
}
