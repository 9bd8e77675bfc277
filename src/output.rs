use console::Style;

use crate::cases::{CaseResult, CaseStatus};
use crate::mutators::Mutator;
use crate::report::{self, RunReport};

pub fn print_error(msg: &str) {
    let style = Style::new().red().bold();
    eprintln!("{} {}", style.apply_to("✗"), msg);
}

pub fn print_success(msg: &str) {
    let style = Style::new().green().bold();
    println!("{} {}", style.apply_to("✓"), msg);
}

pub fn print_command(argv: &[String]) {
    let dim = Style::new().dim();
    println!("{} {:?}", dim.apply_to("Command:"), argv);
}

/// One result as it comes off the harness. Normal exits get a single status
/// line (skipped when `quiet`); anomalies and failures always get the full
/// report.
pub fn print_case(result: &CaseResult, seed: &str, quiet: bool) {
    let ref_style = Style::new().cyan().bold();
    let label = ref_style.apply_to(format!("#{} {}", result.index, result.mutator));

    match &result.status {
        CaseStatus::Completed(o) if !o.is_anomalous() => {
            if !quiet {
                let dim = Style::new().dim();
                println!(
                    "  {} {} {}",
                    Style::new().green().apply_to("·"),
                    label,
                    dim.apply_to(format!("exit {} in {}ms", o.exit_code, o.duration_ms)),
                );
            }
        }
        CaseStatus::Completed(o) => {
            let style = Style::new().yellow().bold();
            let mut detail = format!("exit code {}", o.exit_code);
            if let Some(signal) = o.signal {
                detail.push_str(&format!(", signal {}", signal));
            }
            if o.timed_out {
                detail.push_str(", timed out");
            }
            if o.input_truncated {
                detail.push_str(", input not fully read");
            }
            println!("{} {} {}", style.apply_to("!"), label, detail);

            println!("Program input:");
            println!("{}", result.input);
            if result.input != seed {
                let dim = Style::new().dim();
                println!("{} {}", dim.apply_to("Diff from seed:"), report::input_diff(seed, &result.input));
            }
            println!("Program output:");
            println!("{}\n\n", report::indent(&o.output));
        }
        CaseStatus::LaunchFailed(e) | CaseStatus::IoFailed(e) => {
            print_error(&format!("{} {}", label, e));
        }
    }
}

pub fn print_summary(report: &RunReport) {
    let secs = report.duration_ms as f64 / 1000.0;

    if report.anomalous == 0 && report.failures() == 0 {
        print_success(&format!(
            "{} inputs, no anomalies in {:.1}s",
            report.total, secs,
        ));
        return;
    }

    let style = Style::new().yellow().bold();
    println!(
        "{} {} inputs, {} anomalous in {:.1}s",
        style.apply_to("!"),
        report.total,
        report.anomalous,
        secs,
    );
    if report.failures() > 0 {
        let dim = Style::new().dim();
        println!(
            "  {} {} could not be run ({} launch, {} i/o)",
            dim.apply_to("·"),
            report.failures(),
            report.launch_failed,
            report.io_failed,
        );
    }
}

pub fn print_catalog(catalog: &[Mutator]) {
    let ref_style = Style::new().cyan();
    let dim = Style::new().dim();
    for (i, m) in catalog.iter().enumerate() {
        println!(
            "  {} {} {}",
            ref_style.apply_to(format!("{:>2}", i + 1)),
            m.name,
            dim.apply_to(format!("{:?}", m.transform)),
        );
    }
}
