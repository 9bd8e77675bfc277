#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

use fastrand::Rng;
use fuzzer::cases::CaseStatus;
use fuzzer::mutators::{Mutator, Transform};
use fuzzer::{FuzzError, Harness, MutationSet, Pipeline, Shell, Target, DEFAULT_SEED};

fn harness(command: &str) -> Harness {
    Harness::new(Target::new(command, "."))
}

fn full_set() -> MutationSet {
    Pipeline::with_default_catalog(Rng::with_seed(9)).generate(DEFAULT_SEED)
}

// --- run ---

#[test]
fn run_echo_target_returns_input_as_output() {
    let outcome = harness("cat").run(DEFAULT_SEED).unwrap();
    assert_eq!(outcome.exit_code, 0);
    assert!(!outcome.is_anomalous());
    assert_eq!(outcome.output, DEFAULT_SEED);
    assert_eq!(outcome.input, DEFAULT_SEED);
}

#[test]
fn run_nonzero_exit_is_anomalous() {
    let outcome = harness("cat >/dev/null; exit 3").run("x").unwrap();
    assert_eq!(outcome.exit_code, 3);
    assert!(outcome.is_anomalous());
}

#[test]
fn run_combines_stdout_and_stderr() {
    let outcome = harness("echo out; echo err 1>&2; exit 1").run("").unwrap();
    assert!(outcome.output.contains("out"), "stdout missing: {:?}", outcome.output);
    assert!(outcome.output.contains("err"), "stderr missing: {:?}", outcome.output);
}

#[test]
fn run_reports_signal_death() {
    let outcome = harness("kill -SEGV $$").run("").unwrap();
    assert_eq!(outcome.signal, Some(11));
    assert_eq!(outcome.exit_code, 128 + 11);
    assert!(outcome.is_anomalous());
}

#[test]
fn run_target_that_ignores_stdin_still_completes() {
    let big = "a".repeat(1 << 20);
    let outcome = harness("exit 0").run(&big).unwrap();
    assert_eq!(outcome.exit_code, 0);
}

#[test]
fn run_drains_large_output() {
    let outcome = harness("head -c 200000 /dev/zero | tr '\\0' a; cat >/dev/null")
        .run(DEFAULT_SEED)
        .unwrap();
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.output.len(), 200000);
}

#[test]
fn run_uses_working_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("marker"), "found it").unwrap();

    let outcome = Harness::new(Target::new("cat marker", dir.path()))
        .run("")
        .unwrap();
    assert_eq!(outcome.output, "found it");
}

#[test]
fn run_missing_program_is_launch_failure() {
    let target = Target::new("/nonexistent/path/prog_xyz", ".").with_shell(Shell::Direct);
    let err = Harness::new(target).run("x").unwrap_err();
    assert!(matches!(err, FuzzError::Launch { .. }), "got {err:?}");
}

#[test]
fn run_direct_passes_arguments() {
    let target = Target::new("echo hello world", ".").with_shell(Shell::Direct);
    let outcome = Harness::new(target).run("").unwrap();
    assert_eq!(outcome.output, "hello world\n");
}

#[test]
fn run_times_out_hung_target() {
    let target = Target::new("exec sleep 10", ".").with_timeout(Some(Duration::from_millis(100)));
    let outcome = Harness::new(target).run("").unwrap();
    assert!(outcome.timed_out);
    assert!(outcome.is_anomalous());
    assert!(outcome.duration_ms < 5000);
}

#[test]
fn run_timeout_kills_whole_process_tree() {
    let dir = tempfile::TempDir::new().unwrap();
    let target = Target::new("echo early; (sleep 1; touch survived) & wait", dir.path())
        .with_timeout(Some(Duration::from_millis(200)));

    let outcome = Harness::new(target).run("").unwrap();
    assert!(outcome.timed_out);
    assert!(outcome.output.contains("early"), "output lost: {:?}", outcome.output);

    std::thread::sleep(Duration::from_millis(1500));
    assert!(
        !dir.path().join("survived").exists(),
        "a descendant of the timed-out target kept running"
    );
}

#[test]
fn run_without_timeout_waits_for_exit() {
    let outcome = harness("sleep 0.2; exit 0").run("").unwrap();
    assert!(!outcome.timed_out);
    assert_eq!(outcome.exit_code, 0);
}

// --- run_all ---

#[test]
fn run_all_echo_target_has_no_anomalies() {
    let set = full_set();
    let results = harness("cat").run_all(&set);
    assert_eq!(results.len(), set.len());
    assert!(results.iter().all(|r| !r.is_anomalous() && !r.is_failure()));
}

#[test]
fn run_all_always_failing_target_flags_every_input() {
    let set = full_set();
    let results = harness("exit 2").run_all(&set);
    assert_eq!(results.len(), set.len());

    for (result, case) in results.iter().zip(set.iter()) {
        assert!(result.is_anomalous(), "case {} not anomalous", result.index);
        let outcome = result.outcome().unwrap();
        assert_eq!(outcome.exit_code, 2);
        assert_eq!(outcome.input, case.input);
        assert_eq!(result.mutator, case.mutator);
    }
}

#[test]
fn run_all_exit_one_flags_seed_too() {
    let set = full_set();
    let results = harness("exit 1").run_all(&set);
    assert!(results[0].is_anomalous());
    assert_eq!(results[0].input, DEFAULT_SEED);
}

#[test]
fn run_all_continues_after_launch_failures() {
    let set = full_set();
    let target = Target::new("/nonexistent/path/prog_xyz", ".").with_shell(Shell::Direct);
    let results = Harness::new(target).run_all(&set);

    assert_eq!(results.len(), set.len());
    assert!(results.iter().all(|r| matches!(r.status, CaseStatus::LaunchFailed(_))));
    let indices: Vec<_> = results.iter().map(|r| r.index).collect();
    assert_eq!(indices, (0..set.len()).collect::<Vec<_>>());
}

#[test]
fn run_all_executes_each_input_once_in_order() {
    let set = full_set();
    let results = harness("cat").run_all(&set);
    for (result, case) in results.iter().zip(set.iter()) {
        assert_eq!(result.input, case.input);
        assert_eq!(result.outcome().unwrap().output, case.input);
    }
}

#[test]
fn run_all_with_streams_every_result() {
    let set = full_set();
    let mut seen = Vec::new();
    let results = harness("true").run_all_with(&set, |r| seen.push(r.index));
    assert_eq!(seen.len(), results.len());
    assert_eq!(seen, (0..set.len()).collect::<Vec<_>>());
}

#[test]
fn run_all_mixes_failures_and_outcomes() {
    let dir = tempfile::TempDir::new().unwrap();
    let script = dir.path().join("late.sh");
    let target = Target::new(script.to_string_lossy(), dir.path()).with_shell(Shell::Direct);

    let catalog = vec![
        Mutator::new("nest", Transform::Nest { depth: 2 }),
        Mutator::new("dup", Transform::DuplicateTags),
    ];
    let set = Pipeline::new(Rng::with_seed(1), catalog).generate("<ab>");

    // The script only appears after the first case, so case 0 cannot launch.
    let results = Harness::new(target).run_all_with(&set, |r| {
        if r.index == 0 {
            std::fs::write(&script, "#!/bin/sh\nif grep -q div; then exit 3; fi\nexit 0\n").unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    });

    assert_eq!(results.len(), 3);
    assert!(matches!(results[0].status, CaseStatus::LaunchFailed(_)), "{:?}", results[0].status);
    assert!(results[1].is_anomalous());
    assert_eq!(results[1].outcome().unwrap().exit_code, 3);
    assert!(!results[2].is_anomalous());
    assert_eq!(results[2].outcome().unwrap().exit_code, 0);
    assert_eq!(results[2].input, "<ab><ab>");
}

// --- error mapping ---

#[test]
fn io_error_becomes_io_failed_status() {
    let err = FuzzError::Io {
        stage: "writing stdin",
        source: std::io::Error::other("device gone"),
    };
    match CaseStatus::from(err) {
        CaseStatus::IoFailed(msg) => {
            assert!(msg.contains("writing stdin"));
            assert!(msg.contains("device gone"));
        }
        other => panic!("expected IoFailed, got {other:?}"),
    }
}

#[test]
fn launch_error_becomes_launch_failed_status() {
    let err = FuzzError::Launch {
        command: "./parser".into(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    };
    assert!(matches!(CaseStatus::from(err), CaseStatus::LaunchFailed(_)));
}
