use fuzzer::exit_codes;
use fuzzer::output;
use fuzzer::mutators;
use fuzzer::report::{self, RunReport};
use fuzzer::{FuzzError, Harness, Pipeline, Shell, Target};

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fuzzer", version, about = "Feed mutated markup to a program's stdin and report abnormal exits")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every mutator once against the seed and execute the results
    Run {
        /// Command to fuzz (run through the system shell unless --no-shell)
        command: String,
        /// Seed input text
        #[arg(long, conflicts_with = "seed_file")]
        seed_input: Option<String>,
        /// Read the seed input from a file
        #[arg(long)]
        seed_file: Option<PathBuf>,
        /// Seed for the mutators' random generator, for reproducible inputs
        #[arg(long, env = "FUZZER_RNG_SEED")]
        rng_seed: Option<u64>,
        /// Directory the command is resolved against and run in
        #[arg(short = 'C', long, default_value = ".")]
        working_dir: PathBuf,
        /// Kill the target after this many milliseconds (default: wait forever)
        #[arg(long, env = "FUZZER_TIMEOUT_MS")]
        timeout_ms: Option<u64>,
        /// Exec the command directly, splitting it on whitespace
        #[arg(long)]
        no_shell: bool,
        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,
        /// Only report anomalies and failures
        #[arg(short, long)]
        quiet: bool,
        /// Exit with status 1 if any input was anomalous or could not be run
        #[arg(long)]
        fail_on_anomaly: bool,
    },
    /// List the mutators applied by `run`
    Mutators {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Run {
            command,
            seed_input,
            seed_file,
            rng_seed,
            working_dir,
            timeout_ms,
            no_shell,
            json,
            quiet,
            fail_on_anomaly,
        } => {
            let opts = RunOptions {
                rng_seed,
                timeout: timeout_ms.map(Duration::from_millis),
                shell: if no_shell { Shell::Direct } else { Shell::System },
                json,
                quiet,
                fail_on_anomaly,
            };
            cmd_run(command, seed_input, seed_file, working_dir, opts)
        }
        Commands::Mutators { json } => cmd_mutators(json),
    };

    process::exit(exit_code);
}

struct RunOptions {
    rng_seed: Option<u64>,
    timeout: Option<Duration>,
    shell: Shell,
    json: bool,
    quiet: bool,
    fail_on_anomaly: bool,
}

fn cmd_run(
    command: String,
    seed_input: Option<String>,
    seed_file: Option<PathBuf>,
    working_dir: PathBuf,
    opts: RunOptions,
) -> i32 {
    let target = match Target::new(command, working_dir)
        .with_shell(opts.shell)
        .with_timeout(opts.timeout)
        .resolve()
    {
        Ok(t) => t,
        Err(e) => {
            output::print_error(&e.to_string());
            return exit_codes::COMMAND_NOT_FOUND;
        }
    };

    let seed = match (seed_input, seed_file) {
        (Some(s), _) => s,
        (None, Some(path)) => match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(source) => {
                output::print_error(&FuzzError::SeedFile { path, source }.to_string());
                return exit_codes::SEED_UNREADABLE;
            }
        },
        (None, None) => fuzzer::DEFAULT_SEED.to_string(),
    };

    let rng = match opts.rng_seed {
        Some(s) => fastrand::Rng::with_seed(s),
        None => fastrand::Rng::new(),
    };
    let set = Pipeline::with_default_catalog(rng).generate(&seed);

    let harness = Harness::new(target);
    let argv = harness.target().argv();

    let human = !opts.json;
    if human && !opts.quiet {
        output::print_command(&argv);
    }

    let results = harness.run_all_with(&set, |result| {
        if human {
            output::print_case(result, &seed, opts.quiet);
        }
    });

    let report = RunReport::new(argv, &seed, &results);
    if opts.json {
        match serde_json::to_string(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                output::print_error(&format!("Failed to serialize report: {}", e));
                return exit_codes::REPORT_FAILED;
            }
        }
    } else if !opts.quiet || report.anomalous > 0 || report.failures() > 0 {
        output::print_summary(&report);
    }

    if opts.fail_on_anomaly && (report.anomalous > 0 || report.failures() > 0) {
        exit_codes::ANOMALY
    } else {
        exit_codes::SUCCESS
    }
}

fn cmd_mutators(json_mode: bool) -> i32 {
    let catalog = mutators::default_catalog();
    if json_mode {
        match serde_json::to_string(&report::catalog_entries(&catalog)) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                output::print_error(&format!("Failed to serialize catalog: {}", e));
                return exit_codes::REPORT_FAILED;
            }
        }
    } else {
        output::print_catalog(&catalog);
    }
    exit_codes::SUCCESS
}
