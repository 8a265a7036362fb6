#![deny(clippy::expect_used)]
//! Closedness checker CLI
//!
//! Checks compilation units exported by a host front-end as JSON.
//!
//! Usage:
//!   dblity Main.json
//!   dblity --config dblity.toml --deny-warnings Main.json Other.json
//!   dblity --json Main.json

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use dblity::config::CONFIG_FILE_NAME;
use dblity::{check_file, CheckReport, CheckerConfig, Severity};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status when every unit is clean.
const EXIT_OK: i32 = 0;
/// Exit status when findings fail the run.
const EXIT_FINDINGS: i32 = 1;
/// Exit status on usage, config or load errors.
const EXIT_USAGE: i32 = 2;

/// Command-line arguments
#[derive(Debug, Default)]
struct Args {
    /// Unit files to check
    inputs: Vec<PathBuf>,
    /// Explicit config file
    config: Option<PathBuf>,
    /// Print reports as JSON
    json: bool,
    /// Fail on warnings as well as errors
    deny_warnings: bool,
    show_help: bool,
    show_version: bool,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Args::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => parsed.show_help = true,
                "-v" | "--version" => parsed.show_version = true,
                "-c" | "--config" => {
                    i += 1;
                    match args.get(i) {
                        Some(path) => parsed.config = Some(PathBuf::from(path)),
                        None => return Err(format!("{} needs a file argument", args[i - 1])),
                    }
                }
                "--json" => parsed.json = true,
                "--deny-warnings" => parsed.deny_warnings = true,
                arg if !arg.starts_with('-') => parsed.inputs.push(PathBuf::from(arg)),
                other => return Err(format!("Unknown option: {}", other)),
            }
            i += 1;
        }

        Ok(parsed)
    }
}

fn print_help() {
    println!(
        r#"dblity v{}

USAGE:
    dblity [OPTIONS] <unit.json>...

OPTIONS:
    -h, --help        Show this help message
    -v, --version     Show version information
    -c, --config      Configuration file (default: ./{} when present)
    --json            Print reports as JSON
    --deny-warnings   Exit with status 1 on warnings, not only on errors

EXIT STATUS:
    0  no failing findings
    1  an error (or, with --deny-warnings, a warning) was reported
    2  usage, configuration or input error
"#,
        VERSION, CONFIG_FILE_NAME
    );
}

fn load_config(explicit: Option<&Path>) -> Result<CheckerConfig, String> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(CONFIG_FILE_NAME);
            if !default.is_file() {
                return Ok(CheckerConfig::default());
            }
            default
        }
    };
    CheckerConfig::load(&path).map_err(|e| e.to_string())
}

fn print_text(report: &CheckReport) {
    for diagnostic in &report.diagnostics {
        println!("{}: {}", report.unit, diagnostic);
    }
    for decl in &report.unreliable {
        println!(
            "{}: note: inferences about declaration {} rely on conflicting annotations",
            report.unit, decl
        );
    }
}

fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Use --help for usage information");
            process::exit(EXIT_USAGE);
        }
    };

    if args.show_help {
        print_help();
        return;
    }

    if args.show_version {
        println!("dblity v{}", VERSION);
        return;
    }

    if args.inputs.is_empty() {
        eprintln!("Error: No input unit provided");
        eprintln!("Use --help for usage information");
        process::exit(EXIT_USAGE);
    }

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {}", message);
            process::exit(EXIT_USAGE);
        }
    };

    let mut reports = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        match check_file(input, &config) {
            Ok(report) => reports.push(report),
            Err(e) => {
                match e.span() {
                    Some(span) => eprintln!("Error: {}: {} (at {})", input.display(), e, span),
                    None => eprintln!("Error: {}: {}", input.display(), e),
                }
                process::exit(EXIT_USAGE);
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: cannot serialize reports: {}", e);
                process::exit(EXIT_USAGE);
            }
        }
    } else {
        for report in &reports {
            print_text(report);
        }
    }

    let threshold = if args.deny_warnings {
        Severity::Warning
    } else {
        Severity::Error
    };
    let failing: usize = reports.iter().map(|r| r.count_at_least(threshold)).sum();
    process::exit(if failing > 0 { EXIT_FINDINGS } else { EXIT_OK });
}
