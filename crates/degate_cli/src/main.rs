//! degate: recover readable logic from a flattened gate-level netlist.
//!
//! Reads one Verilog module, runs the three cleanup stages with the rules
//! from a JSON or TOML file, and writes the module as it stands after each
//! stage.

#![warn(missing_docs)]

mod clean;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// degate: gate-level netlist cleanup.
#[derive(Parser, Debug)]
#[command(name = "degate", version, about = "Gate-level netlist cleanup")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Control colored output.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// What to clean and where to put it.
    #[command(flatten)]
    pub clean: CleanArgs,
}

/// Input, rules and output locations.
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// The gate-level Verilog netlist.
    #[arg(default_value = "test.v")]
    pub input: PathBuf,

    /// Rule file (`.json`, otherwise TOML). A missing file means no rules.
    #[arg(long, default_value = "cleanup_renames.json")]
    pub rules: PathBuf,

    /// Directory the stage snapshots are written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// File name prefix of the snapshots; the stage number and extension
    /// are appended.
    #[arg(long, default_value = "top_clean_pass")]
    pub prefix: String,

    /// Also write a JSON snapshot of the netlist after each stage.
    #[arg(long)]
    pub json: bool,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to use colored output.
    pub color: bool,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.quiet, cli.verbose);

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    let global = GlobalArgs {
        quiet: cli.quiet,
        color,
    };

    match clean::run(&cli.clean, &global) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// The default log filter for the given flags; `RUST_LOG` takes precedence.
fn log_level(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn init_logging(quiet: bool, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(quiet, verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
