//! subiq CLI - Convert radio pulse-timing captures into SDR I/Q streams
//!
//! This binary converts Flipper `.sub` captures (and sampled `.wav`, `.iq`
//! and `.bin` recordings) into `.c16` streams with a metadata sidecar.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use subiq_cli::commands::{self, convert::ConvertOptions};
use subiq_cli::logging::init_logging;
use subiq_cli::output::OutputLocation;
use subiq_core::{ParamOverrides, Protocol};

/// subiq - pulse-timing capture to I/Q converter
#[derive(Parser)]
#[command(name = "subiq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Synthesis parameter flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
struct SynthesisArgs {
    /// Output sample rate in Hz
    #[arg(short = 'r', long)]
    sample_rate: Option<u32>,

    /// Intermediate (carrier) frequency in Hz, may be negative
    #[arg(short = 'f', long, allow_hyphen_values = true)]
    intermediate_freq: Option<f64>,

    /// Peak amplitude as a fraction of full scale, in (0, 1]
    #[arg(short, long)]
    amplitude: Option<f64>,

    /// Derive unset parameters from the capture
    #[arg(long)]
    auto: bool,

    /// Protocol to assume instead of the capture header
    #[arg(short, long, value_parser = ["raw", "binraw"], ignore_case = true)]
    protocol: Option<String>,
}

impl SynthesisArgs {
    fn overrides(&self) -> ParamOverrides {
        ParamOverrides {
            sample_rate: self.sample_rate,
            intermediate_freq: self.intermediate_freq,
            amplitude: self.amplitude,
            auto: self.auto,
        }
    }

    fn protocol(&self) -> Option<Protocol> {
        self.protocol.as_deref().and_then(Protocol::from_header)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert captures or directories of captures to .c16 + .txt
    Convert {
        /// Input files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output base name for a single file (`.c16`/`.txt` appended), or
        /// output directory for several inputs (default: next to each input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Descend into subdirectories
        #[arg(short = 'R', long)]
        recursive: bool,

        #[command(flatten)]
        synthesis: SynthesisArgs,

        /// Output a machine-readable JSON summary (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Show what a conversion would produce without writing anything
    Inspect {
        /// Input file
        input: PathBuf,

        #[command(flatten)]
        synthesis: SynthesisArgs,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            inputs,
            output,
            recursive,
            synthesis,
            json,
        } => {
            let options = ConvertOptions {
                output: OutputLocation::from_arg(output, &inputs),
                overrides: synthesis.overrides(),
                protocol: synthesis.protocol(),
                recursive,
                json,
            };
            commands::convert::run(&inputs, &options)
        }
        Commands::Inspect {
            input,
            synthesis,
            json,
        } => commands::inspect::run(
            &input,
            &synthesis.overrides(),
            synthesis.protocol(),
            json,
        ),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
