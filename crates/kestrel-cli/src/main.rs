use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use kestrel_config::{ConfigLoader, ReportingMode};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

/// Kestrel semantic analyser.
///
/// Type-checks a Kestrel program handed over as a JSON-serialized AST and
/// reports diagnostics with stable codes.
///
/// EXAMPLES:
///     kestrel check main.ast.json                   Check one file
///     kestrel check main.ast.json --json            Diagnostics as JSON
///     kestrel check lib.ast.json --mode collect-all Report every error
///     kestrel codes                                 List diagnostic codes
///
/// ENVIRONMENT VARIABLES:
///     KESTREL_LOG             Tracing filter (e.g. 'kestrel_sema=debug')
///     KESTREL_JSON            Set to 'true' for JSON output by default
///     KESTREL_MODE            Overrides [analysis] mode from kestrel.toml
///     KESTREL_MAX_PARAMS      Overrides [lints] max-params
///     KESTREL_MAX_COMPLEXITY  Overrides [lints] max-complexity
#[derive(Parser)]
#[command(name = "kestrel")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose logging (repeat for trace output)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// `--mode` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    FirstError,
    CollectAll,
}

impl From<ModeArg> for ReportingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::FirstError => ReportingMode::FirstError,
            ModeArg::CollectAll => ReportingMode::CollectAll,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Type-check a JSON-serialized AST
    ///
    /// Exits with status 1 when any error is reported. Warnings alone
    /// never fail the check.
    ///
    /// EXAMPLES:
    ///     kestrel check main.ast.json
    ///     kestrel check util.ast.json --imports sigs.json --mode collect-all
    #[command(visible_alias = "c")]
    Check {
        /// Path to the AST JSON file
        file: PathBuf,
        /// JSON file with imported function signatures
        #[arg(long)]
        imports: Option<PathBuf>,
        /// Output diagnostics in JSON format
        #[arg(long, env = "KESTREL_JSON")]
        json: bool,
        /// Stop at the first error or report everything
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Treat the file as the entry file (module-level lints apply)
        #[arg(long)]
        entry: bool,
        /// Make the host intrinsics visible
        #[arg(long)]
        compiler_build: bool,
        /// File name shown in diagnostics (default: the AST path)
        #[arg(long)]
        source_name: Option<String>,
    },

    /// List every diagnostic code with its level and description
    Codes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     kestrel completions bash > kestrel.bash
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "kestrel_sema=debug,kestrel=debug",
        _ => "kestrel_sema=trace,kestrel=trace",
    };
    let filter =
        EnvFilter::try_from_env("KESTREL_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    // stderr keeps JSON on stdout parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            file,
            imports,
            json,
            mode,
            entry,
            compiler_build,
            source_name,
        } => {
            let config = ConfigLoader::new().load_from_directory(&std::env::current_dir()?)?;
            let args = commands::check::CheckArgs {
                file,
                imports,
                json,
                mode: mode.map(ReportingMode::from),
                entry,
                compiler_build,
                source_name,
            };
            let clean = commands::check::run(&args, &config)?;
            Ok(if clean {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Codes { json } => {
            commands::codes::run(json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "kestrel", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}
