//! Check command - analyse a JSON-serialized AST and report diagnostics

use anyhow::{Context, Result};
use colored::Colorize;
use kestrel_config::{Config, ReportingMode};
use kestrel_sema::{
    analyze, AnalysisOptions, Diagnostic, FnSig, LintConfig, ReportMode, VersionedProgram,
    AST_VERSION,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Flags of `kestrel check`; `None`/`false` defer to the project config
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    pub file: PathBuf,
    pub imports: Option<PathBuf>,
    pub json: bool,
    pub mode: Option<ReportingMode>,
    pub entry: bool,
    pub compiler_build: bool,
    pub source_name: Option<String>,
}

/// Analyse one file; returns whether it is free of errors
pub fn run(args: &CheckArgs, config: &Config) -> Result<bool> {
    let program = load_program(&args.file)?;
    let imports = match &args.imports {
        Some(path) => load_imports(path)?,
        None => Vec::new(),
    };

    let analysis = &config.project.analysis;
    let mode = args.mode.unwrap_or(analysis.mode);
    let options = AnalysisOptions {
        file: args
            .source_name
            .clone()
            .unwrap_or_else(|| args.file.display().to_string()),
        entry_file: args.entry || config.is_entry_file(&args.file),
        compiler_build: args.compiler_build || analysis.compiler_build,
    };
    let lints = LintConfig {
        unused_bindings: config.project.lints.unused_bindings,
        max_params: config.project.lints.max_params,
        max_complexity: config.project.lints.max_complexity,
    };
    debug!(file = %options.file, %mode, entry = options.entry_file, "checking");

    let (outcome, diagnostics) = analyze(
        &program.program,
        &imports,
        &options,
        report_mode(mode),
        lints,
    );

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&diagnostics).context("Failed to serialize diagnostics")?
        );
    } else {
        print_human(&options.file, &diagnostics);
    }
    Ok(outcome.is_ok())
}

fn report_mode(mode: ReportingMode) -> ReportMode {
    match mode {
        ReportingMode::FirstError => ReportMode::FirstError,
        ReportingMode::CollectAll => ReportMode::CollectAll,
    }
}

fn load_program(path: &Path) -> Result<VersionedProgram> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read AST file: {}", path.display()))?;
    let program = VersionedProgram::from_json(&json)
        .with_context(|| format!("Failed to parse AST JSON: {}", path.display()))?;
    if program.ast_version != AST_VERSION {
        warn!(
            found = program.ast_version,
            expected = AST_VERSION,
            "AST schema version differs"
        );
    }
    Ok(program)
}

fn load_imports(path: &Path) -> Result<Vec<FnSig>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read imports file: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse imported signatures: {}", path.display()))
}

/// Print diagnostics and a summary line
fn print_human(file: &str, diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        println!("{}", diag.to_human_string());
    }

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;
    if errors > 0 {
        println!(
            "{}: {} error(s), {} warning(s)",
            file,
            errors.to_string().red().bold(),
            warnings
        );
    } else if warnings > 0 {
        println!(
            "{}: no errors, {} warning(s)",
            file,
            warnings.to_string().yellow()
        );
    } else {
        println!("{}: {}", file, "no errors found".green());
    }
}
