//! Command-line driver for the FX front end.

use clap::{Parser as ClapParser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(ClapParser)]
#[command(name = "fxc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ReShade FX front end - lex, parse, and fold .fx effect sources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and constant-fold a .fx file, reporting diagnostics
    Check {
        /// Input .fx source file
        input: PathBuf,

        /// Spec-constant override in NAME=VALUE form (bool/int/uint/float inferred from VALUE)
        #[arg(long = "define", value_name = "NAME=VALUE")]
        defines: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { input, defines } => run_check(&input, &defines),
    }
}

fn run_check(input: &PathBuf, defines: &[String]) {
    let source = match std::fs::read_to_string(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error reading {}: {}", input.display(), e);
            process::exit(1);
        }
    };

    let source_name = input.display().to_string();
    let mut config = fxc::CompilerConfig::new(source_name.clone());
    for define in defines {
        match parse_define(define) {
            Ok((name, value)) => config = config.with_spec_constant(name, value),
            Err(msg) => {
                eprintln!("error: {msg}");
                process::exit(1);
            }
        }
    }

    let (module, diagnostics) = fxc::compile_with_config(&source, &config);

    print!("{diagnostics}");

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == fxc::Severity::Error)
        .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == fxc::Severity::Warning)
        .count();
    println!(
        "{}: {} function(s), {} struct(s), {} technique(s) - {} error(s), {} warning(s)",
        source_name,
        module.global_functions.len(),
        module.global_structs.len(),
        module.techniques.len(),
        errors,
        warnings
    );

    if !diagnostics.ok() {
        process::exit(1);
    }
}

fn parse_define(spec: &str) -> Result<(String, fxc::SpecConstantValue), String> {
    let (name, raw) = spec
        .split_once('=')
        .ok_or_else(|| format!("--define {spec} is missing '=' (expected NAME=VALUE)"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("--define {spec} has an empty name"));
    }
    let value = raw.trim();
    let parsed = if value == "true" {
        fxc::SpecConstantValue::Bool(true)
    } else if value == "false" {
        fxc::SpecConstantValue::Bool(false)
    } else if let Some(uint) = value.strip_suffix('u').and_then(|v| v.parse::<u64>().ok()) {
        fxc::SpecConstantValue::Uint(uint)
    } else if let Ok(int) = value.parse::<i64>() {
        fxc::SpecConstantValue::Int(int)
    } else if let Ok(float) = value.parse::<f64>() {
        fxc::SpecConstantValue::Float(float)
    } else {
        return Err(format!("cannot parse value '{value}' in --define {spec}"));
    };
    Ok((name.to_string(), parsed))
}
