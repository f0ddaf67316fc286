// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use protolens::Schema;
use protolens_gen::codegen::emit_module;
use protolens_gen::GenConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "protolens-gen")]
#[command(about = "Generate protolens message types and lenses from .proto schemas")]
#[command(version)]
struct Cli {
    /// Log filter when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit Rust source for every message and enum in the schema
    Generate {
        /// Input .proto file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output .rs file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Generator configuration (YAML)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Module name for the field lens markers
        #[arg(long)]
        fields_module: Option<String>,

        /// Extra derive for generated structs (repeatable)
        #[arg(long = "derive", value_name = "PATH")]
        derives: Vec<String>,
    },

    /// Print the parsed descriptors as JSON
    Describe {
        /// Input .proto file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Validate a schema without generating anything
    Check {
        /// Input .proto file(s)
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            input,
            output,
            config,
            fields_module,
            derives,
        } => cmd_generate(&input, output.as_deref(), config.as_deref(), fields_module, &derives),
        Commands::Describe { input, compact } => cmd_describe(&input, compact),
        Commands::Check { inputs } => cmd_check(&inputs),
    }
}

fn load_schema(input: &Path) -> Result<Arc<Schema>> {
    let source =
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let schema = Schema::parse(&source).with_context(|| format!("parsing {}", input.display()))?;
    tracing::info!(
        "Loaded {}: {} messages, {} enums",
        input.display(),
        schema.messages().len(),
        schema.enums().len()
    );
    Ok(schema)
}

fn cmd_generate(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    fields_module: Option<String>,
    derives: &[String],
) -> Result<()> {
    let config = match config {
        Some(path) => GenConfig::load(path)?,
        None => GenConfig::default(),
    }
    .with_overrides(fields_module, derives);
    config.validate()?;

    let schema = load_schema(input)?;
    let source_name = input
        .file_name()
        .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into_owned());
    let code = emit_module(&schema, &config, &source_name)?;

    match output {
        Some(path) => {
            std::fs::write(path, &code).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {} ({} bytes)", path.display(), code.len());
        }
        None => print!("{code}"),
    }
    Ok(())
}

fn cmd_describe(input: &Path, compact: bool) -> Result<()> {
    let schema = load_schema(input)?;
    let json = if compact {
        serde_json::to_string(&*schema)?
    } else {
        serde_json::to_string_pretty(&*schema)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_check(inputs: &[PathBuf]) -> Result<()> {
    let mut failures = 0usize;
    for input in inputs {
        match load_schema(input) {
            Ok(_) => println!("[OK] {}", input.display()),
            Err(e) => {
                failures += 1;
                println!("[FAIL] {}: {:#}", input.display(), e);
            }
        }
    }
    if failures > 0 {
        anyhow::bail!("{failures} of {} schema(s) failed validation", inputs.len());
    }
    Ok(())
}
