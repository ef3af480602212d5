//! apispec command line
//!
//! Validates a schema corpus and generates typed Rust bindings from it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use apispec_gen::cargo_gen::write_cargo_toml;
use apispec_gen::config::GeneratorConfig;
use apispec_gen::output::generate_and_write_all;
use apispec_gen::pipeline::check_corpus;
use apispec_gen::report::{format_json, format_list, format_text};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// apispec - validate an API schema corpus and generate typed bindings
#[derive(Parser, Debug)]
#[command(name = "apispec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (defaults to ./apispec.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run every phase on the current thread
    #[arg(long, global = true)]
    sequential: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse, resolve and validate the corpus
    Check {
        /// Corpus directory (defaults to the bundled corpus)
        corpus: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Validate the corpus and emit bindings for certified operations
    Generate {
        /// Corpus directory (defaults to the bundled corpus)
        corpus: Option<PathBuf>,

        /// Output directory for generated sources
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Suffix for generated request types
        #[arg(long)]
        suffix: Option<String>,

        /// Print generated code without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// List operations with their URL templates and status
    List {
        /// Corpus directory (defaults to the bundled corpus)
        corpus: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn init_tracing(verbose: u8) {
    if verbose == 0 {
        return;
    }

    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            1 => "warn,apispec=info,apispec_gen=info".to_string(),
            2 => "info,apispec=debug,apispec_gen=debug".to_string(),
            _ => "debug,apispec=trace,apispec_gen=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose >= 4)
                .with_line_number(verbose >= 4)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn exit_status(has_violations: bool) -> ExitCode {
    if has_violations {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = GeneratorConfig::load_or_default(cli.config.as_deref(), Path::new("."))
        .wrap_err("Failed to load configuration")?;
    if cli.sequential {
        config.parallel = false;
    }

    let corpus = match &cli.command {
        Command::Check { corpus, .. }
        | Command::Generate { corpus, .. }
        | Command::List { corpus } => corpus.clone(),
    };
    if corpus.is_some() {
        config.corpus_dir = corpus;
    }
    if let Command::Generate { output, suffix, .. } = &cli.command {
        if let Some(output) = output {
            config.output_dir = output.clone();
        }
        if let Some(suffix) = suffix {
            config.request_suffix = suffix.clone();
        }
    }
    config.validate()?;

    let units = config.load_units()?;
    let checked = check_corpus(&units, config.parallel);

    match cli.command {
        Command::Check { format, .. } => {
            match format {
                Format::Text => print!("{}", format_text(&checked)),
                Format::Json => println!("{}", format_json(&checked)?),
            }
            Ok(exit_status(checked.has_violations()))
        }
        Command::Generate { dry_run, .. } => {
            if checked.has_violations() {
                eprint!("{}", format_text(&checked));
            }

            let generated = generate_and_write_all(
                &checked,
                &config.output_dir,
                dry_run,
                &config.request_suffix,
                config.parallel,
            )?;
            let crate_dir = config.output_dir.parent().unwrap_or(Path::new("."));
            write_cargo_toml(crate_dir, dry_run)?;

            info!(
                output = %config.output_dir.display(),
                operations = generated.operations.len(),
                "generation finished"
            );
            if !dry_run {
                eprintln!(
                    "Generated {} operation module(s) and {} type module(s) in {}",
                    generated.operations.len(),
                    generated.type_units.len(),
                    config.output_dir.display()
                );
            }
            Ok(exit_status(checked.has_violations()))
        }
        Command::List { .. } => {
            print!("{}", format_list(&checked));
            Ok(ExitCode::SUCCESS)
        }
    }
}
