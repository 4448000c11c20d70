//! Value set command-line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use octofhir_valueset::cli::config::{self, DEFAULT_MAX_ENTRIES, DEFAULT_OUTPUT_PATH, DEFAULT_OUTPUT_PREFIX};
use octofhir_valueset::cli::{bundle, generate, logging, output};
use octofhir_valueset::{Encoding, FhirVersion};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// FHIR ValueSet generator
#[derive(Parser)]
#[command(name = "valueset")]
#[command(author, version, about = "Spreadsheet to FHIR ValueSet tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate value sets from an authoring workbook
    Generate {
        /// Workbook to read
        #[arg(long = "path-to-spreadsheet", visible_alias = "pts")]
        path_to_spreadsheet: Option<PathBuf>,

        /// Output directory
        #[arg(long = "output-path", visible_alias = "op")]
        output_path: Option<PathBuf>,

        /// File name prefix
        #[arg(long = "output-prefix", visible_alias = "opp")]
        output_prefix: Option<String>,

        /// FHIR version (r4, stu3)
        #[arg(long = "output-version", visible_alias = "opv")]
        output_version: Option<String>,

        /// Output encoding (json, xml)
        #[arg(short, long)]
        encoding: Option<String>,
    },

    /// Bundle every resource in a directory into a transaction
    Bundle {
        /// Directory of JSON resources
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Bundle id
        #[arg(long)]
        id: Option<String>,

        /// FHIR version (r4, stu3)
        #[arg(long = "output-version", visible_alias = "opv")]
        output_version: Option<String>,

        /// Output encoding (json, xml)
        #[arg(short, long)]
        encoding: Option<String>,

        /// Bundle file (default: <input>/<id>.<encoding>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum entries per posted transaction
        #[arg(long)]
        max_entries: Option<usize>,

        /// FHIR server base to post the split bundles to
        #[arg(long)]
        post: Option<String>,
    },
}

fn parse_version(value: Option<String>) -> Result<FhirVersion> {
    match value {
        Some(v) => v
            .parse()
            .with_context(|| format!("outputversion should be R4 or STU3, got '{v}'")),
        None => Ok(FhirVersion::default()),
    }
}

fn parse_encoding(value: Option<String>) -> Result<Encoding> {
    match value {
        Some(e) => Ok(e.parse()?),
        None => Ok(Encoding::default()),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            path_to_spreadsheet,
            output_path,
            output_prefix,
            output_version,
            encoding,
        } => {
            let file = settings.generate;
            let spreadsheet = path_to_spreadsheet
                .or(file.path_to_spreadsheet)
                .context("The path to the spreadsheet is required (--path-to-spreadsheet)")?;
            let config = generate::GenerateConfig {
                spreadsheet,
                output_path: output_path
                    .or(file.output_path)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
                output_prefix: output_prefix
                    .or(file.output_prefix)
                    .unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_string()),
                version: parse_version(output_version.or(file.output_version))?,
                encoding: parse_encoding(encoding.or(file.encoding))?,
            };
            let summary = generate::generate(config).await?;
            if summary.failed > 0 {
                anyhow::bail!("{} unit(s) were not generated", summary.failed);
            }
            Ok(())
        }

        Commands::Bundle {
            input,
            id,
            output_version,
            encoding,
            output,
            max_entries,
            post,
        } => {
            let file = settings.bundle;
            let max_entries = max_entries
                .or(file.max_entries)
                .unwrap_or(DEFAULT_MAX_ENTRIES);
            let config = bundle::BundleConfig {
                input: input
                    .or(file.input)
                    .context("An input directory is required (--input)")?,
                id: id.or(file.id).context("A bundle id is required (--id)")?,
                version: parse_version(output_version.or(file.output_version))?,
                encoding: parse_encoding(encoding.or(file.encoding))?,
                output: output.or(file.output),
                max_entries: NonZeroUsize::new(max_entries)
                    .context("--max-entries must be at least 1")?,
                post: post.or(file.post),
            };
            bundle::bundle(config).await
        }
    }
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);
    logging::init_tracing_with_level(logging::default_level(cli.verbose));

    if let Err(e) = run(cli).await {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
