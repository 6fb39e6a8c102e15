///
/// This module implements the CLI interface for reportfill: command parsing,
/// argument exposure and user-visible invocations.
///
/// All records, layouts and document editing live in the [`reportfill-core`] crate.
/// This module is strictly CLI glue and orchestration.
///
/// ## How To Use
/// - For command-line users: use the installed `reportfill` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`reportfill-core`]: ../../reportfill-core/
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reportfill_core::dates::{parse_date, DEFAULT_DATE_FORMAT};
use reportfill_core::fill::fill_reports;
use reportfill_core::inspect::inspect_file;
use reportfill_core::layout::TemplateLayout;
use reportfill_core::record::load_records;
use reportfill_core::redate::{redate_folder, RedateConfig};
use reportfill_core::sink::DirectorySink;
use reportfill_core::tsv::convert_file;
use std::path::PathBuf;

/// CLI for reportfill: fill Word report templates from student records.
#[derive(Parser)]
#[clap(
    name = "reportfill",
    version,
    about = "Fill Word report templates with student assessment data from YAML/TSV records"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one report per student record using the given config file
    Fill {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Path to the multi-document YAML student records
        #[clap(long)]
        records: PathBuf,
    },
    /// Turn a tab separated class list into blank student record YAML
    FromTsv {
        /// ID, NAME, START_DATE, END_DATE per line, tab separated
        #[clap(long)]
        input: PathBuf,
        /// Where to write the YAML records
        #[clap(long)]
        output: PathBuf,
        #[clap(long, default_value_t = 1)]
        first_week: usize,
        #[clap(long, default_value_t = 10)]
        last_week: usize,
    },
    /// Rewrite term and week dates in every report in a folder
    Redate {
        /// YAML config file providing date_format and layout
        #[clap(long)]
        config: Option<PathBuf>,
        /// Folder of previously generated reports
        #[clap(long)]
        dir: PathBuf,
        /// New term start date, in the configured date format
        #[clap(long)]
        start: String,
        /// New term end date; defaults to the Friday of the last week
        #[clap(long)]
        end: Option<String>,
        /// Descend into subfolders
        #[clap(long)]
        recursive: bool,
        /// Write updated copies here instead of replacing the originals
        #[clap(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the text of every table cell in a document
    Inspect {
        #[clap(long)]
        document: PathBuf,
        /// Emit JSON instead of plain text
        #[clap(long)]
        json: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Fill { config, records } => {
            let config = load_config(config)?;
            let records = load_records(&records)?;
            tracing::info!(command = "fill", records = records.len(), "Starting report generation");
            let fill_config = config.fill_config()?;
            let sink = DirectorySink::new(config.output_dir()?, config.overwrite);
            match fill_reports(&fill_config, &records, &sink).await {
                Ok(report) => {
                    tracing::info!(command = "fill", ?report, "Report generation complete");
                    for generated in &report.generated {
                        println!("{}", generated.path.display());
                    }
                    if !report.skipped.is_empty() {
                        eprintln!("Skipped {} record(s) without id or name", report.skipped.len());
                    }
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "fill", error = %e, "Report generation failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
        Commands::FromTsv {
            input,
            output,
            first_week,
            last_week,
        } => {
            let count = convert_file(&input, &output, first_week, last_week)?;
            tracing::info!(command = "from-tsv", count, "Wrote blank records");
            println!("Wrote {} record(s) to {}", count, output.display());
            Ok(())
        }
        Commands::Redate {
            config,
            dir,
            start,
            end,
            recursive,
            output_dir,
        } => {
            let (date_format, layout) = match config {
                Some(path) => {
                    let loaded = load_config(path)?;
                    (loaded.date_format, loaded.layout)
                }
                None => (DEFAULT_DATE_FORMAT.to_owned(), TemplateLayout::default()),
            };
            let start = parse_date(&start, &date_format).context("Invalid --start date")?;
            let end = end
                .map(|e| parse_date(&e, &date_format))
                .transpose()
                .context("Invalid --end date")?;
            let redate = RedateConfig {
                dir,
                recursive,
                start,
                end,
                date_format,
                layout,
                output_dir,
            };
            let report = redate_folder(&redate).await?;
            tracing::info!(command = "redate", ?report, "Redate complete");
            println!("Updated {} document(s)", report.updated.len());
            for failure in &report.failed {
                eprintln!("{}: {}", failure.path.display(), failure.error);
            }
            if report.failed.is_empty() {
                Ok(())
            } else {
                anyhow::bail!("{} document(s) could not be updated", report.failed.len())
            }
        }
        Commands::Inspect { document, json } => {
            let inspection = inspect_file(&document)
                .with_context(|| format!("Failed to inspect {}", document.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&inspection)?);
            } else {
                print!("{inspection}");
            }
            Ok(())
        }
    }
}
