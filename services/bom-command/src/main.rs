//! CadBom command entry point
//!
//! Reads the objects selected in the CAD host, reports the selection and
//! builds the bill of materials, either as a spreadsheet or as JSON rows.

use anyhow::{Context, Result};
use cadbom_models::BomRow;
use cadbom_utils::{
    init_logging, validate_model, AppConfig, BomAggregator, BomError, BomExporter, BomSummary,
    SheetLayout,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

mod selection;

use selection::{load_selection, SelectionSource};

#[derive(Parser)]
#[command(name = "cadbom")]
#[command(about = "Build a bill of materials from selected CAD objects")]
#[command(version)]
struct Args {
    /// Selection export from the CAD host (JSON); `-` reads stdin
    #[arg(default_value = "-")]
    selection: String,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grouping field, repeatable; replaces the configured key fields
    #[arg(long = "key-field")]
    key_fields: Vec<String>,

    /// Extra field collapsed per row, repeatable; replaces the configured extras
    #[arg(long = "extra-field")]
    extra_fields: Vec<String>,

    /// Spreadsheet to write (.xlsx or .csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print rows as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(err) = start(&args) {
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_status(&err));
    }
}

fn start(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("Failed to load configuration")?,
    };
    init_logging(&config.logging)?;

    run(args, config)
}

/// Exit status for a failed run; failures outside `BomError` exit with 1
fn exit_status(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<BomError>().map_or(1, BomError::exit_code)
}

fn run(args: &Args, config: AppConfig) -> Result<()> {
    // Status lines move to stderr so JSON output stays parseable
    let status = |message: &str| {
        if args.json {
            eprintln!("{}", message);
        } else {
            println!("{}", message);
        }
    };

    let mut aggregation = config.aggregation.clone();
    if !args.key_fields.is_empty() {
        aggregation.key_fields = args.key_fields.clone();
    }
    if !args.extra_fields.is_empty() {
        aggregation.extra_fields = args.extra_fields.clone();
    }
    validate_model(&aggregation)?;

    let source = SelectionSource::parse(&args.selection);
    let objects = match load_selection(&source) {
        Ok(objects) => objects,
        Err(BomError::HostUnavailable { message }) => {
            debug!(%message, "selection source unavailable");
            status("This command must be run with a CAD selection available.");
            return Ok(());
        }
        Err(err) => return Err(err).context("Failed to read selection"),
    };

    if objects.is_empty() {
        status("No objects selected.");
        return Ok(());
    }
    status(&format!("Selected {} object(s).", objects.len()));

    let rows = BomAggregator::from_config(&aggregation).aggregate(&objects);
    let summary = BomSummary::from_rows(&rows);
    info!(rows = summary.rows, objects = summary.total_quantity, "built BOM");

    if let Some(output) = &args.output {
        let saved = BomExporter::new(SheetLayout::from(&config.export))
            .export_bom(&rows, output)
            .with_context(|| format!("Failed to export BOM to {}", output.display()))?;
        status(&format!("BOM exported to {}", saved.display()));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if args.output.is_none() {
        for row in &rows {
            println!("{}", format_row(row));
        }
    }

    Ok(())
}

/// One table line: quantity, then every field as `field=value`
fn format_row(row: &BomRow) -> String {
    let fields: Vec<String> = row
        .fields()
        .into_iter()
        .map(|(field, value)| match value {
            Some(value) => format!("{}={}", field, value),
            None => format!("{}=-", field),
        })
        .collect();
    format!("{:>5}  {}", row.quantity(), fields.join("  "))
}
