/// stlmeter - measure STL models for printing
///
/// Commands:
///   - measure <FILES>...: print dimensions, volume and printer tier
///   - cube <SIDE> <OUT>: write a sample binary STL cube
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::tty::IsTty;
use std::io::{self, Write};
use std::path::PathBuf;
use stlmeter_cli::{measure_files, ReportRenderer};
use stlmeter_core::{stl, DecodedMesh, MeterConfig, Unit};

#[derive(Parser)]
#[command(name = "stlmeter")]
#[command(about = "Measure binary STL models and pick a printer tier", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure one or more binary STL files
    Measure {
        /// Files to measure
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Display unit: mm, cm or in (unknown values mean mm)
        #[arg(long)]
        unit: Option<String>,

        /// Print one JSON object per file instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Write a closed cube as binary STL
    Cube {
        /// Edge length in millimeters
        side: f32,

        /// Output path
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = MeterConfig::from_env();

    match cli.command {
        Commands::Measure { files, unit, json } => {
            let unit = unit
                .as_deref()
                .map(Unit::from_symbol_lossy)
                .unwrap_or(config.default_unit);
            tracing::debug!(%unit, files = files.len(), "measuring");

            let reports = measure_files(&files, unit, &config).await;
            let renderer = ReportRenderer::new(io::stdout().is_tty());
            let mut stdout = io::stdout().lock();
            let mut failed = 0usize;

            for report in reports {
                match report {
                    Ok(report) if json => writeln!(stdout, "{}", report.to_json()?)?,
                    Ok(report) => renderer.render(&mut stdout, &report)?,
                    Err(err) => {
                        failed += 1;
                        tracing::error!("{err:#}");
                    }
                }
            }

            if failed > 0 {
                anyhow::bail!("{failed} of {} files could not be measured", files.len());
            }
        }
        Commands::Cube { side, out } => {
            let bytes = stl::write_binary_stl(&DecodedMesh::cube(side));
            std::fs::write(&out, bytes)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), side, "wrote cube");
        }
    }

    Ok(())
}
