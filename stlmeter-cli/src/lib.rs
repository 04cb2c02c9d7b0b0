/// Command-line measurement of STL files
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use stlmeter_core::{select_tier, Measurement, MeterConfig, OrderDimensions, PrinterTier, Unit};
use tracing::{debug, info};

pub mod report;

pub use report::ReportRenderer;

/// Measurement of one file on disk
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub measurement: Measurement,
    pub tier: PrinterTier,
}

impl FileReport {
    pub fn new(path: PathBuf, measurement: Measurement) -> Self {
        let tier = select_tier(measurement.max_dimension_mm);
        Self {
            path,
            measurement,
            tier,
        }
    }

    pub fn order(&self) -> OrderDimensions {
        OrderDimensions::new(&self.measurement, self.tier)
    }

    /// One JSON line for `--json` output
    pub fn to_json(&self) -> Result<String> {
        let line = JsonLine {
            file: self.path.display().to_string(),
            triangles: self.measurement.triangle_count,
            dimensions: self.measurement.dimensions_text(),
            volume: self.measurement.volume_text(),
            order: self.order(),
        };
        Ok(serde_json::to_string(&line)?)
    }
}

#[derive(Serialize)]
struct JsonLine {
    file: String,
    triangles: usize,
    dimensions: String,
    volume: String,
    order: OrderDimensions,
}

/// Read and measure one file, decoding on the blocking thread pool
pub async fn measure_file(path: &Path, unit: Unit, config: &MeterConfig) -> Result<FileReport> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    // Oversize files are rejected before anything is buffered
    config
        .check_size(usize::try_from(metadata.len()).unwrap_or(usize::MAX))
        .with_context(|| format!("rejected {}", path.display()))?;

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    config
        .check_size(data.len())
        .with_context(|| format!("rejected {}", path.display()))?;

    debug!(path = %path.display(), bytes = data.len(), "decoding");
    let measurement = tokio::task::spawn_blocking(move || stlmeter_core::measure_stl(&data, unit))
        .await?
        .with_context(|| format!("failed to decode {}", path.display()))?;

    let report = FileReport::new(path.to_path_buf(), measurement);
    info!(
        path = %path.display(),
        triangles = measurement.triangle_count,
        printer = report.tier.code(),
        "measured"
    );
    Ok(report)
}

/// Measure several files concurrently, returning results in input order
pub async fn measure_files(
    paths: &[PathBuf],
    unit: Unit,
    config: &MeterConfig,
) -> Vec<Result<FileReport>> {
    let tasks: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| {
            let config = config.clone();
            tokio::spawn(async move { measure_file(&path, unit, &config).await })
        })
        .collect();

    let mut reports = Vec::with_capacity(tasks.len());
    for task in tasks {
        reports.push(task.await.map_err(anyhow::Error::from).and_then(|r| r));
    }
    reports
}
