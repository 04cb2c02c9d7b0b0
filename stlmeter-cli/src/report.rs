/// Terminal report for measured models
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use stlmeter_core::PrinterTier;

use crate::FileReport;

/// Writes human-readable reports, optionally colored
pub struct ReportRenderer {
    color: bool,
}

impl ReportRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render<W: Write>(&self, writer: &mut W, report: &FileReport) -> std::io::Result<()> {
        let m = &report.measurement;

        self.heading(writer, &report.path.display().to_string())?;
        self.row(writer, "triangles", &m.triangle_count.to_string(), None)?;
        self.row(writer, "dimensions", &m.dimensions_text(), None)?;
        self.row(writer, "volume", &m.volume_text(), None)?;
        self.row(
            writer,
            "printer",
            &format!("{} ({})", report.tier, report.tier.code()),
            Some(tier_color(report.tier)),
        )?;
        writer.flush()
    }

    fn heading<W: Write>(&self, writer: &mut W, text: &str) -> std::io::Result<()> {
        if self.color {
            writer.queue(SetForegroundColor(Color::Cyan))?;
        }
        writer.queue(Print(text))?;
        if self.color {
            writer.queue(ResetColor)?;
        }
        writer.queue(Print('\n'))?;
        Ok(())
    }

    fn row<W: Write>(
        &self,
        writer: &mut W,
        label: &str,
        value: &str,
        color: Option<Color>,
    ) -> std::io::Result<()> {
        writer.queue(Print(format!("  {label:<11}")))?;
        match color.filter(|_| self.color) {
            Some(color) => {
                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(value))?;
                writer.queue(ResetColor)?;
            }
            None => {
                writer.queue(Print(value))?;
            }
        }
        writer.queue(Print('\n'))?;
        Ok(())
    }
}

fn tier_color(tier: PrinterTier) -> Color {
    match tier {
        PrinterTier::Standard => Color::Green,
        PrinterTier::Medium => Color::Yellow,
        PrinterTier::Large => Color::Red,
    }
}
