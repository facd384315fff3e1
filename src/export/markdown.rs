//! Markdown export implementation.
//!
//! Exports analysis results in Markdown format for documentation and reporting.

use super::{describe_evidence, ExportData, Exporter, ReportKind};
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        match data.kind {
            ReportKind::Unused => writeln!(writer, "# Unused Dependency Report")?,
            ReportKind::Discovered => writeln!(writer, "# Discovered Dependencies")?,
        }
        writeln!(writer)?;
        writeln!(writer, "**Root:** `{}`", data.root.display())?;
        if let Some(manifest) = &data.manifest {
            writeln!(writer, "**Manifest:** `{}`", manifest.display())?;
        }
        writeln!(writer)?;

        if data.kind == ReportKind::Discovered {
            writeln!(writer, "## Packages ({})", data.packages.len())?;
            writeln!(writer)?;
            for package in &data.packages {
                writeln!(writer, "- `{}`", package)?;
            }
            writeln!(writer)?;
            writeln!(writer, "---")?;
            writeln!(writer, "*Generated by depscope*")?;
            return Ok(());
        }

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Declared | {} |", data.declared_count())?;
        writeln!(writer, "| Used | {} |", data.used_count())?;
        writeln!(writer, "| Ignored or protected | {} |", data.skipped_count())?;
        writeln!(writer, "| Unused | {} |", data.packages.len())?;
        if let Some(settings) = data.settings {
            writeln!(writer)?;
            writeln!(
                writer,
                "Matching is **{}** with threshold {:.2}; import segments: {}.",
                settings.matching, settings.threshold, settings.segments
            )?;
        }
        writeln!(writer)?;

        if !data.packages.is_empty() {
            writeln!(writer, "## Unused ({})", data.packages.len())?;
            writeln!(writer)?;
            for package in &data.packages {
                writeln!(writer, "- `{}`", package)?;
            }
            writeln!(writer)?;
        }

        if !data.verdicts.is_empty() {
            writeln!(writer, "## Dependencies")?;
            writeln!(writer)?;
            writeln!(writer, "| Package | Resolved via | Evidence |")?;
            writeln!(writer, "|---------|--------------|----------|")?;
            for verdict in &data.verdicts {
                let source = verdict
                    .source
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    writer,
                    "| {} | {} | {} |",
                    verdict.package,
                    source,
                    describe_evidence(&verdict.evidence)
                )?;
            }
            writeln!(writer)?;
        }

        // Footer
        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by depscope*")?;

        Ok(())
    }
}
