//! Text export implementation.
//!
//! Human-readable terminal output, the default for interactive use.

use super::{describe_evidence, ExportData, Exporter, ReportKind};
use std::io::{self, Write};

/// Text exporter implementation.
pub struct TextExporter;

impl TextExporter {
    fn export_unused<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        if let Some(manifest) = &data.manifest {
            writeln!(writer, "📄 Manifest: {}", manifest.display())?;
        }
        writeln!(writer, "🔍 Scanned:  {}", data.root.display())?;
        if let Some(settings) = data.settings {
            writeln!(
                writer,
                "⚙️  Matching: {} (threshold {:.2}, segments {})",
                settings.matching, settings.threshold, settings.segments
            )?;
        }
        writeln!(writer)?;

        if data.declared_count() == 0 {
            writeln!(writer, "No declared dependencies found.")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{} declared, {} used, {} skipped, {} unused",
            data.declared_count(),
            data.used_count(),
            data.skipped_count(),
            data.packages.len()
        )?;
        writeln!(writer)?;

        if data.packages.is_empty() {
            writeln!(writer, "✅ No unused dependencies found.")?;
            return Ok(());
        }

        writeln!(writer, "❌ Unused dependencies:")?;
        for verdict in data.verdicts.iter().filter(|v| !v.is_used()) {
            let candidates = verdict.candidates.join(", ");
            if candidates.is_empty() || candidates == verdict.package {
                writeln!(writer, "   - {}", verdict.package)?;
            } else {
                writeln!(writer, "   - {} (looked for: {})", verdict.package, candidates)?;
            }
        }

        Ok(())
    }

    fn export_discovered<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "🔍 Scanned: {}", data.root.display())?;
        writeln!(writer)?;

        if data.packages.is_empty() {
            writeln!(writer, "No third-party packages found.")?;
            return Ok(());
        }

        writeln!(writer, "📦 Discovered {} package(s):", data.packages.len())?;
        for package in &data.packages {
            writeln!(writer, "   - {}", package)?;
        }
        Ok(())
    }
}

impl Exporter for TextExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        match data.kind {
            ReportKind::Unused => self.export_unused(data, writer),
            ReportKind::Discovered => self.export_discovered(data, writer),
        }
    }
}

/// One line per verdict, used by `--verbose` listings.
pub fn verdict_lines(data: &ExportData) -> Vec<String> {
    data.verdicts
        .iter()
        .map(|v| format!("{}: {}", v.package, describe_evidence(&v.evidence)))
        .collect()
}
