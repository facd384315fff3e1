//! Export functionality for analysis results.
//!
//! This module provides exporters for printing unused-dependency and
//! discovery reports in various formats: text, JSON, plain and Markdown.

pub mod json;
pub mod markdown;
pub mod plain;
pub mod text;

use crate::analysis::SegmentPolicy;
use crate::usage::{AnalysisReport, Evidence, MatchingMode, Verdict};
use std::io::{self, Write};
use std::path::PathBuf;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Text format - human-readable summary
    #[default]
    Text,
    /// JSON format - machine-readable, full data
    Json,
    /// Plain format - one package name per line
    Plain,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "plain" | "lines" => Ok(ExportFormat::Plain),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: text, json, plain, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Text => write!(f, "text"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Plain => write!(f, "plain"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// What a report lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Declared packages with no evidence of use.
    Unused,
    /// Packages the source tree uses.
    Discovered,
}

/// Classifier settings echoed in a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportSettings {
    pub matching: MatchingMode,
    pub segments: SegmentPolicy,
    pub threshold: f64,
}

/// Data container for export operations.
#[derive(Debug, Clone)]
pub struct ExportData {
    /// Scanned project root
    pub root: PathBuf,
    /// Manifest the report is about, if any
    pub manifest: Option<PathBuf>,
    /// What `packages` holds
    pub kind: ReportKind,
    /// Reported package names, sorted
    pub packages: Vec<String>,
    /// Per-dependency verdicts (unused reports only)
    pub verdicts: Vec<Verdict>,
    /// Classifier settings (unused reports only)
    pub settings: Option<ReportSettings>,
}

impl ExportData {
    /// Create export data from an unused-dependency analysis.
    pub fn unused(report: &AnalysisReport) -> Self {
        Self {
            root: report.root.clone(),
            manifest: Some(report.manifest.clone()),
            kind: ReportKind::Unused,
            packages: report.unused().into_iter().collect(),
            verdicts: report.classification.verdicts.clone(),
            settings: Some(ReportSettings {
                matching: report.matching,
                segments: report.segments,
                threshold: report.threshold,
            }),
        }
    }

    /// Create export data from a discovery run.
    pub fn discovered(root: impl Into<PathBuf>, packages: Vec<String>) -> Self {
        Self {
            root: root.into(),
            manifest: None,
            kind: ReportKind::Discovered,
            packages,
            verdicts: Vec::new(),
            settings: None,
        }
    }

    /// Get count of declared dependencies
    pub fn declared_count(&self) -> usize {
        self.verdicts.len()
    }

    /// Get count of dependencies with evidence of use
    pub fn used_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|v| matches!(v.evidence, Evidence::Exact { .. } | Evidence::Fuzzy { .. }))
            .count()
    }

    /// Get count of dependencies skipped by the ignore or protected lists
    pub fn skipped_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|v| matches!(v.evidence, Evidence::Ignored | Evidence::Protected))
            .count()
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Text => text::TextExporter.export(data, writer),
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Plain => plain::PlainExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Short human description of a verdict's evidence.
pub(crate) fn describe_evidence(evidence: &Evidence) -> String {
    match evidence {
        Evidence::Ignored => "ignored by configuration".to_string(),
        Evidence::Protected => "protected tool".to_string(),
        Evidence::Exact { name } => format!("imported as `{}`", name),
        Evidence::Fuzzy { name, referenced } => {
            format!("`{}` is similar to `{}`", name, referenced)
        }
        Evidence::Unused => "no reference found".to_string(),
    }
}
