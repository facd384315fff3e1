//! JSON export implementation.
//!
//! Exports analysis results in JSON format for machine-readable output.

use super::{ExportData, Exporter, ReportKind};
use crate::usage::Verdict;
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Classifier settings for JSON output.
#[derive(Serialize)]
struct JsonSettings {
    matching: String,
    segments: String,
    similarity_threshold: f64,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    declared: usize,
    used: usize,
    skipped: usize,
    unused: usize,
}

/// Root JSON export structure for unused reports.
#[derive(Serialize)]
struct JsonUnusedExport<'a> {
    root: String,
    manifest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<JsonSettings>,
    summary: JsonSummary,
    unused: &'a [String],
    dependencies: &'a [Verdict],
}

/// Root JSON export structure for discovery reports.
#[derive(Serialize)]
struct JsonDiscoveredExport<'a> {
    root: String,
    discovered: &'a [String],
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let root = data.root.display().to_string();

        let json = match data.kind {
            ReportKind::Unused => {
                let export = JsonUnusedExport {
                    root,
                    manifest: data.manifest.as_ref().map(|p| p.display().to_string()),
                    settings: data.settings.map(|s| JsonSettings {
                        matching: s.matching.to_string(),
                        segments: s.segments.to_string(),
                        similarity_threshold: s.threshold,
                    }),
                    summary: JsonSummary {
                        declared: data.declared_count(),
                        used: data.used_count(),
                        skipped: data.skipped_count(),
                        unused: data.packages.len(),
                    },
                    unused: &data.packages,
                    dependencies: &data.verdicts,
                };
                serde_json::to_string_pretty(&export)
            }
            ReportKind::Discovered => {
                let export = JsonDiscoveredExport {
                    root,
                    discovered: &data.packages,
                };
                serde_json::to_string_pretty(&export)
            }
        }
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::{discovered_report, unused_report};

    fn export_json(data: &ExportData) -> serde_json::Value {
        let mut output = Vec::new();
        JsonExporter.export(data, &mut output).unwrap();
        let json_str = String::from_utf8(output).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn test_json_export_summary() {
        let parsed = export_json(&unused_report());

        assert_eq!(parsed["root"], "/work/app");
        assert_eq!(parsed["summary"]["declared"], 5);
        assert_eq!(parsed["summary"]["used"], 2);
        assert_eq!(parsed["summary"]["unused"], 2);
        assert_eq!(parsed["settings"]["matching"], "lenient");
        assert_eq!(parsed["settings"]["segments"], "all");
    }

    #[test]
    fn test_json_export_dependencies_list() {
        let parsed = export_json(&unused_report());

        let unused = parsed["unused"].as_array().unwrap();
        assert_eq!(unused, &vec![serde_json::json!("numpy"), serde_json::json!("torch")]);

        let deps = parsed["dependencies"].as_array().unwrap();
        assert_eq!(deps.len(), 5);
        assert_eq!(deps[0]["package"], "black");
        assert_eq!(deps[0]["evidence"]["kind"], "protected");
        assert!(deps[0].get("source").is_none());
        assert_eq!(deps[2]["source"], "builtin");
        assert_eq!(deps[2]["evidence"]["kind"], "exact");
        assert_eq!(deps[2]["evidence"]["name"], "pil");
        assert_eq!(deps[3]["evidence"]["referenced"], "dateutil");
    }

    #[test]
    fn test_json_export_discovered() {
        let parsed = export_json(&discovered_report());

        assert_eq!(parsed["discovered"].as_array().unwrap().len(), 2);
        assert!(parsed.get("summary").is_none());
    }
}
