//! Plain export: one package name per line, nothing else.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// Plain exporter implementation.
pub struct PlainExporter;

impl Exporter for PlainExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        for package in &data.packages {
            writeln!(writer, "{}", package)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::{discovered_report, unused_report};

    #[test]
    fn test_plain_export() {
        let mut output = Vec::new();
        PlainExporter.export(&unused_report(), &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "numpy\ntorch\n");
    }

    #[test]
    fn test_plain_export_empty() {
        let mut data = discovered_report();
        data.packages.clear();

        let mut output = Vec::new();
        PlainExporter.export(&data, &mut output).unwrap();
        assert!(output.is_empty());
    }
}
