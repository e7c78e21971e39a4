//! JSON report of a symbolication run
//!
//! One entry per extracted address with its span, load address and
//! outcome, plus resolved/failed totals.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::domain::ResolvedRecord;
use crate::pipeline::Report;

/// One address in the JSON report
#[derive(Debug, Clone, Serialize)]
struct RecordEntry {
    /// Matched crash text
    line: String,
    /// Byte offsets of the match in the crash file
    start: usize,
    end: usize,
    /// Address token as written, e.g. "0x0000000103450b5c"
    address: String,
    offset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    load_address: Option<String>,
    /// "ok" or the error category
    status: String,
    /// Replacement text written into the output
    text: String,
}

impl From<&ResolvedRecord> for RecordEntry {
    fn from(resolved: &ResolvedRecord) -> Self {
        let record = &resolved.record;
        Self {
            line: record.original_line.clone(),
            start: record.span.start,
            end: record.span.end,
            address: record.address_token().to_string(),
            offset: format!("{:#x}", record.offset),
            load_address: resolved.load_address.map(|addr| format!("{addr:#x}")),
            status: match &resolved.outcome {
                Ok(_) => "ok".to_string(),
                Err(e) => e.kind().to_string(),
            },
            text: resolved.resolved_text(),
        }
    }
}

/// JSON report container
#[derive(Debug, Serialize)]
struct ReportDocument {
    crash_file: String,
    bundle: String,
    resolved: usize,
    failed: usize,
    records: Vec<RecordEntry>,
}

/// Writes a machine-readable summary of a run
pub struct ReportExporter<'a> {
    crash_file: &'a Path,
    bundle: &'a Path,
}

impl<'a> ReportExporter<'a> {
    #[must_use]
    pub fn new(crash_file: &'a Path, bundle: &'a Path) -> Self {
        Self { crash_file, bundle }
    }

    /// Serialize `report` as pretty-printed JSON into `writer`
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails
    pub fn export<W: Write>(&self, report: &Report, mut writer: W) -> Result<()> {
        let document = ReportDocument {
            crash_file: self.crash_file.display().to_string(),
            bundle: self.bundle.display().to_string(),
            resolved: report.resolved_count(),
            failed: report.failed_count(),
            records: report.records.iter().map(RecordEntry::from).collect(),
        };

        serde_json::to_writer_pretty(&mut writer, &document)
            .context("Failed to serialize report")?;
        writeln!(writer).context("Failed to write report")?;
        writer.flush().context("Failed to flush report")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AddressRecord, ResolveError};

    fn sample_report() -> Report {
        let record = AddressRecord {
            original_line: "0x1000 42".to_string(),
            span: 4..13,
            token: 0..6,
            address: Some(0x1000),
            offset: 42,
        };
        Report {
            text: "at: main 42".to_string(),
            records: vec![
                ResolvedRecord {
                    record: record.clone(),
                    load_address: Some(0xfd6),
                    outcome: Ok("main".to_string()),
                },
                ResolvedRecord::failed(record, ResolveError::ToolNotFound),
            ],
        }
    }

    #[test]
    fn test_report_is_valid_json() {
        let exporter = ReportExporter::new(Path::new("a.crash"), Path::new("App.app.dSYM"));
        let mut buffer = Vec::new();
        exporter.export(&sample_report(), &mut buffer).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["crash_file"], "a.crash");
        assert_eq!(parsed["resolved"], 1);
        assert_eq!(parsed["failed"], 1);

        let records = parsed["records"].as_array().unwrap();
        assert_eq!(records[0]["status"], "ok");
        assert_eq!(records[0]["load_address"], "0xfd6");
        assert_eq!(records[0]["offset"], "0x2a");
        assert_eq!(records[0]["text"], "main 42");
        assert_eq!(records[1]["status"], "tool_not_found");
        assert!(records[1].get("load_address").is_none());
    }
}
