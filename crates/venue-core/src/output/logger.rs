//! Report Logger
//!
//! Append-only JSONL report logging, one line per week.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use venue_state::WeeklyReport;

/// Writes weekly reports to a JSON Lines file.
pub struct ReportLogger {
    writer: Option<BufWriter<File>>,
    report_count: u64,
}

impl ReportLogger {
    /// Create a new report logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            report_count: 0,
        })
    }

    /// Create a logger that discards reports (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            report_count: 0,
        }
    }

    /// Reports logged so far
    pub fn report_count(&self) -> u64 {
        self.report_count
    }

    /// Log a report as a single line
    pub fn log(&mut self, report: &WeeklyReport) -> std::io::Result<()> {
        self.report_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(report)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for ReportLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("Warning: Failed to flush report logger: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use venue_state::generate_report_id;

    fn report(week: u32) -> WeeklyReport {
        WeeklyReport {
            report_id: generate_report_id(week),
            week,
            city: "perth".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_report_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.jsonl");

        let mut logger = ReportLogger::new(&path).unwrap();
        logger.log(&report(0)).unwrap();
        logger.log(&report(1)).unwrap();
        logger.flush().unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let parsed: WeeklyReport = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(parsed.report_id, "wk_000001");
        assert_eq!(parsed.week, 1);
    }

    #[test]
    fn test_drop_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.jsonl");
        {
            let mut logger = ReportLogger::new(&path).unwrap();
            logger.log(&report(3)).unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("\"wk_000003\""));
    }

    #[test]
    fn test_null_logger() {
        let mut logger = ReportLogger::null();
        logger.log(&report(0)).unwrap();
        logger.flush().unwrap();
        assert_eq!(logger.report_count(), 1);
    }
}
