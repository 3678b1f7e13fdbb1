//! # Telemetry Logger
//!
//! File-backed [`TelemetrySink`] implementation. Records are handed over
//! an unbounded channel to a background tokio task that owns the session
//! files, so submission from the detection path is a non-blocking send.
//!
//! A session directory is created per run under the configured log
//! directory, named by wall-clock start time, holding:
//! - `sensor_data.csv` — raw sample batches
//! - `jump_events.csv` (or `.jsonl`) — committed jump summaries
//! - `ground_truth_marks.csv` — manual annotations
//!
//! Write failures are logged and the writer keeps going: losing buffered
//! telemetry is acceptable, halting real-time tracking is not.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{
    JumpRow, MarkRow, SampleRow, TelemetrySink, JUMP_CSV_HEADER, MARK_CSV_HEADER,
    SAMPLE_CSV_HEADER,
};
use crate::error::{AirtimeError, Result};

/// On-disk format for jump-event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpLogFormat {
    /// Fixed-precision CSV (the stable contract).
    Csv,
    /// One JSON object per line.
    Jsonl,
}

impl JumpLogFormat {
    /// Parses the configuration string.
    pub fn parse(format: &str) -> Result<Self> {
        match format {
            "csv" => Ok(Self::Csv),
            "jsonl" => Ok(Self::Jsonl),
            other => Err(AirtimeError::Telemetry(format!(
                "unknown jump log format: {}",
                other
            ))),
        }
    }
}

enum Record {
    Samples(Vec<SampleRow>),
    Jump(JumpRow),
    Mark(MarkRow),
}

/// Channel-backed file sink. Cheap to submit to; owns a writer task.
pub struct TelemetryLogger {
    tx: Option<mpsc::UnboundedSender<Record>>,
    task: Option<JoinHandle<()>>,
    session_dir: PathBuf,
}

impl std::fmt::Debug for TelemetryLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryLogger")
            .field("session_dir", &self.session_dir)
            .finish_non_exhaustive()
    }
}

impl TelemetryLogger {
    /// Creates a fresh session directory under `log_dir` and starts the
    /// writer task.
    ///
    /// # Errors
    ///
    /// Returns error if the session directory or its files cannot be
    /// created. Failures after startup never propagate here.
    pub async fn create<P: AsRef<Path>>(log_dir: P, format: JumpLogFormat) -> Result<Self> {
        let stamp = Local::now().format("%Y-%m-%d_%H%M%S").to_string();
        let session_dir = log_dir.as_ref().join(stamp);
        tokio::fs::create_dir_all(&session_dir).await?;

        let mut sensors = open_with_header(&session_dir, "sensor_data.csv", SAMPLE_CSV_HEADER).await?;
        let mut marks =
            open_with_header(&session_dir, "ground_truth_marks.csv", MARK_CSV_HEADER).await?;

        let mut jumps = match format {
            JumpLogFormat::Csv => {
                open_with_header(&session_dir, "jump_events.csv", JUMP_CSV_HEADER).await?
            }
            JumpLogFormat::Jsonl => {
                BufWriter::new(File::create(session_dir.join("jump_events.jsonl")).await?)
            }
        };

        info!(session_dir = %session_dir.display(), "telemetry session opened");

        let (tx, mut rx) = mpsc::unbounded_channel::<Record>();
        let task = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                match record {
                    Record::Samples(batch) => {
                        debug!(rows = batch.len(), "writing sample batch");
                        let mut lines = String::new();
                        for row in &batch {
                            lines.push_str(&row.to_csv());
                            lines.push('\n');
                        }
                        if let Err(e) = sensors.write_all(lines.as_bytes()).await {
                            warn!("failed to write sample batch: {}", e);
                        }
                    }
                    Record::Jump(row) => {
                        let line = match format {
                            JumpLogFormat::Csv => row.to_csv(),
                            JumpLogFormat::Jsonl => match serde_json::to_string(&row) {
                                Ok(json) => json,
                                Err(e) => {
                                    warn!("failed to serialize jump event: {}", e);
                                    continue;
                                }
                            },
                        };
                        if let Err(e) = jumps.write_all(format!("{}\n", line).as_bytes()).await {
                            warn!("failed to write jump event: {}", e);
                        }
                    }
                    Record::Mark(row) => {
                        if let Err(e) =
                            marks.write_all(format!("{}\n", row.to_csv()).as_bytes()).await
                        {
                            warn!("failed to write ground-truth mark: {}", e);
                        }
                    }
                }
            }

            // Channel closed: flush whatever the buffers still hold.
            for (name, writer) in [
                ("sensor_data", &mut sensors),
                ("jump_events", &mut jumps),
                ("ground_truth_marks", &mut marks),
            ] {
                if let Err(e) = writer.flush().await {
                    warn!("failed to flush {} log: {}", name, e);
                }
            }
        });

        Ok(Self {
            tx: Some(tx),
            task: Some(task),
            session_dir,
        })
    }

    /// The directory this session's files live in.
    #[must_use]
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Closes the channel and waits for the writer task to flush and
    /// exit. Required at stream shutdown so the tail of the last
    /// incomplete batch is not lost.
    pub async fn shutdown(mut self) {
        self.tx.take();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("telemetry writer task failed: {}", e);
            }
        }
    }

    fn send(&mut self, record: Record) {
        if let Some(tx) = &self.tx {
            if tx.send(record).is_err() {
                warn!("telemetry writer task is gone; dropping record");
            }
        }
    }
}

impl TelemetrySink for TelemetryLogger {
    fn submit_samples(&mut self, batch: Vec<SampleRow>) {
        if !batch.is_empty() {
            self.send(Record::Samples(batch));
        }
    }

    fn submit_jump(&mut self, row: JumpRow) {
        self.send(Record::Jump(row));
    }

    fn submit_mark(&mut self, row: MarkRow) {
        self.send(Record::Mark(row));
    }
}

async fn open_with_header(
    dir: &Path,
    name: &str,
    header: &str,
) -> Result<BufWriter<File>> {
    let mut writer = BufWriter::new(File::create(dir.join(name)).await?);
    writer.write_all(format!("{}\n", header).as_bytes()).await?;
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SensorSample;

    fn sample_row(t: f64) -> SampleRow {
        SampleRow::from(&SensorSample::new(
            t,
            [0.1, 0.2, 0.3],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ))
    }

    fn jump_row() -> JumpRow {
        JumpRow {
            timestamp: 3.5,
            duration_s: 0.42,
            yaw_degrees: 182.0,
            peak_accel_g: 2.1,
            landing_impact_g: 3.3,
            sample_count: 21,
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(JumpLogFormat::parse("csv").unwrap(), JumpLogFormat::Csv);
        assert_eq!(JumpLogFormat::parse("jsonl").unwrap(), JumpLogFormat::Jsonl);
        assert!(JumpLogFormat::parse("yaml").is_err());
    }

    #[test]
    fn test_csv_session_files_written() {
        let dir = tempfile::tempdir().unwrap();

        tokio_test::block_on(async {
            let mut logger = TelemetryLogger::create(dir.path(), JumpLogFormat::Csv)
                .await
                .unwrap();
            let session_dir = logger.session_dir().to_path_buf();

            logger.submit_samples(vec![sample_row(1.0), sample_row(1.02)]);
            logger.submit_jump(jump_row());
            logger.submit_mark(MarkRow::new(2.0, "dropped a small cliff"));
            logger.shutdown().await;

            let sensors =
                std::fs::read_to_string(session_dir.join("sensor_data.csv")).unwrap();
            let lines: Vec<&str> = sensors.lines().collect();
            assert_eq!(lines.len(), 3);
            assert_eq!(lines[0], SAMPLE_CSV_HEADER);
            assert!(lines[1].starts_with("1.0000,0.10000"));

            let jumps =
                std::fs::read_to_string(session_dir.join("jump_events.csv")).unwrap();
            let lines: Vec<&str> = jumps.lines().collect();
            assert_eq!(lines[0], JUMP_CSV_HEADER);
            assert_eq!(lines[1], "3.5000,0.420,182.0,2.100,3.300,21");

            let marks =
                std::fs::read_to_string(session_dir.join("ground_truth_marks.csv")).unwrap();
            assert!(marks.contains("2.0000,dropped a small cliff"));
        });
    }

    #[test]
    fn test_jsonl_jump_log() {
        let dir = tempfile::tempdir().unwrap();

        tokio_test::block_on(async {
            let mut logger = TelemetryLogger::create(dir.path(), JumpLogFormat::Jsonl)
                .await
                .unwrap();
            let session_dir = logger.session_dir().to_path_buf();

            logger.submit_jump(jump_row());
            logger.shutdown().await;

            let jumps =
                std::fs::read_to_string(session_dir.join("jump_events.jsonl")).unwrap();
            let parsed: serde_json::Value = serde_json::from_str(jumps.trim()).unwrap();
            assert_eq!(parsed["sample_count"], 21);
            assert_eq!(parsed["duration_s"], 0.42);
        });
    }

    #[test]
    fn test_session_dir_created_under_log_dir() {
        let dir = tempfile::tempdir().unwrap();

        tokio_test::block_on(async {
            let logger = TelemetryLogger::create(dir.path(), JumpLogFormat::Csv)
                .await
                .unwrap();
            assert!(logger.session_dir().starts_with(dir.path()));
            assert!(logger.session_dir().is_dir());
            logger.shutdown().await;
        });
    }

    #[test]
    fn test_empty_sample_batch_is_skipped() {
        let dir = tempfile::tempdir().unwrap();

        tokio_test::block_on(async {
            let mut logger = TelemetryLogger::create(dir.path(), JumpLogFormat::Csv)
                .await
                .unwrap();
            let session_dir = logger.session_dir().to_path_buf();
            logger.submit_samples(vec![]);
            logger.shutdown().await;

            let sensors =
                std::fs::read_to_string(session_dir.join("sensor_data.csv")).unwrap();
            assert_eq!(sensors.lines().count(), 1); // header only
        });
    }
}
