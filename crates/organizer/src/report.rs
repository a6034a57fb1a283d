use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use common::OperationRecord;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
    Debug,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Info => "INFO",
            Level::Success => "SUCCESS",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Debug => "DEBUG",
        };
        f.write_str(label)
    }
}

/// Where run events and per-file outcomes go.
pub trait ReportSink {
    fn event(&mut self, level: Level, message: &str);
    fn operation(&mut self, record: &OperationRecord);
}

impl<T: ReportSink + ?Sized> ReportSink for &mut T {
    fn event(&mut self, level: Level, message: &str) {
        (**self).event(level, message)
    }

    fn operation(&mut self, record: &OperationRecord) {
        (**self).operation(record)
    }
}

/// Forwards events to `tracing`. Operation records are only traced at debug
/// level; the matching events already carry the interesting part.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn event(&mut self, level: Level, message: &str) {
        match level {
            Level::Info | Level::Success => info!("{}", message),
            Level::Warning => warn!("{}", message),
            Level::Error => error!("{}", message),
            Level::Debug => debug!("{}", message),
        }
    }

    fn operation(&mut self, record: &OperationRecord) {
        debug!(
            "{} {:?} -> {:?}",
            record.status, record.source, record.destination
        );
    }
}

/// Appends timestamped lines to a log file. Write failures are reported once
/// through `tracing` and then ignored so a full log disk never stops a run.
pub struct LogFileSink {
    writer: BufWriter<File>,
    failed: bool,
}

impl LogFileSink {
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            failed: false,
        })
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn write_line(&mut self, line: &str) {
        if self.failed {
            return;
        }
        if let Err(err) = writeln!(self.writer, "[{}] {}", timestamp(), line) {
            warn!("Failed to write log file: {}", err);
            self.failed = true;
        }
    }
}

impl ReportSink for LogFileSink {
    fn event(&mut self, level: Level, message: &str) {
        self.write_line(&format!("[{}] {}", level, message));
    }

    fn operation(&mut self, record: &OperationRecord) {
        match serde_json::to_string(record) {
            Ok(json) => self.write_line(&format!("[OP] {}", json)),
            Err(err) => warn!("Failed to encode operation record: {}", err),
        }
    }
}

impl Drop for LogFileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown-time".to_string())
}

#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<(Level, String)>,
    pub operations: Vec<OperationRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for MemorySink {
    fn event(&mut self, level: Level, message: &str) {
        self.events.push((level, message.to_string()));
    }

    fn operation(&mut self, record: &OperationRecord) {
        self.operations.push(record.clone());
    }
}

/// Sends everything to both sinks.
pub struct Tee<A, B>(pub A, pub B);

impl<A: ReportSink, B: ReportSink> ReportSink for Tee<A, B> {
    fn event(&mut self, level: Level, message: &str) {
        self.0.event(level, message);
        self.1.event(level, message);
    }

    fn operation(&mut self, record: &OperationRecord) {
        self.0.operation(record);
        self.1.operation(record);
    }
}

impl<S: ReportSink> ReportSink for Option<S> {
    fn event(&mut self, level: Level, message: &str) {
        if let Some(sink) = self {
            sink.event(level, message);
        }
    }

    fn operation(&mut self, record: &OperationRecord) {
        if let Some(sink) = self {
            sink.operation(record);
        }
    }
}
