//! In-app log capture.
//!
//! Log records go two places: `env_logger` on stderr, and a bounded ring
//! buffer rendered by the GUI log panel. Both sit behind the `log` facade,
//! combined with `multi_log`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use eframe::egui::Color32;
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::error::{AppResult, DashError};

/// Oldest entries are dropped past this point.
const LOG_CAPACITY: usize = 2000;

/// One captured log record.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    /// Display color for the entry's severity.
    pub fn color(&self) -> Color32 {
        match self.level {
            Level::Error => Color32::LIGHT_RED,
            Level::Warn => Color32::YELLOW,
            Level::Info => Color32::LIGHT_GREEN,
            Level::Debug => Color32::LIGHT_BLUE,
            Level::Trace => Color32::GRAY,
        }
    }
}

/// Shared handle to the captured log entries.
#[derive(Clone, Default)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks and returns the entries for iteration.
    pub fn read(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn clear(&self) {
        self.read().clear();
    }

    fn push(&self, entry: LogEntry) {
        let mut entries = self.read();
        if entries.len() >= LOG_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}

/// `log::Log` implementation feeding the GUI buffer.
struct GuiLogger {
    buffer: LogBuffer,
    filter: LevelFilter,
}

impl Log for GuiLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.buffer.push(LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        });
    }

    fn flush(&self) {}
}

/// Installs the combined stderr + GUI logger and returns the GUI buffer.
///
/// `filter` is a `log` level filter name (`error`..`trace`); `RUST_LOG`
/// still overrides the stderr side.
pub fn init(filter: &str) -> AppResult<LogBuffer> {
    let filter: LevelFilter = filter
        .parse()
        .map_err(|_| DashError::Configuration(format!("invalid log level '{filter}'")))?;

    let buffer = LogBuffer::new();
    let stderr = env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .build();
    let gui = GuiLogger {
        buffer: buffer.clone(),
        filter,
    };

    multi_log::MultiLogger::init(
        vec![Box::new(stderr), Box::new(gui)],
        filter.to_level().unwrap_or(Level::Error),
    )?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_caps_entries() {
        let buffer = LogBuffer::new();
        for i in 0..(LOG_CAPACITY + 5) {
            buffer.push(LogEntry {
                timestamp: Local::now(),
                level: Level::Info,
                target: "test".to_string(),
                message: format!("entry {i}"),
            });
        }
        let entries = buffer.read();
        assert_eq!(entries.len(), LOG_CAPACITY);
        // The oldest entries were dropped.
        assert_eq!(entries.front().map(|e| e.message.as_str()), Some("entry 5"));
    }

    #[test]
    fn test_gui_logger_respects_filter() {
        let buffer = LogBuffer::new();
        let logger = GuiLogger {
            buffer: buffer.clone(),
            filter: LevelFilter::Warn,
        };

        logger.log(
            &Record::builder()
                .args(format_args!("noise"))
                .level(Level::Debug)
                .target("test")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("problem"))
                .level(Level::Warn)
                .target("test")
                .build(),
        );

        let entries = buffer.read();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "problem");
    }

    #[test]
    fn test_clear_empties_buffer() {
        let buffer = LogBuffer::new();
        buffer.push(LogEntry {
            timestamp: Local::now(),
            level: Level::Info,
            target: "test".to_string(),
            message: "one".to_string(),
        });
        buffer.clear();
        assert!(buffer.read().is_empty());
    }
}
