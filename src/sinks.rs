//! # Sinks
//!
//! Ready-made implementations of [`LogSink`] and [`NotificationSink`]:
//! - [`LogCrateSink`] forwards event lines to the `log` facade
//! - [`CsvFileLogSink`] appends timestamped rows to a per-session CSV file
//! - [`LogNotificationSink`] stands in for toasts on hosts without a UI

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Local;
use log::{info, warn};

use crate::{LogSink, NotificationDuration, NotificationSink, Result};

/// File name stamp, minute resolution: one file per tracker session.
const FILE_STAMP_FORMAT: &str = "%Y_%m_%d_%H_%M";

/// Row stamp, millisecond resolution.
const ROW_STAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S_%3f";

const CSV_HEADER: &str = "timestamp,message";

// ============================================================================
// log facade
// ============================================================================

/// Forwards every event line to `log::info!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn write(&self, line: &str) {
        info!("[LocationEvents] {}", line);
    }
}

/// Logs toast texts instead of displaying them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn show(&self, text: &str, duration: NotificationDuration) {
        info!("[Notification:{:?}] {}", duration, text);
    }
}

// ============================================================================
// CSV file
// ============================================================================

/// Appends `timestamp,message` rows to a CSV file.
///
/// The header is written when the file is still empty, so sinks that share a
/// file (same directory, same minute) produce a single header. Commas and
/// line breaks inside messages are replaced with spaces so each event stays
/// one two-column row.
#[derive(Debug)]
pub struct CsvFileLogSink {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl CsvFileLogSink {
    /// Log into `<dir>/<YYYY_MM_DD_HH_MM>_Log.csv`, stamped with the current local time.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let file_name = format!("{}_Log.csv", Local::now().format(FILE_STAMP_FORMAT));
        Self::with_path(dir.as_ref().join(file_name))
    }

    /// Log into an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, reporting I/O failures.
    pub fn try_write(&self, line: &str) -> Result<()> {
        // Held for the whole append so rows from concurrent callbacks don't interleave
        let _guard = self
            .append_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", CSV_HEADER)?;
        }

        writeln!(
            file,
            "{},{}",
            Local::now().format(ROW_STAMP_FORMAT),
            sanitize_field(line)
        )?;
        Ok(())
    }
}

impl LogSink for CsvFileLogSink {
    fn write(&self, line: &str) {
        if let Err(e) = self.try_write(line) {
            warn!(
                "[CsvFileLogSink] Failed to append to {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

fn sanitize_field(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            ',' | '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}
