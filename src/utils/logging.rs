use crate::utils::file_log::{init_file_logger, FileLogger};
use chrono::Local;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Maximum number of log entries kept for the log pane
const MAX_LOG_ENTRIES: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, target: &str, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S.%3f").to_string(),
            level: level.to_string().to_uppercase(),
            target: target.to_string(),
            message,
        }
    }

    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Thread-safe ring buffer for log entries
#[derive(Clone, Default)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogRingBuffer {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES))),
        }
    }

    pub fn push(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() >= MAX_LOG_ENTRIES {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    /// The newest `count` entries, oldest first
    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().rev().take(count).rev().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a compact-format line, `LEVEL target: message`
fn parse_compact_line(line: &str) -> (Level, &str, &str) {
    let levels = [
        ("TRACE ", Level::TRACE),
        ("DEBUG ", Level::DEBUG),
        ("INFO ", Level::INFO),
        ("WARN ", Level::WARN),
        ("ERROR ", Level::ERROR),
    ];

    let Some((level, rest)) = levels
        .iter()
        .find_map(|(prefix, level)| line.strip_prefix(prefix).map(|rest| (*level, rest.trim_start())))
    else {
        return (Level::INFO, "general", line);
    };

    match rest.split_once(": ") {
        Some((target, message)) if !target.contains(' ') => (level, target, message.trim()),
        _ => (level, "general", rest),
    }
}

/// Writes formatted tracing output to the ring buffer and, when present, the
/// log file
#[derive(Clone)]
pub struct DualWriter {
    buffer: LogRingBuffer,
    file: Option<&'static FileLogger>,
}

impl DualWriter {
    pub fn new(buffer: LogRingBuffer, file: Option<&'static FileLogger>) -> Self {
        Self { buffer, file }
    }
}

impl std::io::Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = std::str::from_utf8(buf) {
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let (level, target, message) = parse_compact_line(line);
                let entry = LogEntry::new(level, target, message.to_string());
                if let Some(file) = self.file {
                    file.write_line(&entry.format_for_display());
                }
                self.buffer.push(entry);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(file) = self.file {
            file.flush();
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for DualWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static LOG_BUFFER: OnceLock<LogRingBuffer> = OnceLock::new();

pub fn init_log_buffer() -> LogRingBuffer {
    LOG_BUFFER.get_or_init(LogRingBuffer::new).clone()
}

pub fn get_log_buffer() -> Option<LogRingBuffer> {
    LOG_BUFFER.get().cloned()
}

/// Initialize tracing into the ring buffer (for the log pane) and a log file.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing_with_dual_logging() -> LogRingBuffer {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let file_logger = init_file_logger();
    let buffer = init_log_buffer();

    let fmt_layer = fmt::layer()
        .with_writer(DualWriter::new(buffer.clone(), Some(file_logger)))
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time()
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedding hosts) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    tracing::info!(
        "Logging initialized, writing to {}",
        file_logger.log_path().display()
    );
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let buffer = LogRingBuffer::new();
        for i in 0..MAX_LOG_ENTRIES + 5 {
            buffer.push(LogEntry::new(Level::INFO, "test", format!("entry {}", i)));
        }
        assert_eq!(buffer.len(), MAX_LOG_ENTRIES);
        let recent = buffer.get_recent(2);
        assert_eq!(recent[0].message, format!("entry {}", MAX_LOG_ENTRIES + 3));
        assert_eq!(recent[1].message, format!("entry {}", MAX_LOG_ENTRIES + 4));
    }

    #[test]
    fn test_parse_compact_line() {
        assert_eq!(
            parse_compact_line("WARN hotel_table::table::column: duplicate column id 'status'"),
            (
                Level::WARN,
                "hotel_table::table::column",
                "duplicate column id 'status'"
            )
        );
        assert_eq!(
            parse_compact_line("INFO Exported 3 rows to out.csv"),
            (Level::INFO, "general", "Exported 3 rows to out.csv")
        );
        assert_eq!(parse_compact_line("plain"), (Level::INFO, "general", "plain"));
    }

    #[test]
    fn test_writer_fills_buffer() {
        let buffer = LogRingBuffer::new();
        let mut writer = DualWriter::new(buffer.clone(), None);
        writer
            .write_all(b"DEBUG hotel_table::table::reducer: Unknown filter 'floor', ignoring\n")
            .unwrap();
        let entries = buffer.get_recent(10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, "DEBUG");
        assert_eq!(entries[0].message, "Unknown filter 'floor', ignoring");
    }
}
