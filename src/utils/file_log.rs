use crate::utils::app_paths::AppPaths;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

static FILE_LOGGER: OnceLock<FileLogger> = OnceLock::new();

/// Appends formatted log lines to a timestamped file, with a `latest.log`
/// pointer next to it
pub struct FileLogger {
    log_file: Mutex<Option<File>>,
    log_path: PathBuf,
}

impl FileLogger {
    pub fn new(log_dir: &Path) -> Self {
        let _ = std::fs::create_dir_all(log_dir);

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("hotel-table_{}.log", timestamp));
        let latest_path = log_dir.join("latest.log");

        #[cfg(unix)]
        {
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
        }

        #[cfg(windows)]
        {
            // Symlinks need elevated rights on Windows
            let _ = std::fs::write(
                &latest_path,
                format!("Current log file: {}\n", log_path.display()),
            );
        }

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok();

        Self {
            log_file: Mutex::new(log_file),
            log_path,
        }
    }

    pub fn write_line(&self, line: &str) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }

        if std::env::var("HOTEL_TABLE_DEBUG").is_ok() {
            eprintln!("{}", line);
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn flush(&self) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = file.flush();
            }
        }
    }
}

/// Initialize the global file logger in the application log directory
pub fn init_file_logger() -> &'static FileLogger {
    FILE_LOGGER.get_or_init(|| {
        let log_dir = AppPaths::log_dir().unwrap_or_else(|_| std::env::temp_dir().join("hotel-table"));
        FileLogger::new(&log_dir)
    })
}

pub fn get_file_logger() -> Option<&'static FileLogger> {
    FILE_LOGGER.get()
}
