use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "hotel-table";

/// Per-user directories, created on first use
pub struct AppPaths;

impl AppPaths {
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Cannot determine config directory"))?
            .join(APP_DIR);

        fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Cannot determine data directory"))?
            .join(APP_DIR);

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    /// User-supplied table schemas, looked up by file name
    pub fn schemas_dir() -> Result<PathBuf> {
        let dir = Self::config_dir()?.join("schemas");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn log_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?.join("logs");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Default export destination
    pub fn export_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?.join("exports");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
