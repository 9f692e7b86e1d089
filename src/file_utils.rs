use anyhow::{Context, Result};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::AppError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Read and parse a JSON file, failing with a file error when it is missing
    pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Err(AppError::File(format!("File not found: {}", path.display())).into());
        }

        let content = Self::read_to_string(path)?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON file: {:?}", path))
    }

    /// Serialize a value as pretty JSON, keeping non-ASCII text readable
    pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        Self::write_to_file(path, &json)
    }

    /// Path of a timestamped log file inside `dir`
    pub fn timestamped_log_path<P: AsRef<Path>>(dir: P, prefix: &str) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        dir.as_ref().join(format!("{}_{}.log", prefix, timestamp))
    }

    /// Append content to a log file
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        // Open file in append mode, create if it doesn't exist
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "{}", content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Current local time for log headers
    pub fn log_timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
