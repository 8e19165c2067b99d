//! Window configuration loading.
//!
//! Filesystem access is packaged behind the [`ConfigReader`] capability so
//! tests can substitute the directory contents wholesale. Per-file failures
//! are logged, counted, and skipped; only directory-level failures abort a
//! load.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use metrics::counter;

use crate::config::METRIC_CONFIG_LOADER;
use crate::error::{AppError, AppResult};
use crate::models::{Window, WindowMap, WindowsDoc};

/// Filesystem interactions needed to read window configurations.
pub trait ConfigReader: Send + Sync {
    /// Whether `path` exists. An empty path is an error.
    fn path_exists(&self, path: &Path) -> AppResult<bool>;

    /// Converts `path` to an absolute path and verifies it exists.
    fn abs_path(&self, path: &Path) -> AppResult<PathBuf>;

    /// All files in `dir` whose name ends in `.json`, case-insensitively.
    fn json_files(&self, dir: &Path) -> AppResult<Vec<PathBuf>>;

    /// The contents of the JSON file at `path`.
    fn json_content(&self, path: &Path) -> AppResult<Vec<u8>>;
}

/// [`ConfigReader`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskReader;

impl ConfigReader for DiskReader {
    fn path_exists(&self, path: &Path) -> AppResult<bool> {
        if path.as_os_str().is_empty() {
            return Err(AppError::EmptyPath);
        }
        match fs::metadata(path) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn abs_path(&self, path: &Path) -> AppResult<PathBuf> {
        let abs = if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir()?.join(path)
        };
        if !self.path_exists(&abs)? {
            return Err(AppError::PathNotFound(abs));
        }
        Ok(abs)
    }

    fn json_files(&self, dir: &Path) -> AppResult<Vec<PathBuf>> {
        let abs = self.abs_path(dir)?;
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(&abs)? {
            let entry = entry?;
            let name = entry.file_name();
            if !Path::new(&name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            {
                continue;
            }
            files.push(dir.join(&name));
        }
        files.sort();
        Ok(files)
    }

    fn json_content(&self, path: &Path) -> AppResult<Vec<u8>> {
        let abs = self.abs_path(path)?;
        if !abs
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            return Err(AppError::NotJson(abs));
        }
        Ok(fs::read(&abs)?)
    }
}

/// Loads every window defined in `dir` into a fresh label map, deriving each
/// window's schedule against `now`.
pub fn windows(dir: &Path, reader: &dyn ConfigReader, now: DateTime<Local>) -> AppResult<WindowMap> {
    let files = reader.json_files(dir)?;
    let mut all: Vec<Window> = Vec::new();
    for path in files {
        let bytes = match reader.json_content(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(file = %path.display(), %err, "error reading configuration file");
                report_conf_file_metric(&path, "read_err");
                continue;
            }
        };
        let doc: WindowsDoc = match serde_json::from_slice(&bytes) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::error!(file = %path.display(), %err, "error decoding configuration file");
                report_conf_file_metric(&path, "unmarshal_err");
                continue;
            }
        };
        let mut decoded: Vec<Window> = Vec::with_capacity(doc.windows.len());
        let mut failed = false;
        for raw in doc.windows {
            match Window::from_doc(raw, now) {
                Ok(window) => decoded.push(window),
                Err(err) => {
                    tracing::error!(file = %path.display(), %err, "invalid window definition");
                    failed = true;
                    break;
                }
            }
        }
        if failed {
            report_conf_file_metric(&path, "unmarshal_err");
            continue;
        }
        report_conf_file_metric(&path, "ok");
        all.extend(decoded);
    }
    let mut map = WindowMap::new();
    map.add(all);
    Ok(map)
}

fn report_conf_file_metric(path: &Path, result: &'static str) {
    counter!(
        METRIC_CONFIG_LOADER,
        "file_path" => path.display().to_string(),
        "result" => result
    )
    .increment(1);
}
