//! Snapshot file writer.
//!
//! Layout under the output directory:
//! `market-indexes.json`, `us-stocks.json`, `kr-stocks.json`, `profiles.json`,
//! `historical/{SYMBOL}.json`, `guru-{id}.json`, `manifest.json`.
//!
//! Writes are atomic (write to .tmp, rename into place), so a reader never
//! sees a half-written file and a failed run leaves the previous snapshot.

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MARKET_INDEXES_FILE: &str = "market-indexes.json";
pub const US_STOCKS_FILE: &str = "us-stocks.json";
pub const KR_STOCKS_FILE: &str = "kr-stocks.json";
pub const PROFILES_FILE: &str = "profiles.json";
pub const HISTORICAL_DIR: &str = "historical";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A snapshot file that has been written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrittenFile {
    /// Path relative to the output directory, `/`-separated.
    pub path: String,
    pub records: usize,
    pub bytes: u64,
    /// BLAKE3 of the file contents.
    pub hash: String,
}

/// `manifest.json`: what the last successful run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub generated_at: NaiveDateTime,
    pub history_from: NaiveDate,
    pub files: Vec<WrittenFile>,
}

pub struct SnapshotWriter {
    out_dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Relative path of a symbol's history file.
    pub fn historical_path(symbol: &str) -> String {
        format!("{HISTORICAL_DIR}/{}.json", sanitize_file_stem(symbol))
    }

    /// Serialize `value` as pretty JSON to `relative` and atomically replace
    /// whatever was there.
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        relative: &str,
        value: &T,
        records: usize,
    ) -> Result<WrittenFile, WriteError> {
        let path = self.out_dir.join(relative);

        let mut body = serde_json::to_vec_pretty(value).map_err(|source| WriteError::Serialize {
            path: path.clone(),
            source,
        })?;
        body.push(b'\n');

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| WriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &body).map_err(|source| WriteError::Io {
            path: tmp_path.clone(),
            source,
        })?;

        // Atomic rename
        fs::rename(&tmp_path, &path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            WriteError::Io {
                path: path.clone(),
                source,
            }
        })?;

        Ok(WrittenFile {
            path: relative.to_string(),
            records,
            bytes: body.len() as u64,
            hash: blake3::hash(&body).to_hex().to_string(),
        })
    }

    pub fn write_manifest(&self, manifest: &SnapshotManifest) -> Result<WrittenFile, WriteError> {
        self.write_json(MANIFEST_FILE, manifest, manifest.files.len())
    }
}

/// Read a snapshot file back.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, WriteError> {
    let content = fs::read(path).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| WriteError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Symbols like `BRK-B`, `005930.KS` and `^GSPC` are kept as-is; path
/// separators and other characters unsafe in file names become `_`, and a
/// stem with nothing left becomes `_`.
fn sanitize_file_stem(symbol: &str) -> String {
    let stem = symbol
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>();
    match stem.trim_start_matches('.') {
        "" => "_".to_string(),
        rest => rest.to_string(),
    }
}
