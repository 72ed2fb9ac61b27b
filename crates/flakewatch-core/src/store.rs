//! Per-job history cache.
//!
//! # File Format
//!
//! ```text
//! {cache_dir}/{job_name}.raw
//!   b"FWH\0"                 magic
//!   u32                      schema version (bincode varint)
//!   (String, History)        job name and history (bincode, standard config)
//! ```
//!
//! Any file that does not decode under the current schema is a cache miss.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::model::{History, Job};

pub const CACHE_MAGIC: &[u8; 4] = b"FWH\0";

/// Bumped whenever the encoding of [`History`] changes.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

const CACHE_EXTENSION: &str = "raw";

/// Best-effort store of one [`History`] per job.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    cache_dir: PathBuf,
}

impl HistoryStore {
    /// Store under the platform cache directory.
    ///
    /// Default: `~/.cache/flakewatch/history` on Linux.
    pub fn new() -> StoreResult<Self> {
        let base = dirs::cache_dir()
            .or_else(dirs::home_dir)
            .ok_or(StoreError::NoCacheDir)?;
        Ok(Self::with_dir(base.join("flakewatch").join("history")))
    }

    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache file for a job. Path separators in the name are replaced.
    pub fn path_for(&self, job_name: &str) -> PathBuf {
        let file_stem: String = job_name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.cache_dir.join(format!("{file_stem}.{CACHE_EXTENSION}"))
    }

    /// Persist `job.history`. Failures are logged and reported as `false`.
    pub async fn save(&self, job: &Job) -> bool {
        match self.try_save(&job.name, &job.history).await {
            Ok(path) => {
                debug!(job = %job.name, path = %path.display(), "history cached");
                true
            }
            Err(e) => {
                warn!(job = %job.name, error = %e, "failed to cache history");
                false
            }
        }
    }

    /// Replace `job.history` with the cached one, if a usable cache exists.
    pub async fn load(&self, job: &mut Job) -> bool {
        let path = self.path_for(&job.name);
        if !path.exists() {
            debug!(job = %job.name, "no cached history");
            return false;
        }

        match self.try_load(&job.name).await {
            Ok(history) => {
                info!(
                    job = %job.name,
                    builds = history.builds_analyzed,
                    "loaded cached history"
                );
                job.history = history;
                true
            }
            Err(e) => {
                warn!(job = %job.name, error = %e, "ignoring unusable cache");
                false
            }
        }
    }

    pub async fn try_save(&self, job_name: &str, history: &History) -> StoreResult<PathBuf> {
        let path = self.path_for(job_name);
        let bytes = encode_history(job_name, history)?;

        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| io_error(&self.cache_dir, e))?;
        write_atomic(&path, &bytes).await?;
        Ok(path)
    }

    pub async fn try_load(&self, job_name: &str) -> StoreResult<History> {
        let path = self.path_for(job_name);
        let bytes = fs::read(&path).await.map_err(|e| io_error(&path, e))?;
        decode_history(job_name, &bytes)
    }

    /// Job names (file stems) with a cache file, sorted.
    pub async fn list(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        if !self.cache_dir.exists() {
            return Ok(names);
        }

        let mut entries = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| io_error(&self.cache_dir, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.cache_dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CACHE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Remove one job's cache. Returns whether a file was removed.
    pub async fn evict(&self, job_name: &str) -> StoreResult<bool> {
        let path = self.path_for(job_name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).await.map_err(|e| io_error(&path, e))?;
        debug!(job = %job_name, "evicted cached history");
        Ok(true)
    }

    /// Remove every cache file. Returns how many were removed.
    pub async fn clear(&self) -> StoreResult<usize> {
        let names = self.list().await?;
        for name in &names {
            let path = self.cache_dir.join(format!("{name}.{CACHE_EXTENSION}"));
            fs::remove_file(&path).await.map_err(|e| io_error(&path, e))?;
        }
        debug!(removed = names.len(), "cleared history cache");
        Ok(names.len())
    }
}

pub fn encode_history(job_name: &str, history: &History) -> StoreResult<Vec<u8>> {
    let body = bincode::encode_to_vec(
        (CACHE_SCHEMA_VERSION, job_name, history),
        bincode::config::standard(),
    )
    .map_err(|e| StoreError::Encode {
        message: e.to_string(),
    })?;

    let mut bytes = Vec::with_capacity(CACHE_MAGIC.len() + body.len());
    bytes.extend_from_slice(CACHE_MAGIC);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode a cache file, checking magic, schema version and owning job.
pub fn decode_history(job_name: &str, bytes: &[u8]) -> StoreResult<History> {
    let body = bytes
        .strip_prefix(CACHE_MAGIC.as_slice())
        .ok_or(StoreError::BadMagic)?;

    let config = bincode::config::standard();
    let (version, read) =
        bincode::decode_from_slice::<u32, _>(body, config).map_err(decode_error)?;
    if version != CACHE_SCHEMA_VERSION {
        return Err(StoreError::SchemaVersion {
            found: version,
            expected: CACHE_SCHEMA_VERSION,
        });
    }

    let ((found, history), _) =
        bincode::decode_from_slice::<(String, History), _>(&body[read..], config)
            .map_err(decode_error)?;
    if found != job_name {
        return Err(StoreError::JobMismatch {
            found,
            expected: job_name.to_string(),
        });
    }
    Ok(history)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, bytes)
        .await
        .map_err(|e| io_error(&temp_path, e))?;
    fs::rename(&temp_path, path)
        .await
        .map_err(|e| io_error(path, e))?;
    Ok(())
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn decode_error(e: bincode::error::DecodeError) -> StoreError {
    StoreError::Decode {
        message: e.to_string(),
    }
}
