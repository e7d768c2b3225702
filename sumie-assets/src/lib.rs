//! Saves generated assets locally. Every file of one generation run shares
//! the caller's prefix and one Unix timestamp, with a 1-based index:
//! `{prefix}_{timestamp}_{index}.png`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use reqwest::blocking::Client;
use thiserror::Error;

pub const DEFAULT_PREFIX: &str = "generated";

const ASSET_EXTENSION: &str = "png";

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("the task finished without any image URLs")]
    NoImages,
    #[error("failed to write asset to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}", incomplete_message(.saved, .failed))]
    Incomplete {
        saved: Vec<PathBuf>,
        failed: Vec<FailedDownload>,
    },
}

/// One URL that could not be fetched or written.
#[derive(Debug)]
pub struct FailedDownload {
    pub index: usize,
    pub url: String,
    pub reason: String,
}

fn incomplete_message(saved: &[PathBuf], failed: &[FailedDownload]) -> String {
    let indices = failed
        .iter()
        .map(|failure| failure.index.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "saved {} of {} assets; failed indices: {indices}",
        saved.len(),
        saved.len() + failed.len()
    )
}

/// Naming scheme for one generation run. The timestamp is captured once so
/// sibling assets sort together and never straddle a second boundary.
#[derive(Debug, Clone)]
pub struct AssetNameContext {
    prefix: String,
    timestamp: u64,
}

impl AssetNameContext {
    pub fn new(prefix: &str) -> Self {
        Self::with_timestamp(prefix, unix_timestamp())
    }

    pub fn with_timestamp(prefix: &str, timestamp: u64) -> Self {
        AssetNameContext {
            prefix: sanitize_prefix(prefix).unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            timestamp,
        }
    }

    /// `index` is 1-based, matching the order the URLs arrived in.
    pub fn file_name(&self, index: usize) -> String {
        format!(
            "{}_{}_{}.{}",
            self.prefix, self.timestamp, index, ASSET_EXTENSION
        )
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Keep letters, digits and underscores; any other run of characters
/// collapses to a single dash. Returns `None` when nothing survives.
fn sanitize_prefix(raw: &str) -> Option<String> {
    let mut prefix = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            prefix.push(ch);
        } else if !prefix.ends_with('-') {
            prefix.push('-');
        }
    }

    let prefix = prefix.trim_matches('-');
    if prefix.is_empty() {
        None
    } else {
        Some(prefix.to_string())
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or_default()
}

/// Download every URL into `output_dir` sequentially, naming files through
/// `names`. Files written before a later failure are kept.
///
/// # Errors
///
/// Returns [`DownloadError::NoImages`] for an empty URL list,
/// [`DownloadError::Io`] when the output directory cannot be created, and
/// [`DownloadError::Incomplete`] when at least one URL failed; the latter
/// reports both the saved paths and the 1-based indices that failed.
pub fn download_all(
    urls: &[String],
    output_dir: &Path,
    names: &AssetNameContext,
) -> Result<Vec<PathBuf>, DownloadError> {
    if urls.is_empty() {
        return Err(DownloadError::NoImages);
    }

    fs::create_dir_all(output_dir).map_err(|source| DownloadError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let client = Client::new();
    let mut saved = Vec::with_capacity(urls.len());
    let mut failed = Vec::new();

    for (index, url) in urls.iter().enumerate() {
        let index = index + 1;
        let path = output_dir.join(names.file_name(index));
        match fetch_and_write(&client, url, &path) {
            Ok(()) => {
                debug!("saved {url} as {}", path.display());
                saved.push(path);
            }
            Err(reason) => {
                warn!("download {index} of {} failed: {reason}", urls.len());
                failed.push(FailedDownload {
                    index,
                    url: url.clone(),
                    reason,
                });
            }
        }
    }

    if failed.is_empty() {
        Ok(saved)
    } else {
        Err(DownloadError::Incomplete { saved, failed })
    }
}

fn fetch_and_write(client: &Client, url: &str, path: &Path) -> Result<(), String> {
    let response = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(|err| err.to_string())?;
    let bytes = response.bytes().map_err(|err| err.to_string())?;
    fs::write(path, &bytes).map_err(|err| format!("write {}: {err}", path.display()))
}

#[cfg(test)]
mod tests;
