//! Downloads a remote file (the résumé) into a local scratch directory so the
//! browser session can attach it to a file-input control.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Used when the source URL has no usable final path segment.
pub const DEFAULT_FILE_NAME: &str = "uploaded-file";

#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered, but not with a 2xx status.
    #[error("download of {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("download failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not write artifact: {0}")]
    Io(#[from] std::io::Error),
}

/// A downloaded file, valid for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub source_url: String,
    pub local_path: PathBuf,
    pub byte_size: u64,
}

pub struct ArtifactFetcher {
    client: Client,
}

impl Default for ArtifactFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// Downloads `source_url` into `dest_dir`, creating the directory if needed.
    ///
    /// Fetching the same URL into the same directory twice overwrites the file.
    pub async fn fetch(&self, source_url: &str, dest_dir: &Path) -> Result<Artifact, FetchError> {
        tokio::fs::create_dir_all(dest_dir).await?;
        let local_path = dest_dir.join(file_name_for(source_url));

        debug!(url = source_url, "downloading artifact");
        let response = self.client.get(source_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: source_url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(&local_path, &bytes).await?;
        info!(
            path = %local_path.display(),
            bytes = bytes.len(),
            "artifact downloaded"
        );

        Ok(Artifact {
            source_url: source_url.to_string(),
            local_path,
            byte_size: bytes.len() as u64,
        })
    }
}

/// File name derived from the last path segment of `source_url`.
pub fn file_name_for(source_url: &str) -> String {
    Url::parse(source_url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}
