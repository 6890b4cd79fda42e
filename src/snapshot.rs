// snapshot.rs
use reqwest::blocking::Client;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::config::{Secret, SnapshotConfig};
use crate::errors::TrendError;

/// What was fetched and where it landed.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotInfo {
    pub source: String,
    pub local_path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

/// Produces a local copy of the listings store.
pub trait SnapshotSource {
    fn describe(&self) -> String;

    /// Replace `dest` with a fresh copy of the snapshot.
    fn fetch(&self, dest: &Path) -> Result<SnapshotInfo, TrendError>;
}

fn digest_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Write through a sibling temp file so a failed download never leaves a
/// truncated database behind.
fn write_snapshot(dest: &Path, bytes: &[u8]) -> Result<(), TrendError> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = dest.with_extension("partial");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, dest)?;
    Ok(())
}

/// Snapshot already present on local or mounted storage.
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for FileSnapshot {
    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }

    fn fetch(&self, dest: &Path) -> Result<SnapshotInfo, TrendError> {
        let bytes = fs::read(&self.path).map_err(|e| {
            TrendError::SnapshotFetchFailed(format!("read {}: {e}", self.path.display()))
        })?;

        write_snapshot(dest, &bytes)?;

        Ok(SnapshotInfo {
            source: self.describe(),
            local_path: dest.to_path_buf(),
            bytes: bytes.len() as u64,
            sha256: digest_hex(&bytes),
        })
    }
}

/// Snapshot served over HTTP(S), e.g. a presigned object-storage URL.
pub struct HttpSnapshot {
    client: Client,
    url: Url,
    access_key_id: Option<String>,
    secret_access_key: Option<Secret>,
}

impl HttpSnapshot {
    pub fn new(
        url: Url,
        access_key_id: Option<String>,
        secret_access_key: Option<Secret>,
        timeout: Duration,
    ) -> Result<Self, TrendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrendError::Config(e.to_string()))?;

        Ok(Self {
            client,
            url,
            access_key_id,
            secret_access_key,
        })
    }
}

impl SnapshotSource for HttpSnapshot {
    fn describe(&self) -> String {
        // Query strings on presigned URLs carry signatures.
        let mut shown = self.url.clone();
        shown.set_query(None);
        shown.to_string()
    }

    fn fetch(&self, dest: &Path) -> Result<SnapshotInfo, TrendError> {
        let mut req = self.client.get(self.url.clone());
        if let Some(key_id) = &self.access_key_id {
            req = req.basic_auth(key_id, self.secret_access_key.as_ref().map(Secret::expose));
        }

        let resp = req
            .send()
            .map_err(|e| TrendError::SnapshotFetchFailed(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TrendError::SnapshotFetchFailed(format!(
                "{} returned HTTP {status}",
                self.describe()
            )));
        }

        let bytes = resp
            .bytes()
            .map_err(|e| TrendError::SnapshotFetchFailed(e.without_url().to_string()))?;

        write_snapshot(dest, &bytes)?;

        Ok(SnapshotInfo {
            source: self.describe(),
            local_path: dest.to_path_buf(),
            bytes: bytes.len() as u64,
            sha256: digest_hex(&bytes),
        })
    }
}

/// Pick a source implementation from the configured URL scheme.
pub fn source_from_config(cfg: &SnapshotConfig) -> Result<Box<dyn SnapshotSource>, TrendError> {
    let url = Url::parse(&cfg.source).map_err(|e| {
        TrendError::Config(format!("invalid snapshot source '{}': {e}", cfg.source))
    })?;

    match url.scheme() {
        "file" => {
            let path = url.to_file_path().map_err(|_| {
                TrendError::Config(format!("snapshot source '{}' is not a file path", cfg.source))
            })?;
            Ok(Box::new(FileSnapshot::new(path)))
        }
        "http" | "https" => {
            if let Some(region) = cfg.region.as_deref() {
                info!(region, "snapshot bucket region");
            }
            Ok(Box::new(HttpSnapshot::new(
                url,
                cfg.access_key_id.clone(),
                cfg.secret_access_key.clone(),
                Duration::from_secs(cfg.timeout_secs),
            )?))
        }
        other => Err(TrendError::Config(format!(
            "unsupported snapshot scheme '{other}'; use file:// or a presigned https:// URL"
        ))),
    }
}
