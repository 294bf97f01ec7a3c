//! Data structures for resolved media

use crate::utils::error::{BackendError, GrabError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A non-empty direct media URL returned by a scraping service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl(String);

impl RemoteUrl {
    pub fn parse(raw: &str) -> Result<Self, BackendError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BackendError::Parse("empty media url".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A downloaded file with its measured size.
///
/// Owns the per-request directory it was downloaded into; dropping the value
/// removes the directory and everything in it.
#[derive(Debug)]
pub struct LocalMedia {
    path: PathBuf,
    size: u64,
    _workspace: TempDir,
}

impl LocalMedia {
    /// Take ownership of `workspace` and check that `path` is a non-empty file.
    ///
    /// On failure the workspace is dropped (and removed) before returning.
    pub async fn adopt(workspace: TempDir, path: PathBuf) -> Result<Self, GrabError> {
        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            GrabError::LocalResource(format!("{} is not readable: {}", path.display(), e))
        })?;

        if !metadata.is_file() {
            return Err(GrabError::LocalResource(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        if metadata.len() == 0 {
            return Err(GrabError::LocalResource(format!(
                "{} is empty",
                path.display()
            )));
        }

        Ok(Self {
            path,
            size: metadata.len(),
            _workspace: workspace,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Copy the file somewhere that outlives this value.
    pub async fn copy_to(&self, dest: &Path) -> Result<u64, GrabError> {
        Ok(tokio::fs::copy(&self.path, dest).await?)
    }
}

impl PartialEq for LocalMedia {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.size == other.size
    }
}

/// Where the playable media lives after a successful resolution.
#[derive(Debug, PartialEq)]
pub enum MediaLocator {
    Remote(RemoteUrl),
    Local(LocalMedia),
}

impl MediaLocator {
    pub fn remote(raw: &str) -> Result<Self, BackendError> {
        RemoteUrl::parse(raw).map(MediaLocator::Remote)
    }

    pub fn remote_url(&self) -> Option<&str> {
        match self {
            MediaLocator::Remote(url) => Some(url.as_str()),
            MediaLocator::Local(_) => None,
        }
    }

    pub fn local(&self) -> Option<&LocalMedia> {
        match self {
            MediaLocator::Remote(_) => None,
            MediaLocator::Local(media) => Some(media),
        }
    }
}

/// Result of one adapter attempt.
#[derive(Debug, PartialEq)]
pub enum BackendOutcome {
    Success(MediaLocator),
    NotFound(String),
    TransportError(String),
    ParseError(String),
    LocalResourceError(String),
}

impl BackendOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendOutcome::Success(_) => "success",
            BackendOutcome::NotFound(_) => "not_found",
            BackendOutcome::TransportError(_) => "transport_error",
            BackendOutcome::ParseError(_) => "parse_error",
            BackendOutcome::LocalResourceError(_) => "local_resource_error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BackendOutcome::Success(_))
    }
}

impl From<Result<MediaLocator, BackendError>> for BackendOutcome {
    fn from(result: Result<MediaLocator, BackendError>) -> Self {
        match result {
            Ok(locator) => BackendOutcome::Success(locator),
            Err(BackendError::NotFound(msg)) => BackendOutcome::NotFound(msg),
            Err(BackendError::Transport(msg)) => BackendOutcome::TransportError(msg),
            Err(BackendError::Parse(msg)) => BackendOutcome::ParseError(msg),
            Err(BackendError::LocalResource(msg)) => BackendOutcome::LocalResourceError(msg),
        }
    }
}
