//! yt-dlp download backend
//!
//! Downloads into a private directory per request and hands the file back as
//! [`LocalMedia`]. The directory is removed when the media is dropped, when
//! the download fails, or when the resolving future is cancelled (the child
//! process is killed with it).

use crate::extractor::models::{BackendOutcome, LocalMedia, MediaLocator};
use crate::extractor::traits::BackendAdapter;
use crate::utils::error::{BackendError, GrabError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info, warn};

/// Main downloader using yt-dlp
pub struct YtDlpAdapter {
    program: PathBuf,
    prefix_args: Vec<String>,
    work_dir: PathBuf,
    format: String,
    download_timeout: Duration,
}

impl YtDlpAdapter {
    /// Locate yt-dlp and prepare to download into `work_dir`
    pub fn new(work_dir: PathBuf, format: String, download_timeout: Duration) -> Result<Self, GrabError> {
        let ytdlp_path = find_ytdlp().ok_or(GrabError::YtDlpNotFound)?;
        info!("Found yt-dlp at: {}", ytdlp_path.display());
        Ok(Self::with_program(ytdlp_path, Vec::new(), work_dir, format, download_timeout))
    }

    /// Run an explicit program, e.g. `python3` with `["-m", "yt_dlp"]`
    pub fn with_program(
        program: PathBuf,
        prefix_args: Vec<String>,
        work_dir: PathBuf,
        format: String,
        download_timeout: Duration,
    ) -> Self {
        Self {
            program,
            prefix_args,
            work_dir,
            format,
            download_timeout,
        }
    }

    async fn attempt(&self, url: &str, timeout: Duration) -> Result<MediaLocator, BackendError> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(GrabError::from)?;
        let workspace = tempfile::Builder::new()
            .prefix("grabbot-")
            .tempdir_in(&self.work_dir)
            .map_err(GrabError::from)?;
        let template = workspace.path().join("video.%(ext)s");

        let mut cmd = AsyncCommand::new(&self.program);
        cmd.args(&self.prefix_args)
            .arg("-f")
            .arg(&self.format)
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--no-progress")
            .arg("--print")
            .arg("after_move:filepath")
            .arg("-o")
            .arg(&template)
            .arg(url.trim())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running yt-dlp for {}", url);
        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(BackendError::LocalResource(format!(
                    "failed to run {}: {}",
                    self.program.display(),
                    e
                )))
            }
            Err(_) => {
                return Err(BackendError::Transport(format!(
                    "yt-dlp timed out after {:?}",
                    timeout
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("yt-dlp exited with {:?}", output.status.code());
            return Err(BackendError::NotFound(error_summary(&stderr)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = match reported_path(&stdout) {
            Some(path) => path,
            None => first_file_in(workspace.path()).await.ok_or_else(|| {
                BackendError::LocalResource("yt-dlp reported success but wrote no file".to_string())
            })?,
        };

        let media = LocalMedia::adopt(workspace, path).await?;
        info!("yt-dlp downloaded {} bytes", media.size());
        Ok(MediaLocator::Local(media))
    }
}

#[async_trait]
impl BackendAdapter for YtDlpAdapter {
    fn id(&self) -> &'static str {
        "yt-dlp"
    }

    fn timeout_hint(&self) -> Option<Duration> {
        Some(self.download_timeout)
    }

    async fn resolve(&self, url: &str, timeout: Duration) -> BackendOutcome {
        self.attempt(url, timeout).await.into()
    }
}

/// Last non-empty stdout line is the `after_move:filepath` print.
fn reported_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from)
}

async fn first_file_in(dir: &Path) -> Option<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.is_file() && path.extension().map_or(true, |ext| ext != "part") {
            return Some(path);
        }
    }
    None
}

/// First `ERROR:` line, or the tail of stderr
fn error_summary(stderr: &str) -> String {
    stderr
        .lines()
        .find(|line| line.contains("ERROR:"))
        .or_else(|| stderr.lines().rev().find(|line| !line.trim().is_empty()))
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| "yt-dlp failed without output".to_string())
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. Next to the executable
/// 2. System PATH
/// 3. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Some(local) = find_beside_executable() {
        info!("✓ Using yt-dlp next to executable: {:?}", local);
        return Some(local);
    }

    if let Ok(system) = which::which("yt-dlp") {
        info!("✓ Using system yt-dlp: {:?}", system);
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        info!("✓ Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("✗ yt-dlp not found anywhere!");
    None
}

fn find_beside_executable() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let candidate = exe_path.parent()?.join("yt-dlp");
    if candidate.is_file() && is_executable(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

fn find_in_common_paths() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("/usr/local/bin/yt-dlp"),
        PathBuf::from("/usr/bin/yt-dlp"),
        PathBuf::from("/opt/homebrew/bin/yt-dlp"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join("yt-dlp"));
    }

    candidates
        .into_iter()
        .find(|path| path.is_file() && is_executable(path))
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.exists()
    }
}
