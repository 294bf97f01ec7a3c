//! Fallback chain and resolver behaviour against scripted backends, no network.

use async_trait::async_trait;
use grabbot::{
    BackendAdapter, BackendOutcome, FallbackChain, LocalMedia, MediaLocator, MediaResolver,
    Platform, ResolveResult,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy)]
enum Reply {
    Remote(&'static str),
    NotFound,
    Transport,
    Parse,
}

/// Returns a fixed outcome and counts how often it was asked.
struct Scripted {
    id: &'static str,
    reply: Reply,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(id: &'static str, reply: Reply) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let adapter = Arc::new(Self {
            id,
            reply,
            calls: calls.clone(),
        });
        (adapter, calls)
    }
}

#[async_trait]
impl BackendAdapter for Scripted {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn resolve(&self, _url: &str, _timeout: Duration) -> BackendOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Reply::Remote(url) => MediaLocator::remote(url).into(),
            Reply::NotFound => BackendOutcome::NotFound("declined".into()),
            Reply::Transport => BackendOutcome::TransportError("connection reset".into()),
            Reply::Parse => BackendOutcome::ParseError("token missing".into()),
        }
    }
}

/// Writes a file into its own directory under `work_dir`, then behaves per `mode`.
struct Downloads {
    work_dir: PathBuf,
    mode: DownloadMode,
    started: Arc<Notify>,
}

#[derive(Clone, Copy)]
enum DownloadMode {
    Succeed,
    FailAfterWriting,
    HangAfterWriting,
}

#[async_trait]
impl BackendAdapter for Downloads {
    fn id(&self) -> &'static str {
        "downloads"
    }

    async fn resolve(&self, _url: &str, _timeout: Duration) -> BackendOutcome {
        let workspace = tempfile::tempdir_in(&self.work_dir).unwrap();
        let file = workspace.path().join("video.mp4");
        tokio::fs::write(&file, vec![7u8; 4096]).await.unwrap();
        self.started.notify_one();

        match self.mode {
            DownloadMode::Succeed => match LocalMedia::adopt(workspace, file).await {
                Ok(media) => BackendOutcome::Success(MediaLocator::Local(media)),
                Err(e) => BackendOutcome::LocalResourceError(e.to_string()),
            },
            DownloadMode::FailAfterWriting => {
                BackendOutcome::ParseError("muxing failed".into())
            }
            DownloadMode::HangAfterWriting => {
                let _keep = workspace;
                std::future::pending().await
            }
        }
    }
}

fn tiktok_resolver(adapters: Vec<Arc<dyn BackendAdapter>>) -> MediaResolver {
    MediaResolver::new(FallbackChain::new(
        vec![],
        vec![],
        adapters,
        Duration::from_secs(15),
    ))
}

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

const TIKTOK_URL: &str = "https://www.tiktok.com/@someone/video/7234567890123456789";

#[tokio::test]
async fn first_success_short_circuits_the_chain() {
    let (first, first_calls) = Scripted::new("ssstik", Reply::Remote("https://cdn.example/1.mp4"));
    let (second, second_calls) = Scripted::new("snaptik", Reply::Remote("https://cdn.example/2.mp4"));
    let (third, third_calls) = Scripted::new("tikwm", Reply::Remote("https://cdn.example/3.mp4"));

    let resolver = tiktok_resolver(vec![first, second, third]);
    let result = resolver.resolve(TIKTOK_URL).await;

    assert_eq!(
        result,
        ResolveResult::Ready(MediaLocator::remote("https://cdn.example/1.mp4").unwrap())
    );
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    assert_eq!(third_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn falls_through_failures_to_last_backend() {
    let (first, first_calls) = Scripted::new("ssstik", Reply::Parse);
    let (second, second_calls) = Scripted::new("snaptik", Reply::Transport);
    let (third, third_calls) = Scripted::new("tikwm", Reply::Remote("https://cdn.example/v.mp4"));

    let resolver = tiktok_resolver(vec![first, second, third]);
    let result = resolver.resolve(TIKTOK_URL).await;

    match result {
        ResolveResult::Ready(locator) => {
            assert_eq!(locator.remote_url(), Some("https://cdn.example/v.mp4"))
        }
        other => panic!("expected Ready, got {:?}", other),
    }
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    assert_eq!(third_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn exhausted_chain_reports_failed_platform() {
    let (first, _) = Scripted::new("ssstik", Reply::NotFound);
    let (second, _) = Scripted::new("snaptik", Reply::Parse);
    let (third, third_calls) = Scripted::new("tikwm", Reply::Transport);

    let resolver = tiktok_resolver(vec![first, second, third]);
    assert_eq!(
        resolver.resolve(TIKTOK_URL).await,
        ResolveResult::Failed(Platform::TikTok)
    );
    assert_eq!(third_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unsupported_url_never_reaches_a_backend() {
    let (yt, yt_calls) = Scripted::new("yt", Reply::Remote("https://a/1.mp4"));
    let (ig, ig_calls) = Scripted::new("ig", Reply::Remote("https://a/2.mp4"));
    let (tt, tt_calls) = Scripted::new("tt", Reply::Remote("https://a/3.mp4"));
    let resolver = MediaResolver::new(FallbackChain::new(
        vec![yt],
        vec![ig],
        vec![tt],
        Duration::from_secs(15),
    ));

    for url in ["https://vimeo.com/123", "hello there", "", "ftp://example.org/video.mp4"] {
        assert_eq!(resolver.resolve(url).await, ResolveResult::Unsupported);
    }
    let total = yt_calls.load(Ordering::SeqCst)
        + ig_calls.load(Ordering::SeqCst)
        + tt_calls.load(Ordering::SeqCst);
    assert_eq!(total, 0);
}

#[tokio::test]
async fn platform_routes_to_its_own_chain() {
    let (yt, yt_calls) = Scripted::new("yt", Reply::NotFound);
    let (ig, ig_calls) = Scripted::new("ig", Reply::Remote("https://cdn.example/reel.mp4"));
    let (tt, tt_calls) = Scripted::new("tt", Reply::NotFound);
    let resolver = MediaResolver::new(FallbackChain::new(
        vec![yt],
        vec![ig],
        vec![tt],
        Duration::from_secs(15),
    ));

    let result = resolver
        .resolve("https://www.instagram.com/reel/Cabc123/")
        .await;
    assert!(result.is_ready());
    assert_eq!(ig_calls.load(Ordering::SeqCst), 1);
    assert_eq!(yt_calls.load(Ordering::SeqCst), 0);
    assert_eq!(tt_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn resolving_twice_gives_the_same_result() {
    let (first, _) = Scripted::new("ssstik", Reply::Parse);
    let (second, _) = Scripted::new("snaptik", Reply::Remote("https://cdn.example/same.mp4"));
    let resolver = tiktok_resolver(vec![first, second]);

    let once = resolver.resolve(TIKTOK_URL).await;
    let twice = resolver.resolve(TIKTOK_URL).await;
    assert_eq!(once, twice);

    let (only, _) = Scripted::new("tikwm", Reply::NotFound);
    let failing = tiktok_resolver(vec![only]);
    assert_eq!(
        failing.resolve(TIKTOK_URL).await,
        failing.resolve(TIKTOK_URL).await
    );
}

#[tokio::test]
async fn local_file_is_removed_once_result_is_dropped() {
    let work_dir = tempfile::tempdir().unwrap();
    let adapter = Arc::new(Downloads {
        work_dir: work_dir.path().to_path_buf(),
        mode: DownloadMode::Succeed,
        started: Arc::new(Notify::new()),
    });
    let resolver = MediaResolver::new(FallbackChain::new(
        vec![adapter],
        vec![],
        vec![],
        Duration::from_secs(15),
    ));

    let result = resolver.resolve("https://youtu.be/dQw4w9WgXcQ").await;
    let path = match &result {
        ResolveResult::Ready(MediaLocator::Local(media)) => {
            assert_eq!(media.size(), 4096);
            media.path().to_path_buf()
        }
        other => panic!("expected a local file, got {:?}", other),
    };
    assert!(path.exists());

    drop(result);
    assert!(!path.exists());
    assert_eq!(entries(work_dir.path()), 0);
}

#[tokio::test]
async fn failed_download_leaves_nothing_behind() {
    let work_dir = tempfile::tempdir().unwrap();
    let adapter = Arc::new(Downloads {
        work_dir: work_dir.path().to_path_buf(),
        mode: DownloadMode::FailAfterWriting,
        started: Arc::new(Notify::new()),
    });
    let resolver = MediaResolver::new(FallbackChain::new(
        vec![adapter],
        vec![],
        vec![],
        Duration::from_secs(15),
    ));

    let result = resolver
        .resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .await;
    assert_eq!(result, ResolveResult::Failed(Platform::YouTube));
    assert_eq!(entries(work_dir.path()), 0);
}

#[tokio::test]
async fn cancellation_mid_download_cleans_up() {
    let work_dir = tempfile::tempdir().unwrap();
    let started = Arc::new(Notify::new());
    let adapter = Arc::new(Downloads {
        work_dir: work_dir.path().to_path_buf(),
        mode: DownloadMode::HangAfterWriting,
        started: started.clone(),
    });
    let resolver = MediaResolver::new(FallbackChain::new(
        vec![adapter],
        vec![],
        vec![],
        Duration::from_secs(3600),
    ));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let observer = work_dir.path().to_path_buf();
    tokio::spawn(async move {
        started.notified().await;
        assert_eq!(entries(&observer), 1, "download dir should exist mid-flight");
        trigger.cancel();
    });

    let result = resolver
        .resolve_until("https://www.youtube.com/watch?v=dQw4w9WgXcQ", &cancel)
        .await;
    assert_eq!(result, ResolveResult::Failed(Platform::YouTube));
    assert_eq!(entries(work_dir.path()), 0);
}

#[tokio::test(start_paused = true)]
async fn outer_budget_cuts_off_a_hanging_request() {
    let work_dir = tempfile::tempdir().unwrap();
    let adapter = Arc::new(Downloads {
        work_dir: work_dir.path().to_path_buf(),
        mode: DownloadMode::HangAfterWriting,
        started: Arc::new(Notify::new()),
    });
    let resolver = MediaResolver::new(FallbackChain::new(
        vec![adapter],
        vec![],
        vec![],
        Duration::from_secs(3600),
    ))
    .with_request_timeout(Duration::from_secs(30));

    let result = resolver.resolve("https://youtu.be/abc").await;
    assert_eq!(result, ResolveResult::Failed(Platform::YouTube));
    assert_eq!(entries(work_dir.path()), 0);
}
