pub mod chain;
pub mod models;
pub mod platform;
pub mod services;
pub mod traits;
pub mod ytdlp;

pub use chain::FallbackChain;
pub use models::{BackendOutcome, LocalMedia, MediaLocator, RemoteUrl};
pub use platform::{classify, Platform, ResolutionRequest};
pub use traits::BackendAdapter;
pub use ytdlp::YtDlpAdapter;
