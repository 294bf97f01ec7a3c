//! grabbot library

pub mod delivery;
pub mod extractor;
pub mod handler;
pub mod resolver;
pub mod utils;

// Re-export main types for easier use
pub use delivery::{DeliveryDecision, DeliverySelector, RejectReason};
pub use extractor::{
    classify, BackendAdapter, BackendOutcome, FallbackChain, LocalMedia, MediaLocator, Platform,
};
pub use handler::{Handled, MessageHandler, Messenger, Notice};
pub use resolver::{MediaResolver, ResolveResult};
pub use utils::{BackendError, GrabError, Settings};
