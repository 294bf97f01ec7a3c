//! grabbot - resolve social video links to playable media
//!
//! Wires the resolver to a console "transport" so the pipeline can be driven
//! from a shell. A chat transport plugs into the same `MessageHandler`.

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use grabbot::{
    DeliveryDecision, DeliverySelector, MediaLocator, MediaResolver, MessageHandler, Messenger,
    Notice, ResolveResult, Settings,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one URL and print the delivery decision
    Resolve {
        url: String,

        /// Copy a downloaded file here before it is cleaned up
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Run a chat message through the full handler, replies go to stdout
    Handle { text: String },
}

struct ConsoleMessenger;

#[async_trait]
impl Messenger for ConsoleMessenger {
    async fn send_notice(&self, notice: Notice) -> Result<()> {
        println!("[notice] {}", notice);
        Ok(())
    }

    async fn send_video(&self, media: &MediaLocator) -> Result<()> {
        println!("[video] {}", describe(media));
        Ok(())
    }

    async fn send_document(&self, media: &MediaLocator) -> Result<()> {
        println!("[document] {}", describe(media));
        Ok(())
    }
}

fn describe(media: &MediaLocator) -> String {
    match media {
        MediaLocator::Remote(url) => url.as_str().to_string(),
        MediaLocator::Local(file) => format!("{} ({} bytes)", file.path().display(), file.size()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    let resolver = MediaResolver::from_settings(&settings)?;
    let selector = DeliverySelector::from_settings(&settings);

    match args.command {
        Command::Resolve { url, save } => {
            let locator = match resolver.resolve(&url).await {
                ResolveResult::Ready(locator) => locator,
                ResolveResult::Unsupported => {
                    println!("{}", Notice::Unsupported);
                    return Ok(());
                }
                ResolveResult::Failed(platform) => {
                    println!("{}", Notice::Failed(platform));
                    return Ok(());
                }
            };

            if let (Some(dest), Some(file)) = (save.as_ref(), locator.local()) {
                let copied = file.copy_to(dest).await?;
                println!("saved {} bytes to {}", copied, dest.display());
            }

            match selector.decide(locator) {
                DeliveryDecision::SendAsVideo(media) => println!("video: {}", describe(&media)),
                DeliveryDecision::SendAsDocument(media) => {
                    println!("document: {}", describe(&media))
                }
                DeliveryDecision::Reject(reason) => println!("rejected: {}", reason),
            }
        }
        Command::Handle { text } => {
            let handler = MessageHandler::new(resolver, selector);
            let handled = handler.handle(&text, &ConsoleMessenger).await?;
            tracing::debug!("Handled message as {:?}", handled);
        }
    }

    Ok(())
}
