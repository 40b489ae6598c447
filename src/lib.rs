//! Library root for `scout-bot`.
//!
//! Scout-bot is an OpenAI-powered opportunity scout for Slack workspaces designed to:
//! - Watch channel traffic delivered through the Events API webhook
//! - Score each message's relevance to a fixed marketing/advertising profile
//! - DM the operator a formatted alert with a suggested reply when a message matters
//!
//! The bot integrates with Slack for chat and OpenAI for relevance scoring.
//! The architecture is built around extensible traits that allow for
//! different implementations of each service.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the scout-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with chat and LLM clients
/// - Starts the webhook listener
pub async fn start(config: Config) -> Void {
    info!("Starting scout-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().unwrap();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
