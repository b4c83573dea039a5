//! Rust SDK for the Parallel API.
//!
//! Parallel offers web search, page extraction, long-running research tasks
//! and chat completions over a JSON REST API. This crate wraps each endpoint
//! in a typed async method and adds [`Client::poll_until_complete`] to wait
//! on task runs.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use parallel::{ChatMessage, ChatRequest, Client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), parallel::Error> {
//!     let client = Client::from_env()?;
//!
//!     let response = client.chat(ChatRequest {
//!         model: "speed".into(),
//!         messages: vec![ChatMessage::user("What is the capital of France?")],
//!         ..Default::default()
//!     }).await?;
//!
//!     if let Some(choice) = response.choices.first() {
//!         println!("{}", choice.message.content);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod poll;
mod types;
mod version;

pub use client::{
    AuthScheme, Client, ClientBuilder, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BETA_TAG,
};
pub use error::{Error, Result};
pub use poll::{cancel_channel, CancelHandle, CancelToken};
pub use types::*;
pub use version::SDK_VERSION;
