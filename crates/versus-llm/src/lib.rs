//! OpenAI-compatible chat-completion client.
//!
//! Both providers Versus talks to (the completion provider used for spelling,
//! synthesis and winner picks, and the grounded research provider) speak the
//! same `POST /chat/completions` dialect. [`ChatClient`] wraps `reqwest` with
//! bearer auth, provider error extraction and retry on transient failures.

pub mod client;
pub mod error;
pub mod types;

mod retry;

pub use client::{ChatClient, ClientOptions};
pub use error::LlmError;
pub use types::{ChatCompletion, ChatMessage, ChatRequest, ResponseFormat, Role};
