//! Client for a local Ollama-compatible model service.
//!
//! This crate provides:
//! - [`OllamaClient`] — chat completions over `POST /api/chat`, plain,
//!   JSON-formatted, or streamed
//! - [`structured`] — parse a model reply into a typed structure with one
//!   corrective retry when the first reply fails validation

pub mod client;
pub mod structured;

pub use client::{ChatMessage, OllamaClient};
pub use structured::{parse_structured, request_structured, strip_code_fences};
