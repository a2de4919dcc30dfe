//! Inference backend implementations for Orangutan.
//!
//! All providers implement the `orangutan_core::Provider` trait. The only
//! backend today is a local Ollama server.

pub mod ollama;

pub use ollama::OllamaProvider;
