//! AI module for tablescribe.
//!
//! Contains the chat-completion client used by the two-stage annotation
//! protocol, behind the [`ChatService`] seam so the pipeline can be driven by
//! a scripted stub in tests.

pub mod client;

pub use client::{ChatService, OpenAiChat};
