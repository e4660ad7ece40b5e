//! HTTP clients for the external mood analysis providers.

pub mod gemini;
pub mod openai;
