//! HTTP client for the Langbase pipes used by generative refinement.

mod client;
mod types;


pub use client::LangbaseClient;
pub use types::{
    strip_code_fence, CreatePipeRequest, CreatePipeResponse, Message, MessageRole,
    PainSuggestion, PipeRequest, PipeResponse, PolishResponse, RawResponse, Usage,
};
