//! Anthropic Claude provider.

mod client;
mod types;

pub use client::AnthropicProvider;
