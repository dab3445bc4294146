//! Infrastructure layer for Colloquy.
//!
//! Contains implementations of the ports defined in `colloquy-core`:
//! SQLite storage, the Anthropic completion client, the speech-to-text
//! subprocess runner, and the text-to-speech HTTP client.

pub mod config;
pub mod llm;
pub mod paths;
pub mod speech;
pub mod sqlite;
