//! Shared domain types for Colloquy.
//!
//! This crate contains the core domain types used across the Colloquy
//! platform: Session, TranscriptMessage, Analysis, Scenario, and their
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod analysis;
pub mod config;
pub mod error;
pub mod llm;
pub mod scenario;
pub mod session;
