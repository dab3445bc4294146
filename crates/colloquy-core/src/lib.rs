//! Business logic and repository trait definitions for Colloquy.
//!
//! This crate defines the "ports" (repository and provider traits) that the
//! infrastructure layer implements. It depends only on `colloquy-types` --
//! never on `colloquy-infra` or any database/IO crate.

pub mod analysis;
pub mod llm;
pub mod scenario;
pub mod session;
pub mod turn;
