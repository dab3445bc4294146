//! Session and transcript management.

pub mod repository;
pub mod service;
