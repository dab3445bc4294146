//! Speech I/O: the speech-to-text subprocess runner and the
//! text-to-speech HTTP client.

pub mod transcriber;
pub mod voice;
