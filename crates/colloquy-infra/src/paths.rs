//! Data directory resolution.

use std::path::PathBuf;

/// Resolve the Colloquy data directory.
///
/// Order: `COLLOQUY_DATA_DIR` env var, then `~/.colloquy`, then a
/// `.colloquy` directory relative to the current directory.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("COLLOQUY_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".colloquy");
    }

    PathBuf::from(".colloquy")
}

/// The scenario catalog directory inside the data dir.
pub fn scenarios_dir(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("scenarios")
}
