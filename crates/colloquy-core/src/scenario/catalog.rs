//! Scenario catalog loaded from static TOML files.
//!
//! Each `<id>.toml` in the scenarios directory describes one conversation
//! template. The catalog is read once at startup and never mutated; a
//! malformed file is logged and skipped rather than failing the load.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use colloquy_types::scenario::Scenario;

/// In-memory catalog of scenarios, keyed by scenario id.
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: HashMap<String, Scenario>,
}

impl ScenarioCatalog {
    /// Build a catalog from already-parsed scenarios (used by tests and
    /// embedded defaults).
    pub fn from_scenarios(scenarios: Vec<Scenario>) -> Self {
        Self {
            scenarios: scenarios.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    /// Load every `*.toml` file under `dir`.
    ///
    /// The file stem must match the `id` field inside the file; mismatches
    /// and parse failures are logged and skipped. A missing directory
    /// yields an empty catalog.
    pub async fn load_from_dir(dir: &Path) -> Self {
        let mut scenarios = HashMap::new();

        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), %err, "Scenario directory unreadable, catalog is empty");
                return Self::default();
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            match load_scenario_file(&path).await {
                Ok(scenario) => {
                    debug!(id = %scenario.id, "Loaded scenario");
                    scenarios.insert(scenario.id.clone(), scenario);
                }
                Err(err) => {
                    warn!(file = %path.display(), %err, "Skipping malformed scenario file");
                }
            }
        }

        Self { scenarios }
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.get(id)
    }

    /// All scenarios, sorted by display name for stable listings.
    pub fn list(&self) -> Vec<&Scenario> {
        let mut all: Vec<&Scenario> = self.scenarios.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

async fn load_scenario_file(path: &Path) -> Result<Scenario, String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("read failed: {e}"))?;
    let scenario: Scenario = toml::from_str(&content).map_err(|e| format!("parse failed: {e}"))?;

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if scenario.id != stem {
        return Err(format!(
            "id '{}' does not match file stem '{stem}'",
            scenario.id
        ));
    }
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONFLICT_TOML: &str = r#"
id = "workplace-conflict"
name = "Workplace Conflict"
description = "A tense conversation with a frustrated colleague."
system_prompt = "You are Jordan, upset about a missed handoff."
character_name = "Jordan"
opening_message = "Hey, can we chat?"
"#;

    #[tokio::test]
    async fn load_from_dir_parses_valid_files() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("workplace-conflict.toml"), CONFLICT_TOML)
            .await
            .unwrap();

        let catalog = ScenarioCatalog::load_from_dir(tmp.path()).await;
        assert_eq!(catalog.len(), 1);
        let scenario = catalog.get("workplace-conflict").unwrap();
        assert_eq!(scenario.opening_message, "Hey, can we chat?");
    }

    #[tokio::test]
    async fn load_from_dir_skips_malformed_files() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("workplace-conflict.toml"), CONFLICT_TOML)
            .await
            .unwrap();
        tokio::fs::write(tmp.path().join("broken.toml"), "not { valid toml")
            .await
            .unwrap();

        let catalog = ScenarioCatalog::load_from_dir(tmp.path()).await;
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("broken").is_none());
    }

    #[tokio::test]
    async fn load_from_dir_skips_stem_mismatch() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("renamed.toml"), CONFLICT_TOML)
            .await
            .unwrap();

        let catalog = ScenarioCatalog::load_from_dir(tmp.path()).await;
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn load_from_missing_dir_is_empty() {
        let catalog = ScenarioCatalog::load_from_dir(Path::new("/nonexistent/scenarios")).await;
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn load_ignores_non_toml_files() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("notes.md"), "# notes")
            .await
            .unwrap();

        let catalog = ScenarioCatalog::load_from_dir(tmp.path()).await;
        assert!(catalog.is_empty());
    }

    #[test]
    fn list_sorts_by_name() {
        let mk = |id: &str, name: &str| Scenario {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            system_prompt: String::new(),
            character_name: String::new(),
            opening_message: String::new(),
        };
        let catalog =
            ScenarioCatalog::from_scenarios(vec![mk("b", "Beta"), mk("a", "Alpha")]);
        let names: Vec<&str> = catalog.list().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }
}
