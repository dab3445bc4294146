//! Scenario catalog types for Colloquy.
//!
//! A scenario is a reusable conversation template: the character the model
//! plays, the system prompt that shapes it, and the opening line every
//! session starts with. Scenarios are loaded from static TOML files and
//! never mutated by the core.

use serde::{Deserialize, Serialize};

/// A conversation template from the static catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Catalog key; also the file stem of the scenario's TOML file.
    pub id: String,
    pub name: String,
    pub description: String,
    /// System prompt for the role-played character.
    pub system_prompt: String,
    /// Display name of the character (e.g., "Jordan from Accounting").
    pub character_name: String,
    /// The assistant message every session opens with, at position 0.
    pub opening_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_from_toml() {
        let toml_src = r#"
id = "workplace-conflict"
name = "Workplace Conflict"
description = "A tense conversation with a frustrated colleague."
system_prompt = "You are Jordan, upset about a missed handoff."
character_name = "Jordan"
opening_message = "Hey, can we chat?"
"#;
        let scenario: Scenario = toml::from_str(toml_src).unwrap();
        assert_eq!(scenario.id, "workplace-conflict");
        assert_eq!(scenario.opening_message, "Hey, can we chat?");
    }

    #[test]
    fn test_scenario_toml_missing_field_errors() {
        let toml_src = r#"
id = "incomplete"
name = "Incomplete"
"#;
        assert!(toml::from_str::<Scenario>(toml_src).is_err());
    }
}
