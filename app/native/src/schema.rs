//! JSON Schema generation for the configuration file.

use schemars::schema_for;

use crate::config::DeskshellConfig;

/// Returns the configuration JSON Schema, pretty-printed.
#[must_use]
pub fn print_schema() -> String {
    let schema = schema_for!(DeskshellConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_describes_all_sections() {
        let schema: serde_json::Value = serde_json::from_str(&print_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for section in ["snap", "windows", "monitors", "interaction", "grid", "events"] {
            assert!(properties.contains_key(section), "missing {section}");
        }
    }
}
