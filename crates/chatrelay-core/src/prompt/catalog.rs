//! Prompt catalog loading and validation.
//!
//! Parses a JSON document into a [`PromptSet`]. Every required field is
//! checked in one pass so a broken catalog reports all of its problems at
//! once. The legacy key names used by older deployments are accepted as
//! aliases of the canonical field names.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use chatrelay_types::error::ConfigError;
use chatrelay_types::prompt::PromptSet;

/// (canonical name, legacy alias)
const STRING_FIELDS: [(&str, &str); 8] = [
    ("text_system_prompt", "text"),
    ("image_system_prompt", "image"),
    ("locale_force_suffix", "zh_tw_force"),
    ("user_suffix", "zh_tw_user_suffix"),
    ("reset_reply", "reset_reply"),
    ("api_error_reply", "api_error"),
    ("image_error_reply", "image_error"),
    ("image_user_prompt", "image_user"),
];

const RESET_COMMANDS: (&str, &str) = ("reset_commands", "reset_cmds");

/// Immutable, shareable handle to the loaded prompt set.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    prompts: Arc<PromptSet>,
}

impl PromptCatalog {
    /// Parse and validate a catalog from JSON text.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(source).map_err(|e| ConfigError::Parse {
            path: "prompt catalog".to_string(),
            reason: e.to_string(),
        })?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON document.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let object = value.as_object().ok_or_else(|| ConfigError::MalformedPrompt {
            field: "<root>".to_string(),
            reason: "expected a JSON object".to_string(),
        })?;

        let mut missing = Vec::new();
        let mut strings: HashMap<&str, String> = HashMap::with_capacity(STRING_FIELDS.len());

        for (name, alias) in STRING_FIELDS {
            match lookup(object, name, alias) {
                Some(Value::String(s)) => {
                    strings.insert(name, s.clone());
                }
                Some(_) => {
                    return Err(ConfigError::MalformedPrompt {
                        field: name.to_string(),
                        reason: "expected a string".to_string(),
                    });
                }
                None => missing.push(name.to_string()),
            }
        }

        let reset_commands = match lookup(object, RESET_COMMANDS.0, RESET_COMMANDS.1) {
            Some(value) => Some(parse_reset_commands(value)?),
            None => {
                missing.push(RESET_COMMANDS.0.to_string());
                None
            }
        };

        if !missing.is_empty() {
            return Err(ConfigError::MissingPromptFields(missing));
        }

        let mut take = |name: &str| strings.remove(name).unwrap_or_default();

        let prompts = PromptSet {
            text_system_prompt: take("text_system_prompt"),
            image_system_prompt: take("image_system_prompt"),
            locale_force_suffix: take("locale_force_suffix"),
            user_suffix: take("user_suffix"),
            reset_reply: take("reset_reply"),
            api_error_reply: take("api_error_reply"),
            image_error_reply: take("image_error_reply"),
            image_user_prompt: take("image_user_prompt"),
            reset_commands: reset_commands.unwrap_or_default(),
        };

        Ok(Self {
            prompts: Arc::new(prompts),
        })
    }

    /// Wrap an already-built prompt set.
    pub fn new(prompts: PromptSet) -> Self {
        Self {
            prompts: Arc::new(prompts),
        }
    }

    pub fn prompts(&self) -> &PromptSet {
        &self.prompts
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, name: &str, alias: &str) -> Option<&'a Value> {
    object.get(name).or_else(|| object.get(alias))
}

fn parse_reset_commands(value: &Value) -> Result<Vec<String>, ConfigError> {
    let malformed = |reason: &str| ConfigError::MalformedPrompt {
        field: RESET_COMMANDS.0.to_string(),
        reason: reason.to_string(),
    };

    let items = value
        .as_array()
        .ok_or_else(|| malformed("expected an array of strings"))?;

    let mut commands = Vec::with_capacity(items.len());
    for item in items {
        let cmd = item
            .as_str()
            .ok_or_else(|| malformed("expected an array of strings"))?
            .trim()
            .to_lowercase();
        if !cmd.is_empty() && !commands.contains(&cmd) {
            commands.push(cmd);
        }
    }

    if commands.is_empty() {
        return Err(malformed("at least one non-blank command is required"));
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canonical() -> Value {
        json!({
            "text_system_prompt": "You are a helpful assistant.",
            "image_system_prompt": "You describe images.",
            "locale_force_suffix": " Reply in Traditional Chinese.",
            "user_suffix": "（請用繁體中文回答）",
            "reset_commands": ["reset", " /Clear "],
            "reset_reply": "History cleared.",
            "api_error_reply": "The model is unavailable.",
            "image_error_reply": "The image could not be analysed.",
            "image_user_prompt": "Please describe this image."
        })
    }

    #[test]
    fn test_load_canonical_names() {
        let catalog = PromptCatalog::from_value(&canonical()).unwrap();
        let p = catalog.prompts();
        assert_eq!(p.text_system_prompt, "You are a helpful assistant.");
        assert_eq!(p.reset_commands, vec!["reset".to_string(), "/clear".to_string()]);
        assert_eq!(p.image_user_prompt, "Please describe this image.");
    }

    #[test]
    fn test_load_legacy_names() {
        let legacy = json!({
            "text": "t",
            "image": "i",
            "zh_tw_force": "f",
            "zh_tw_user_suffix": "s",
            "reset_cmds": ["清除"],
            "reset_reply": "r",
            "api_error": "a",
            "image_error": "e",
            "image_user": "u",
            "image_success": "ignored extra key"
        });
        let catalog = PromptCatalog::from_value(&legacy).unwrap();
        let p = catalog.prompts();
        assert_eq!(p.text_system(), "tf");
        assert_eq!(p.image_system(), "if");
        assert_eq!(p.user_suffix, "s");
        assert!(p.is_reset_command(" 清除 "));
        assert_eq!(p.api_error_reply, "a");
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let mut value = canonical();
        let obj = value.as_object_mut().unwrap();
        obj.remove("reset_reply");
        obj.remove("image_user_prompt");
        obj.remove("reset_commands");

        match PromptCatalog::from_value(&value) {
            Err(ConfigError::MissingPromptFields(fields)) => {
                assert_eq!(
                    fields,
                    vec!["reset_reply", "image_user_prompt", "reset_commands"]
                );
            }
            other => panic!("expected MissingPromptFields, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let mut value = canonical();
        value["api_error_reply"] = json!(42);
        assert!(matches!(
            PromptCatalog::from_value(&value),
            Err(ConfigError::MalformedPrompt { field, .. }) if field == "api_error_reply"
        ));

        let mut value = canonical();
        value["reset_commands"] = json!("reset");
        assert!(matches!(
            PromptCatalog::from_value(&value),
            Err(ConfigError::MalformedPrompt { field, .. }) if field == "reset_commands"
        ));
    }

    #[test]
    fn test_blank_reset_commands_rejected() {
        let mut value = canonical();
        value["reset_commands"] = json!(["  ", ""]);
        assert!(matches!(
            PromptCatalog::from_value(&value),
            Err(ConfigError::MalformedPrompt { .. })
        ));
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(PromptCatalog::from_json_str("[1, 2]").is_err());
        assert!(matches!(
            PromptCatalog::from_json_str("{ not json"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_catalog_clone_shares_prompts() {
        let catalog = PromptCatalog::from_value(&canonical()).unwrap();
        let other = catalog.clone();
        assert!(std::ptr::eq(catalog.prompts(), other.prompts()));
    }
}
