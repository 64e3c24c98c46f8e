//! The prompt catalog record loaded once at startup.

use serde::Serialize;

/// Named prompt fragments and reset-command tokens.
///
/// Every field is required. Construction goes through the prompt catalog
/// loader in `chatrelay-core`, which validates all fields at once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptSet {
    pub text_system_prompt: String,
    pub image_system_prompt: String,
    pub locale_force_suffix: String,
    pub user_suffix: String,
    /// Trimmed, lowercased trigger tokens.
    pub reset_commands: Vec<String>,
    pub reset_reply: String,
    pub api_error_reply: String,
    pub image_error_reply: String,
    pub image_user_prompt: String,
}

impl PromptSet {
    /// Whether `text` is a reset command (case-insensitive, whitespace-trimmed).
    pub fn is_reset_command(&self, text: &str) -> bool {
        let normalized = text.trim().to_lowercase();
        self.reset_commands.iter().any(|cmd| *cmd == normalized)
    }

    /// System prompt for text conversations, locale suffix included.
    pub fn text_system(&self) -> String {
        format!("{}{}", self.text_system_prompt, self.locale_force_suffix)
    }

    /// System prompt for image descriptions, locale suffix included.
    pub fn image_system(&self) -> String {
        format!("{}{}", self.image_system_prompt, self.locale_force_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompts() -> PromptSet {
        PromptSet {
            text_system_prompt: "You are helpful.".to_string(),
            image_system_prompt: "Describe images.".to_string(),
            locale_force_suffix: " Answer in English.".to_string(),
            user_suffix: " (be brief)".to_string(),
            reset_commands: vec!["reset".to_string(), "/clear".to_string()],
            reset_reply: "History cleared.".to_string(),
            api_error_reply: "Backend unavailable.".to_string(),
            image_error_reply: "Could not read the image.".to_string(),
            image_user_prompt: "What is in this picture?".to_string(),
        }
    }

    #[test]
    fn test_reset_command_matching() {
        let p = prompts();
        assert!(p.is_reset_command("reset"));
        assert!(p.is_reset_command("  Reset  "));
        assert!(p.is_reset_command("/CLEAR\n"));
        assert!(!p.is_reset_command("reset please"));
        assert!(!p.is_reset_command(""));
    }

    #[test]
    fn test_system_prompts_append_locale_suffix() {
        let p = prompts();
        assert_eq!(p.text_system(), "You are helpful. Answer in English.");
        assert_eq!(p.image_system(), "Describe images. Answer in English.");
    }
}
