//! Prompt templates for CruX.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of practice questions the cheat sheet quiz asks for.
pub const QUIZ_QUESTIONS: usize = 5;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub cheat_sheet: CheatSheetPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for turning a lecture transcript into a cheat sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheatSheetPrompts {
    pub system: String,
    pub user: String,
}

impl Default for CheatSheetPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert professor who writes concise, accurate study material for students.
Write in Markdown. Use headings for each section and bullet lists where they help scanning.
Only use information found in the transcript."#
                .to_string(),

            user: r#"Create a Cheat Sheet from this lecture transcript.

Include these sections, in this order:
1. Summary: a short overview of the lecture
2. Core Concepts: the main ideas, each explained in one or two sentences
3. Key Terms: important terminology with brief definitions
4. Practice Exam: {{quiz_questions}} questions that test the core concepts
5. Answer Key: the answers to the practice exam

Transcript:
{{transcript}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let cheat_sheet_path = custom_path.join("cheatsheet.toml");
            if cheat_sheet_path.exists() {
                let content = std::fs::read_to_string(&cheat_sheet_path)?;
                prompts.cheat_sheet = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are expanded in one pass over the template, so text
    /// inserted for one variable is never expanded again. Unknown
    /// placeholders are left as they are.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                rest = &rest[start..];
                break;
            };

            let key = &after[..end];
            match vars.get(key) {
                Some(value) => result.push_str(value),
                None => {
                    result.push_str("{{");
                    result.push_str(key);
                    result.push_str("}}");
                }
            }
            rest = &after[end + 2..];
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Build the cheat sheet user prompt for a transcript.
    pub fn cheat_sheet_request(&self, transcript: &str) -> String {
        let mut vars = std::collections::HashMap::new();
        vars.insert("quiz_questions".to_string(), QUIZ_QUESTIONS.to_string());
        vars.insert("transcript".to_string(), transcript.to_string());
        self.render_with_custom(&self.cheat_sheet.user, &vars)
    }
}
