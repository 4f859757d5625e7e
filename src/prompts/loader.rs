use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use super::templates::{SUMMARY_DEFAULT, SYSTEM_DEFAULT};

/// Loads prompt overrides from `<data>/prompts`, falling back to built-in defaults
pub struct PromptLoader {
    prompts_dir: PathBuf,
}

impl PromptLoader {
    pub fn new(data_path: impl AsRef<Path>) -> Self {
        Self {
            prompts_dir: data_path.as_ref().join("prompts"),
        }
    }

    /// Load the narrator system prompt, using the default if no override exists
    pub fn load_system(&self) -> Result<String> {
        self.load_or(&["system.md", "narrator.md"], SYSTEM_DEFAULT)
    }

    /// Load the history summarization instruction
    pub fn load_summary(&self) -> Result<String> {
        self.load_or(&["summary.md"], SUMMARY_DEFAULT)
    }

    fn load_or(&self, candidates: &[&str], default: &str) -> Result<String> {
        for name in candidates {
            let path = self.prompts_dir.join(name);
            if path.exists() {
                log::debug!("Loading prompt override from: {:?}", path);
                let text = fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("Failed to read prompt {:?}: {}", path, e))?;
                return Ok(text.trim().to_string());
            }
        }

        log::debug!("Using default prompt for {}", candidates[0]);
        Ok(default.to_string())
    }
}
