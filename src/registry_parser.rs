use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::registry_value::DocumentEntry;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Reads backup documents: a YAML sequence of `[name, [values...], type]`.
pub struct DocumentParser;

impl DocumentParser {
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<DocumentEntry>, DocumentError> {
        let text = fs::read_to_string(path)?;
        self.load_from_text(&text)
    }

    pub fn load_from_text(&self, text: &str) -> Result<Vec<DocumentEntry>, DocumentError> {
        // A file holding only comments is an empty backup.
        let has_content = text.lines().any(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#') && trimmed != "---"
        });
        if !has_content {
            return Ok(Vec::new());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}
