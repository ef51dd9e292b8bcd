use std::fs;
use std::path::Path;

use crate::registry_key::RegistryItem;
use crate::registry_parser::DocumentError;

/// Serializes a [`RegistryItem`] as a backup document.
pub struct DocumentWriter {
    pub header: bool,
}

impl DocumentWriter {
    pub fn new() -> Self {
        Self { header: true }
    }

    pub fn write_to_string(&self, item: &RegistryItem) -> Result<String, DocumentError> {
        let mut out = String::new();
        if self.header {
            out.push_str("# Registry key: ");
            out.push_str(&item.location().to_string());
            out.push('\n');
            out.push_str("# Exported: ");
            out.push_str(&chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
            out.push('\n');
        }
        if item.is_empty() {
            out.push_str("[]\n");
        } else {
            out.push_str(&serde_yaml::to_string(&item.to_document())?);
        }
        Ok(out)
    }

    /// Writes a sibling `.tmp` file, then renames it over `path`.
    pub fn write_to_file<P: AsRef<Path>>(&self, item: &RegistryItem, path: P) -> Result<(), DocumentError> {
        let content = self.write_to_string(item)?;
        let mut tmp = path.as_ref().to_path_buf();
        let file_name = tmp
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "environment.yml".into());
        tmp.set_file_name(format!("{}.tmp", file_name));
        fs::write(&tmp, content.as_bytes())?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

impl Default for DocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}
