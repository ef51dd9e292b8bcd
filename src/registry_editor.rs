use std::io::Write;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::error::RegistryError;
use crate::registry_hive::{KeyLocation, RegistryHive, empty_key};
use crate::registry_key::RegistryItem;
use crate::registry_parser::{DocumentError, DocumentParser};
use crate::registry_writer::DocumentWriter;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("failed to print preview: {0}")]
    Output(#[from] std::io::Error),
}

/// Options shared by the import and export workflows.
#[derive(Debug, Clone)]
pub struct EditorOptions {
    pub location: KeyLocation,
    /// Print the resulting values instead of writing the file or registry.
    pub view: bool,
    /// Empty the key before an import writes, so only imported values remain.
    pub replace: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            location: KeyLocation::user_environment(),
            view: false,
            replace: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Import(PathBuf),
    Export(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Previewed(RegistryItem),
    Exported { path: PathBuf, count: usize },
    Imported { written: usize, removed: usize },
}

/// Import and export of one registry key against a YAML backup.
pub struct RegistryEditor<'h, H: RegistryHive + ?Sized> {
    hive: &'h H,
    options: EditorOptions,
}

impl<'h, H: RegistryHive + ?Sized> RegistryEditor<'h, H> {
    pub fn new(hive: &'h H, options: EditorOptions) -> Self {
        Self { hive, options }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn run(&self, command: &Command, out: &mut dyn Write) -> Result<Outcome, EditorError> {
        match command {
            Command::Import(path) => self.import_from_file(path, out),
            Command::Export(path) => self.export_to_file(path, out),
        }
    }

    pub fn read_live(&self) -> Result<RegistryItem, EditorError> {
        let mut live = RegistryItem::new(self.options.location.clone());
        live.read_from(self.hive)?;
        Ok(live)
    }

    pub fn export_to_file(&self, path: &Path, out: &mut dyn Write) -> Result<Outcome, EditorError> {
        let live = self.read_live()?;
        if self.options.view {
            write!(out, "{}", live)?;
            return Ok(Outcome::Previewed(live));
        }
        DocumentWriter::new().write_to_file(&live, path)?;
        info!("exported {} value(s) to {}", live.len(), path.display());
        Ok(Outcome::Exported {
            path: path.to_path_buf(),
            count: live.len(),
        })
    }

    pub fn import_from_file(&self, path: &Path, out: &mut dyn Write) -> Result<Outcome, EditorError> {
        let entries = DocumentParser.load_from_file(path)?;
        let mut imported = RegistryItem::new(self.options.location.clone());
        imported.from_document(&entries)?;
        info!("loaded {} value(s) from {}", imported.len(), path.display());
        self.import_item(&imported, out)
    }

    /// Combine `imported` with the live key and write the result. Values only
    /// present in the registry survive; imported values override single-valued
    /// entries and are unioned into multi-valued ones. With `replace` the key
    /// is emptied first and only `imported` is written.
    pub fn import_item(&self, imported: &RegistryItem, out: &mut dyn Write) -> Result<Outcome, EditorError> {
        let merged = if self.options.replace {
            imported.clone()
        } else {
            let mut live = self.read_live()?;
            live.merge_with(imported)?;
            live
        };
        if self.options.view {
            write!(out, "{}", merged)?;
            return Ok(Outcome::Previewed(merged));
        }
        let removed = if self.options.replace {
            for value in merged.values() {
                value.to_wire()?;
            }
            warn!("replacing every value under {}", self.options.location);
            empty_key(self.hive, &self.options.location)?
        } else {
            0
        };
        let written = merged.write_to(self.hive)?;
        Ok(Outcome::Imported { written, removed })
    }
}
