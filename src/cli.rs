use std::path::{self, PathBuf};

use clap::{ArgGroup, Parser};

use crate::registry_editor::{Command, EditorOptions};

/// Export/import the current user's environment variables to a YAML file.
#[derive(Debug, Parser)]
#[command(name = "backup-win-env", version)]
#[command(about = "Export/import the current user's environment variables to a YAML file", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["import", "export"])))]
pub struct Cli {
    /// Import environment variables from FILE
    #[arg(short = 'i', long = "import", value_name = "FILE")]
    pub import: Option<PathBuf>,

    /// Export environment variables to FILE
    #[arg(short = 'o', long = "export", value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Preview the result without writing anything
    #[arg(short = 'v', long = "view")]
    pub view: bool,

    /// Remove values missing from the imported file
    #[arg(long, requires = "import")]
    pub replace: bool,
}

impl Cli {
    /// Resolve the selected mode, with its path made absolute.
    pub fn resolve_command(&self) -> std::io::Result<Command> {
        match (&self.import, &self.export) {
            (Some(input), None) => Ok(Command::Import(path::absolute(input)?)),
            (None, Some(output)) => Ok(Command::Export(path::absolute(output)?)),
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "exactly one of --import and --export is required",
            )),
        }
    }

    pub fn options(&self) -> EditorOptions {
        EditorOptions {
            view: self.view,
            replace: self.replace,
            ..EditorOptions::default()
        }
    }
}
