use std::process::ExitCode;

use anyhow::Result;
use backup_win_env::Cli;
use clap::Parser;
use log::error;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Usage errors exit here, before the registry or any file is touched.
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(windows)]
fn run(cli: &Cli) -> Result<()> {
    use anyhow::Context;
    use backup_win_env::{Outcome, RegistryEditor, WindowsHive};

    let command = cli.resolve_command().context("failed to resolve the file path")?;
    let hive = WindowsHive;
    let editor = RegistryEditor::new(&hive, cli.options());
    let mut stdout = std::io::stdout().lock();
    match editor.run(&command, &mut stdout)? {
        Outcome::Previewed(item) => log::debug!("previewed {} value(s)", item.len()),
        Outcome::Exported { path, count } => {
            println!("exported {} value(s) to {}", count, path.display())
        }
        Outcome::Imported { written, removed } => {
            if removed > 0 {
                println!("removed {} value(s)", removed);
            }
            println!("imported {} value(s)", written);
        }
    }
    Ok(())
}

#[cfg(not(windows))]
fn run(_cli: &Cli) -> Result<()> {
    anyhow::bail!("the Windows registry is only available on Windows")
}
