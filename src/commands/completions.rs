//! # Completions Command Implementation
//!
//! Prints a shell completion script for `smartbox-bundle`, or writes it to a
//! file with `--output`.
//!
//! ```bash
//! smartbox-bundle completions bash > ~/.local/share/bash-completion/completions/smartbox-bundle
//! smartbox-bundle completions zsh --output ~/.zfunc/_smartbox-bundle
//! ```

use anyhow::{Context, Result};
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::cli::Cli;

const BIN_NAME: &str = "smartbox-bundle";

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate the script for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Execute the completions command
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            generate(args.shell, &mut cmd, BIN_NAME, &mut writer);
            writer.flush()?;
            info!("Wrote {} completions to {}", args.shell, path.display());
        }
        None => generate(args.shell, &mut cmd, BIN_NAME, &mut io::stdout()),
    }
    Ok(())
}
