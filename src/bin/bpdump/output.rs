use anyhow::{Context, Result, bail};
use dialoguer::Confirm;

use std::fs::{self, File};
use std::path::Path;

/// Opens `path` for writing.
///
/// Refuses to overwrite directories. If `prompt` is set, asks before overwriting an
/// existing file. Creates missing parent directories.
pub fn create_output_file(path: impl AsRef<Path>, prompt: bool) -> Result<File> {
    let p = path.as_ref();

    if p.is_dir() {
        bail!(
            "There is a directory at {}, refusing to overwrite",
            p.display()
        );
    }

    if p.exists() {
        if prompt {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Are you sure you want to override output file at {}",
                    p.display()
                ))
                .default(false)
                .interact()
                .context("Failed to write confirmation prompt to term")?;

            if !confirmed {
                bail!("Cancelled");
            }
        }
        return File::create(p).with_context(|| format!("Failed to create {}", p.display()));
    }

    // Ok to assume p is not an existing directory
    match p.parent() {
        Some(parent) => {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            File::create(p).with_context(|| format!("Failed to create {}", p.display()))
        }
        None => bail!("Output file cannot be root."),
    }
}
