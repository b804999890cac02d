//! `init` subcommand: write the effective configuration to disk.

use std::io::ErrorKind;
use std::path::Path;

use statuslight_lib::StatuslightError;

use super::{Config, Result};

pub(super) fn cmd_init(config: &Config, custom_path: Option<&Path>, force: bool) -> Result<()> {
    let path = custom_path
        .map(|p| p.to_path_buf())
        .or_else(Config::path)
        .ok_or_else(|| StatuslightError::Config("no config directory on this system".into()))?;

    match config.save_to(&path, force) {
        Ok(()) => {
            log::info!("[config] wrote {}", path.display());
            println!("Wrote {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StatuslightError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ))),
        Err(e) => Err(e.into()),
    }
}
