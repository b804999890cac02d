//! `run` subcommand: mirror presence status on the indicator until Ctrl+C.

use std::sync::Arc;

use statuslight_lib::orchestrator::Orchestrator;

use super::{CancelToken, Config, Device, Registry, Result, kv, kv_width, print_json};

pub(super) fn cmd_run(
    config: &Config,
    device: Option<&str>,
    source: Option<&str>,
    shutdown: &CancelToken,
    json: bool,
) -> Result<()> {
    config.validated()?;

    let registry = Registry::with_builtins();
    let source = registry.create_source(source.unwrap_or(&config.source), config)?;
    let device: Arc<dyn Device> = Arc::from(super::open_device(config, device)?);

    if !json {
        println!("[device] {} ({})", device.info().path, device.info().driver);
        println!("[source] {}", source.name());
        println!("Press Ctrl+C to stop.");
    }

    let stats = Orchestrator::new(source, device)
        .with_brightness(config.brightness)
        .run(shutdown)?;

    if json {
        return print_json(&stats);
    }
    println!();
    let w = kv_width(&["Forwarded:", "Failed:"], &[]);
    kv("Forwarded:", stats.forwarded, w);
    kv("Failed:", stats.failed, w);
    Ok(())
}
