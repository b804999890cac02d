//! `list` subcommand: registered devices and status sources.

use super::{ListOutput, Registry, Result, kv, kv_width, print_json};

pub(super) fn cmd_list(json: bool) -> Result<()> {
    let registry = Registry::with_builtins();
    let devices = registry.device_names();
    let sources = registry.source_names();

    if json {
        return print_json(&ListOutput {
            devices: devices.iter().map(|s| s.to_string()).collect(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        });
    }
    let w = kv_width(&["Devices:", "Sources:"], &[]);
    kv("Devices:", devices.join(", "), w);
    kv("Sources:", sources.join(", "), w);
    Ok(())
}
