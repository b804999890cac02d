//! `version`, `color` and `brightness` subcommands: one-shot device commands.

use statuslight_lib::color::parse_color;

use super::{Config, Result, VersionOutput, kv, kv_width, open_device, print_json};

pub(super) fn cmd_version(config: &Config, device: Option<&str>, json: bool) -> Result<()> {
    let device = open_device(config, device)?;
    let version = device.get_version()?;

    if json {
        return print_json(&VersionOutput {
            device: device.info().clone(),
            version,
        });
    }
    let w = kv_width(&["Device:", "Firmware:"], &[]);
    kv(
        "Device:",
        format_args!("{} ({})", device.info().path, device.info().driver),
        w,
    );
    kv("Firmware:", version, w);
    Ok(())
}

pub(super) fn cmd_color(config: &Config, device: Option<&str>, color: &str) -> Result<()> {
    let color = parse_color(color)?;
    let device = open_device(config, device)?;
    device.set_color(color)?;
    println!("[device] color {color}");
    Ok(())
}

pub(super) fn cmd_brightness(config: &Config, device: Option<&str>, level: u8) -> Result<()> {
    let device = open_device(config, device)?;
    device.set_brightness(level)?;
    println!("[device] brightness {level}");
    Ok(())
}
