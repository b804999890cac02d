//! `devices` subcommand: list serial ports and mark busylight matches.

use statuslight_lib::protocol::{USB_PID, USB_VID};
use statuslight_lib::serial;

use super::{DevicesOutput, Result, print_json};

pub(super) fn cmd_devices(json: bool) -> Result<()> {
    let ports = serial::list_ports()?;

    if json {
        return print_json(&DevicesOutput {
            count: ports.len(),
            ports,
        });
    }

    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }

    println!(
        "Found {} serial port{}:",
        ports.len(),
        if ports.len() == 1 { "" } else { "s" }
    );
    println!();

    for (i, port) in ports.iter().enumerate() {
        let marker = if port.is_indicator { "  <- busylight" } else { "" };
        println!("  [{}] {}{marker}", i + 1, port.name);
        if let (Some(vid), Some(pid)) = (port.vid, port.pid) {
            println!("      USB: {vid:04X}:{pid:04X}");
        }
        if let Some(ref product) = port.product {
            println!("      Product: {product}");
        }
        if let Some(ref serial) = port.serial_number {
            println!("      Serial: {serial}");
        }
    }

    if !ports.iter().any(|p| p.is_indicator) {
        println!();
        println!("No busylight ({USB_VID:04X}:{USB_PID:04X}) among them.");
    }
    Ok(())
}
