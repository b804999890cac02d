//! Serial busylight driver: port discovery, liveness probe, command exchange.
//!
//! Each exchange runs under the connection mutex:
//! lock → clear stale input → write command → settle → read until idle → unlock.
//! The guard is released on every exit path, including read errors.

use std::io::{self, Read, Write};
use std::sync::Mutex;
use std::time::Instant;

use serde::Serialize;

use crate::color::Color;
use crate::device::{Device, DeviceError, DeviceInfo, Result};
use crate::protocol::{self, Command, Timing};

// ── Connection ──

/// Byte-stream seam between the driver and the serial port.
///
/// `read` must return within a bounded time: `Ok(0)` or an error of kind
/// `TimedOut`/`WouldBlock` means "nothing arrived".
pub trait Connection: Send {
    /// Discard any bytes already received but not yet read.
    fn clear_input(&mut self) -> io::Result<()>;
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl Connection for Box<dyn serialport::SerialPort> {
    fn clear_input(&mut self) -> io::Result<()> {
        self.clear(serialport::ClearBuffer::Input)
            .map_err(io::Error::from)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        Write::write_all(self, data)?;
        Write::flush(self)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }
}

// ── Driver ──

/// Busylight reachable over a serial connection.
pub struct SerialDevice<C: Connection> {
    info: DeviceInfo,
    conn: Mutex<C>,
    timing: Timing,
}

impl<C: Connection> SerialDevice<C> {
    /// Wrap an already-open connection and run the liveness probe.
    pub fn connect(conn: C, path: &str, timing: Timing) -> Result<Self> {
        let dev = SerialDevice {
            info: DeviceInfo {
                driver: "serial".into(),
                path: path.to_string(),
            },
            conn: Mutex::new(conn),
            timing,
        };
        dev.probe()?;
        Ok(dev)
    }

    /// Send a line-feed wake-up, then `AT`; the device must answer `OK`.
    fn probe(&self) -> Result<()> {
        let mut conn = self.lock();
        conn.write_all(protocol::WAKE_UP)
            .map_err(|e| DeviceError::ProbeFailed(format!("wake-up write: {e}")))?;
        let reply = exchange(&mut *conn, Command::Probe, &self.timing)
            .map_err(|e| DeviceError::ProbeFailed(format!("AT: {e}")))?;
        if !protocol::is_ok(&reply) {
            log::debug!("[device] probe reply: {:?}", String::from_utf8_lossy(&reply));
            return Err(DeviceError::ProbeFailed(format!(
                "AT: unexpected reply {:?}",
                String::from_utf8_lossy(&reply)
            )));
        }
        Ok(())
    }

    /// Run one command and require an `OK` reply.
    fn command(&self, cmd: Command) -> Result<()> {
        let reply = {
            let mut conn = self.lock();
            exchange(&mut *conn, cmd, &self.timing)?
        };
        if protocol::is_ok(&reply) {
            Ok(())
        } else {
            Err(DeviceError::Rejected(reply))
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, C> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<C: Connection> Device for SerialDevice<C> {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn set_brightness(&self, brightness: u8) -> Result<()> {
        if brightness > protocol::MAX_BRIGHTNESS {
            return Err(DeviceError::BrightnessOutOfRange(brightness));
        }
        self.command(Command::SetBrightness(brightness))
    }

    fn set_color(&self, color: Color) -> Result<()> {
        self.command(Command::SetColor(color))
    }

    fn get_version(&self) -> Result<String> {
        let reply = {
            let mut conn = self.lock();
            exchange(&mut *conn, Command::GetVersion, &self.timing)?
        };
        if reply.starts_with(protocol::VERSION_PREFIX.as_bytes()) {
            Ok(protocol::parse_version(&reply))
        } else {
            Err(DeviceError::Rejected(reply))
        }
    }
}

/// One request/response exchange. Caller holds the connection lock.
///
/// Returns the raw reply (possibly empty if the device stayed silent).
fn exchange<C: Connection + ?Sized>(
    conn: &mut C,
    cmd: Command,
    timing: &Timing,
) -> Result<Vec<u8>> {
    conn.clear_input()?;
    conn.write_all(&cmd.encode())?;
    let sent = Instant::now();
    if !timing.settle.is_zero() {
        std::thread::sleep(timing.settle);
    }

    let mut buf = [0u8; protocol::RESPONSE_BUF_LEN];
    let mut len = 0;
    let mut last_byte = Instant::now();
    while len < buf.len() {
        match conn.read(&mut buf[len..]) {
            Ok(0) => {}
            Ok(n) => {
                len += n;
                last_byte = Instant::now();
                continue;
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
        // Nothing arrived on this read.
        if len > 0 && last_byte.elapsed() >= timing.idle {
            break;
        }
        if sent.elapsed() >= timing.response_timeout {
            break;
        }
    }
    log::trace!(
        "[device] {:?} -> {:?}",
        cmd,
        String::from_utf8_lossy(&buf[..len])
    );
    Ok(buf[..len].to_vec())
}

// ── Discovery ──

/// A serial port seen during enumeration.
#[derive(Debug, Clone, Serialize)]
pub struct PortInfo {
    pub name: String,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    /// Whether the VID/PID pair identifies a busylight.
    pub is_indicator: bool,
}

/// Enumerate serial ports on this machine.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()
        .map_err(|e| DeviceError::OpenFailed(format!("enumerate ports: {e}")))?;
    Ok(ports
        .into_iter()
        .map(|p| match p.port_type {
            serialport::SerialPortType::UsbPort(usb) => PortInfo {
                is_indicator: usb.vid == protocol::USB_VID && usb.pid == protocol::USB_PID,
                name: p.port_name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                product: usb.product,
                serial_number: usb.serial_number,
            },
            _ => PortInfo {
                name: p.port_name,
                vid: None,
                pid: None,
                product: None,
                serial_number: None,
                is_indicator: false,
            },
        })
        .collect())
}

/// Find the first port whose VID/PID matches the busylight.
pub fn find_port() -> Result<String> {
    list_ports()?
        .into_iter()
        .find(|p| p.is_indicator)
        .map(|p| p.name)
        .ok_or(DeviceError::NotFound)
}

/// Open a busylight: explicit `port` if non-empty, otherwise auto-detect by VID/PID.
///
/// Opens at 9600 8N1, then runs the liveness probe.
pub fn open(port: &str, timing: Timing) -> Result<SerialDevice<Box<dyn serialport::SerialPort>>> {
    let name = if port.trim().is_empty() {
        find_port()?
    } else {
        port.trim().to_string()
    };
    log::info!(
        "[device] opening {name} (vid {:04X}, pid {:04X})",
        protocol::USB_VID,
        protocol::USB_PID
    );
    let conn = serialport::new(&name, protocol::BAUD_RATE)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(timing.idle)
        .open()
        .map_err(|e| DeviceError::OpenFailed(format!("open {name}: {e}")))?;
    SerialDevice::connect(conn, &name, timing)
}
