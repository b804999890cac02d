//! Busylight serial protocol: command encoding, response parsing, constants.
//!
//! Wire format: every command is one ASCII line terminated by `\n`.
//! Responses start with `OK` on success; anything else is diagnostic text.
//!
//! | Command            | Line               | Success reply      |
//! |--------------------|--------------------|--------------------|
//! | liveness probe     | `AT`               | `OK`               |
//! | set brightness     | `AT+B=<0-100>`     | `OK`               |
//! | set color          | `AT+C=<r>,<g>,<b>` | `OK`               |
//! | get version        | `AT+V`             | `+VER: <version>`  |

use std::time::Duration;

use crate::color::Color;

// ── USB identity (Adafruit Neo Trinkey running the busylight firmware) ──

pub const USB_VID: u16 = 0x239A;
pub const USB_PID: u16 = 0x80F0;

// ── Serial line settings (8N1) ──

pub const BAUD_RATE: u32 = 9600;

// ── Framing ──

/// Size of the response buffer; replies longer than this are truncated.
pub const RESPONSE_BUF_LEN: usize = 128;
pub const OK_PREFIX: &[u8] = b"OK";
pub const VERSION_PREFIX: &str = "+VER: ";
/// Sent before the liveness probe to terminate any half-written line.
pub const WAKE_UP: &[u8] = b"\n";

pub const MAX_BRIGHTNESS: u8 = 100;

// ── Timing ──

/// Response timing for one command exchange.
///
/// After writing a command the driver waits `settle`, then reads until the
/// line has been quiet for `idle` after at least one byte, the buffer is
/// full, or `response_timeout` has elapsed since the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub settle: Duration,
    pub idle: Duration,
    pub response_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            settle: Duration::from_millis(50),
            idle: Duration::from_millis(50),
            response_timeout: Duration::from_millis(500),
        }
    }
}

impl Timing {
    /// Default timing with a custom overall response deadline.
    pub fn with_response_timeout(timeout: Duration) -> Self {
        Timing {
            response_timeout: timeout,
            ..Timing::default()
        }
    }
}

// ── Commands ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Probe,
    SetBrightness(u8),
    SetColor(Color),
    GetVersion,
}

impl Command {
    /// Encode as a `\n`-terminated command line.
    pub fn encode(&self) -> Vec<u8> {
        let line = match self {
            Command::Probe => "AT".to_string(),
            Command::SetBrightness(b) => format!("AT+B={b}"),
            Command::SetColor(c) => format!("AT+C={},{},{}", c.r, c.g, c.b),
            Command::GetVersion => "AT+V".to_string(),
        };
        let mut bytes = line.into_bytes();
        bytes.push(b'\n');
        bytes
    }
}

// ── Responses ──

/// Whether a raw reply acknowledges the command.
pub fn is_ok(response: &[u8]) -> bool {
    response.starts_with(OK_PREFIX)
}

/// Extract the version string from an `AT+V` reply.
///
/// Keeps the first line only, without its `+VER: ` prefix or NUL padding.
pub fn parse_version(response: &[u8]) -> String {
    let text = String::from_utf8_lossy(response);
    let text = text.strip_prefix(VERSION_PREFIX).unwrap_or(&text);
    text.lines()
        .next()
        .unwrap_or_default()
        .trim_end_matches(['\0', '\r'])
        .to_string()
}
