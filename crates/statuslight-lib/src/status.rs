//! Presence status: line classifier and the fixed status→color table.
//!
//! The chat client logs presence-badge updates as free text, e.g.
//! `... BadgeService: updating status Do not disturb`. [`StatusClassifier`]
//! extracts the trailing phrase and maps it onto [`Status`]; [`status_color`]
//! maps that onto the indicator color.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::color::Color;

/// Marker substring identifying a presence-badge log entry.
pub const DEFAULT_STATUS_MARKER: &str = "Badge";

/// Presence status derived from log text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Unknown,
    Available,
    Busy,
    DoNotDisturb,
    Away,
    Offline,
}

impl Status {
    /// Look up the phrase the chat client writes after `status `.
    ///
    /// Case-sensitive; anything else is `Unknown`.
    pub fn from_phrase(phrase: &str) -> Status {
        match phrase {
            "Available" => Status::Available,
            "Busy" => Status::Busy,
            "Do not disturb" => Status::DoNotDisturb,
            "Away" => Status::Away,
            "Offline" => Status::Offline,
            _ => Status::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != Status::Unknown
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Unknown => "unknown",
            Status::Available => "available",
            Status::Busy => "busy",
            Status::DoNotDisturb => "do not disturb",
            Status::Away => "away",
            Status::Offline => "offline",
        };
        f.write_str(s)
    }
}

/// Indicator color for a status. `Unknown` has no entry.
pub fn status_color(status: Status) -> Option<Color> {
    match status {
        Status::Available => Some(Color::new(0, 255, 0)),
        Status::Busy => Some(Color::new(255, 0, 0)),
        Status::DoNotDisturb => Some(Color::new(255, 0, 0)),
        Status::Away => Some(Color::new(234, 163, 0)),
        Status::Offline => Some(Color::new(0, 0, 0)),
        Status::Unknown => None,
    }
}

/// Phrase after the last `status ` on the remainder of a line.
static STATUS_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*status (.*)$").unwrap());

/// Stateless line classifier.
///
/// The marker is located literally and only the text after its first
/// occurrence is matched against [`STATUS_PHRASE`]. Cheap to clone; each
/// tailer thread carries its own copy.
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    marker: String,
}

impl StatusClassifier {
    pub fn new(marker: &str) -> Self {
        StatusClassifier {
            marker: marker.to_string(),
        }
    }

    /// Classify one raw log line.
    pub fn classify(&self, line: &str) -> Status {
        if !line.contains(self.marker.as_str()) || !line.contains("status") {
            return Status::Unknown;
        }
        let line = line.replace('\r', "");
        let Some(at) = line.find(self.marker.as_str()) else {
            return Status::Unknown;
        };
        let rest = &line[at + self.marker.len()..];
        match STATUS_PHRASE.captures(rest).and_then(|c| c.get(1)) {
            Some(phrase) => Status::from_phrase(phrase.as_str()),
            None => Status::Unknown,
        }
    }

    /// Classify a batch of lines and keep the newest known status.
    pub fn last_status<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Status {
        lines
            .into_iter()
            .map(|line| self.classify(line))
            .filter(|s| s.is_known())
            .last()
            .unwrap_or(Status::Unknown)
    }
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_MARKER)
    }
}
