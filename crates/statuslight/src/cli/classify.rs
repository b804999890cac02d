//! `classify` subcommand: run the presence classifier over a log file or stdin.

use std::io::Read;
use std::path::Path;

use statuslight_lib::status::{Status, StatusClassifier, status_color};

use super::{ClassifyOutput, Config, Result, kv, kv_width, print_json};

/// Classify every line of `text` and summarise the result.
pub(super) fn classify_text(text: &str, classifier: &StatusClassifier) -> ClassifyOutput {
    let mut last = Status::Unknown;
    let mut matched_lines = 0;
    let mut total_lines = 0;
    for line in text.lines() {
        total_lines += 1;
        let status = classifier.classify(line);
        if status.is_known() {
            matched_lines += 1;
            last = status;
        }
    }
    ClassifyOutput {
        status: last.to_string(),
        color: status_color(last).map(|c| c.to_string()),
        matched_lines,
        total_lines,
    }
}

pub(super) fn cmd_classify(config: &Config, file: Option<&Path>, json: bool) -> Result<()> {
    let text = match file {
        Some(path) => {
            let bytes = std::fs::read(path)?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
        None => {
            let mut bytes = Vec::new();
            std::io::stdin().read_to_end(&mut bytes)?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
    };

    let classifier = StatusClassifier::new(&config.status_marker);
    let output = classify_text(&text, &classifier);

    if json {
        return print_json(&output);
    }
    let w = kv_width(&["Status:", "Color:", "Matched:"], &[]);
    kv("Status:", &output.status, w);
    kv("Color:", output.color.as_deref().unwrap_or("(none)"), w);
    kv(
        "Matched:",
        format_args!("{} of {} lines", output.matched_lines, output.total_lines),
        w,
    );
    Ok(())
}
