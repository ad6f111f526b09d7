use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;

use crate::error::{Result, SubtransError};
use super::{SubtitleEvent, OVERRIDE_BLOCK};

static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})").unwrap()
});

/// `<i>`, `</b>` and friends
static BASIC_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(/?)([ibus])>").unwrap());

static ANY_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// `{\i1}`, `{\b0}` and friends, only when alone in their block
static BASIC_OVERRIDE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\\([ibus])([01])\}").unwrap());

/// Parse SubRip content into events with ASS styled text
pub fn parse(content: &str) -> Result<Vec<SubtitleEvent>> {
    let mut events = Vec::new();
    let mut current: Option<SubtitleEvent> = None;
    let mut text_lines: Vec<&str> = Vec::new();

    for (number, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
            if let Some(event) = current.take() {
                events.push(finish(event, &mut text_lines));
            }
            current = Some(SubtitleEvent::new(timestamp_ms(&caps, 1), timestamp_ms(&caps, 5), String::new()));
            continue;
        }

        if current.is_none() {
            // Sequence numbers and blank lines between blocks
            if !trimmed.is_empty() && trimmed.parse::<usize>().is_err() {
                warn!("Unexpected text at line {} outside of a subtitle block: {}", number + 1, trimmed);
            }
        } else if trimmed.is_empty() {
            if let Some(event) = current.take() {
                events.push(finish(event, &mut text_lines));
            }
        } else {
            text_lines.push(trimmed);
        }
    }

    if let Some(event) = current.take() {
        events.push(finish(event, &mut text_lines));
    }

    if events.is_empty() && !content.trim().is_empty() {
        return Err(SubtransError::Subtitle("No SubRip timestamps found".to_string()));
    }

    Ok(events)
}

fn finish(mut event: SubtitleEvent, text_lines: &mut Vec<&str>) -> SubtitleEvent {
    event.text = to_ass_text(&text_lines.join("\n"));
    text_lines.clear();
    event
}

fn timestamp_ms(caps: &Captures, start_idx: usize) -> u64 {
    let number = |idx: usize| caps.get(idx).map_or(0, |m| m.as_str().parse::<u64>().unwrap_or(0));

    // A short fraction is a decimal fraction: ",5" is 500ms
    let millis = caps.get(start_idx + 3).map_or(0, |m| {
        let digits = m.as_str();
        digits.parse::<u64>().unwrap_or(0) * 10u64.pow(3 - digits.len() as u32)
    });

    (number(start_idx) * 3600 + number(start_idx + 1) * 60 + number(start_idx + 2)) * 1000 + millis
}

/// SubRip markup to ASS markup
fn to_ass_text(text: &str) -> String {
    let text = BASIC_TAG_REGEX.replace_all(text, |caps: &Captures| {
        let state = if caps[1].is_empty() { "1" } else { "0" };
        format!("{{\\{}{}}}", caps[2].to_lowercase(), state)
    });
    ANY_TAG_REGEX.replace_all(&text, "").replace('\n', "\\N")
}

/// ASS markup to SubRip markup
fn to_srt_text(text: &str) -> String {
    let text = BASIC_OVERRIDE_REGEX.replace_all(text, |caps: &Captures| {
        let slash = if &caps[2] == "0" { "/" } else { "" };
        format!("<{}{}>", slash, &caps[1])
    });
    OVERRIDE_BLOCK
        .replace_all(&text, "")
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ")
}

/// Format milliseconds as SRT time (HH:MM:SS,mmm)
pub fn format_srt_time(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

pub fn render(events: &[SubtitleEvent]) -> String {
    let mut content = String::new();

    for (index, event) in events.iter().enumerate() {
        content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(event.start_ms),
            format_srt_time(event.end_ms),
            to_srt_text(&event.text).trim()
        ));
    }

    content
}
