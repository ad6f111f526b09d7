use crate::error::{Result, SubtransError};
use super::SubtitleEvent;

/// Dialogue columns written when the source had none (SubRip input)
pub const DEFAULT_COLUMNS: [&str; 10] = [
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

const DEFAULT_HEADER: &str = "[Script Info]
; Script generated by subtrans
ScriptType: v4.00+
WrapStyle: 0
ScaledBorderAndShadow: yes
PlayResX: 384
PlayResY: 288

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1";

/// Parts of an ASS file that are carried through untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssLayout {
    /// Sections before `[Events]`, verbatim
    pub header: String,
    /// Column names from the `Format:` line of `[Events]`
    pub columns: Vec<String>,
    /// Non-dialogue lines of `[Events]`, e.g. `Comment:`, keyed by the number of
    /// dialogues that came before them
    pub extra_lines: Vec<(usize, String)>,
    /// Sections after `[Events]`, verbatim
    pub trailer: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Events,
    Trailer,
}

pub fn looks_like_ass(content: &str) -> bool {
    content
        .lines()
        .any(|line| line.trim().eq_ignore_ascii_case("[script info]"))
}

pub fn parse(content: &str) -> Result<(AssLayout, Vec<SubtitleEvent>)> {
    let mut section = Section::Header;
    let mut header = Vec::new();
    let mut trailer = Vec::new();
    let mut columns: Vec<String> = DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut extra_lines = Vec::new();
    let mut events = Vec::new();

    for (number, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        let is_section = trimmed.starts_with('[') && trimmed.ends_with(']');

        match section {
            Section::Header if is_section && trimmed.eq_ignore_ascii_case("[events]") => {
                section = Section::Events;
            }
            Section::Header => header.push(line),
            Section::Events if is_section => {
                section = Section::Trailer;
                trailer.push(line);
            }
            Section::Events => {
                if let Some(format) = strip_key(trimmed, "Format") {
                    columns = format.split(',').map(|c| c.trim().to_string()).collect();
                } else if let Some(dialogue) = strip_key(trimmed, "Dialogue") {
                    events.push(parse_dialogue(dialogue, &columns, number + 1)?);
                } else if !trimmed.is_empty() {
                    extra_lines.push((events.len(), line.to_string()));
                }
            }
            Section::Trailer => trailer.push(line),
        }
    }

    let layout = AssLayout {
        header: header.join("\n").trim_end().to_string(),
        columns,
        extra_lines,
        trailer: trailer.join("\n").trim_end().to_string(),
    };
    Ok((layout, events))
}

fn strip_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (name, value) = line.split_once(':')?;
    name.trim().eq_ignore_ascii_case(key).then(|| value.trim_start())
}

fn parse_dialogue(values: &str, columns: &[String], line_number: usize) -> Result<SubtitleEvent> {
    let values: Vec<&str> = values.splitn(columns.len(), ',').collect();
    if values.len() != columns.len() {
        return Err(SubtransError::Subtitle(format!(
            "Dialogue at line {} has {} of {} columns",
            line_number,
            values.len(),
            columns.len()
        )));
    }

    let mut event = SubtitleEvent::new(0, 0, String::new());
    for (column, value) in columns.iter().zip(values) {
        match column.to_lowercase().as_str() {
            "start" => event.start_ms = parse_time(value, line_number)?,
            "end" => event.end_ms = parse_time(value, line_number)?,
            "text" => event.text = value.to_string(),
            _ => event.fields.push((column.clone(), value.trim().to_string())),
        }
    }
    Ok(event)
}

/// Parse `h:mm:ss.cc` into milliseconds
fn parse_time(value: &str, line_number: usize) -> Result<u64> {
    let invalid = || SubtransError::Subtitle(format!("Invalid time '{}' at line {}", value.trim(), line_number));

    let mut parts = value.trim().split(':');
    let number = |part: Option<&str>| part.and_then(|p| p.parse::<u64>().ok()).ok_or_else(invalid);
    let hours = number(parts.next())?;
    let minutes = number(parts.next())?;

    let seconds = parts.next().ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    let (secs, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
    let secs: u64 = secs.parse().map_err(|_| invalid())?;

    let fraction: String = fraction.chars().take(3).collect();
    let millis = if fraction.is_empty() {
        0
    } else {
        fraction.parse::<u64>().map_err(|_| invalid())? * 10u64.pow(3 - fraction.len() as u32)
    };

    Ok((hours * 3600 + minutes * 60 + secs) * 1000 + millis)
}

/// Format milliseconds as ASS time (h:mm:ss.cc)
pub fn format_ass_time(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let centis = (ms % 1_000) / 10;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

fn column_value(event: &SubtitleEvent, column: &str) -> String {
    match column.to_lowercase().as_str() {
        "start" => format_ass_time(event.start_ms),
        "end" => format_ass_time(event.end_ms),
        "text" => event.text.replace('\n', "\\N"),
        other => event.field(column).map(str::to_string).unwrap_or_else(|| {
            match other {
                "layer" | "marginl" | "marginr" | "marginv" => "0",
                "style" => "Default",
                "marked" => "Marked=0",
                _ => "",
            }
            .to_string()
        }),
    }
}

pub fn render(layout: Option<&AssLayout>, events: &[SubtitleEvent]) -> String {
    let mut content = String::new();

    let header = layout.map_or(DEFAULT_HEADER, |layout| layout.header.as_str()).trim_end();
    if !header.is_empty() {
        content.push_str(header);
        content.push_str("\n\n");
    }

    let default_columns: Vec<String> = DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect();
    let columns = layout.map_or(&default_columns, |layout| &layout.columns);

    content.push_str("[Events]\n");
    content.push_str(&format!("Format: {}\n", columns.join(", ")));
    let mut extra_lines = layout
        .map(|layout| layout.extra_lines.as_slice())
        .unwrap_or_default()
        .iter()
        .peekable();
    for (index, event) in events.iter().enumerate() {
        while let Some((_, line)) = extra_lines.next_if(|(position, _)| *position <= index) {
            content.push_str(line);
            content.push('\n');
        }
        let values: Vec<String> = columns.iter().map(|column| column_value(event, column)).collect();
        content.push_str(&format!("Dialogue: {}\n", values.join(",")));
    }
    for (_, line) in extra_lines {
        content.push_str(line);
        content.push('\n');
    }

    if let Some(layout) = layout.filter(|layout| !layout.trailer.is_empty()) {
        content.push('\n');
        content.push_str(&layout.trailer);
        content.push('\n');
    }

    content
}
