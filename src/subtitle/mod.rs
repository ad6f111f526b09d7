// Subtitle file handling
//
// Events are kept in ASS convention whatever the source format, so the
// projector only has to deal with one flavour of styled text:
// - srt / ass: Format specific parsing and rendering
// - encoding: Byte decoding with byte-order-mark sniffing
// - style: Composing translated text back into styled events

pub mod ass;
pub mod encoding;
pub mod srt;
pub mod style;

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{Result, SubtransError};
use encoding::TextEncoding;

pub(crate) static OVERRIDE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

/// One timed subtitle record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEvent {
    pub start_ms: u64,
    pub end_ms: u64,
    /// Styled text with `\N` hard breaks and `{...}` override blocks
    pub text: String,
    /// Remaining ASS dialogue columns by name (layer, style, margins, ...)
    pub fields: Vec<(String, String)>,
}

impl SubtitleEvent {
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
            fields: Vec::new(),
        }
    }

    /// Text without styling, with real newlines
    pub fn plaintext(&self) -> String {
        let plain = OVERRIDE_BLOCK
            .replace_all(&self.text, "")
            .replace("\\N", "\n")
            .replace("\\n", "\n")
            .replace("\\h", " ");

        if plain.is_empty() {
            self.text.clone()
        } else {
            plain
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Ass,
}

impl SubtitleFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "srt" => Ok(Self::Srt),
            "ass" | "ssa" => Ok(Self::Ass),
            _ => Err(SubtransError::UnsupportedFormat(format!(
                "{} (expected .srt, .ass or .ssa)",
                path.display()
            ))),
        }
    }

    /// Whether the extension names a subtitle file at all
    pub fn is_subtitle_path(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }
}

/// A loaded subtitle file
#[derive(Debug, Clone)]
pub struct SubtitleFile {
    pub events: Vec<SubtitleEvent>,
    pub format: SubtitleFormat,
    /// Everything an ASS source carries besides its dialogue
    pub layout: Option<ass::AssLayout>,
}

impl SubtitleFile {
    pub async fn load<P: AsRef<Path>>(path: P, encoding: TextEncoding) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading subtitles: {}", path.display());

        if !path.exists() {
            return Err(SubtransError::FileNotFound(path.display().to_string()));
        }

        let bytes = fs::read(path).await?;
        let content = encoding.decode(&bytes).ok_or_else(|| SubtransError::Decode {
            path: path.display().to_string(),
            encoding: encoding.to_string(),
        })?;

        Self::parse(&content, path)
    }

    /// Parse decoded content; the format comes from the content, then from the extension
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");

        let format = if ass::looks_like_ass(&content) {
            SubtitleFormat::Ass
        } else {
            SubtitleFormat::from_path(path)?
        };

        let file = match format {
            SubtitleFormat::Ass => {
                let (layout, events) = ass::parse(&content)?;
                Self { events, format, layout: Some(layout) }
            }
            SubtitleFormat::Srt => Self {
                events: srt::parse(&content)?,
                format,
                layout: None,
            },
        };

        info!("Loaded {} subtitle events", file.events.len());
        Ok(file)
    }

    /// Render in the format named by the output extension
    pub fn render(&self, format: SubtitleFormat) -> String {
        match format {
            SubtitleFormat::Srt => srt::render(&self.events),
            SubtitleFormat::Ass => ass::render(self.layout.as_ref(), &self.events),
        }
    }

    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let format = SubtitleFormat::from_path(path)?;
        info!("Saving {} subtitle events: {}", self.events.len(), path.display());

        fs::write(path, self.render(format)).await?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
