use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, SubtransError};
use crate::subtitle::encoding::TextEncoding;

/// Separator value that means "try every configured candidate in order"
pub const TRY_DEFAULT_SEPARATORS: &str = "try_default";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub translate: TranslateConfig,
    pub subtitle: SubtitleConfig,
    pub media: MediaConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslatorKind {
    /// translate.googleapis.* single-shot endpoint, one request per text
    Gtx,
    /// translate.google.* web RPC endpoint, two requests per text
    Batchexecute,
}

impl TranslatorKind {
    pub const ALL: [TranslatorKind; 2] = [TranslatorKind::Gtx, TranslatorKind::Batchexecute];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Gtx => "gtx",
            Self::Batchexecute => "batchexecute",
        }
    }

    /// Resolve a translator by its command line name
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| SubtransError::UnsupportedTranslator {
                requested: name.to_string(),
                available: Self::ALL.map(|kind| kind.name()).join(", "),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Decide from the file extension
    Auto,
    /// Container with an embedded subtitle track
    Video,
    /// Plain subtitle file
    Subs,
}

impl InputType {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "video" => Ok(Self::Video),
            "subs" => Ok(Self::Subs),
            _ => Err(SubtransError::Config(format!(
                "Invalid input type '{}'. Valid types: auto, video, subs",
                name
            ))),
        }
    }
}

/// A named family of characters that terminate a sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingFamily {
    pub name: String,
    pub chars: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Translation backend
    pub translator: TranslatorKind,
    /// Target language, abbreviation or full name
    pub target_language: String,
    /// Candidate separators in priority order
    pub separators: Vec<String>,
    /// Longest separator accepted; also the per-line cost used when packing chunks
    pub separator_max_len: usize,
    /// Sentence ending families, checked in order
    pub sentence_endings: Vec<EndingFamily>,
    /// Treat every line as a complete sentence
    pub ignore_line_ends: bool,
    /// Use the pronunciation of the original text instead of the text itself
    pub pronounce_original: bool,
    /// Use the pronunciation of the translated text instead of the text itself
    pub pronounce_translated: bool,
    /// Regional domain suffixes tried in order when an endpoint blocks us
    pub endpoints: Vec<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Overrides the backend's request character limit
    pub char_limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleConfig {
    /// Input file encoding
    pub encoding: TextEncoding,
    /// Lines shorter than this are merged onto a single line
    pub line_char_limit: usize,
    /// Size of the secondary text in percent
    pub secondary_scale: u32,
    /// Show the secondary text below the main text
    pub merge: bool,
    /// Show the original as main text and the translation as secondary
    pub reverse: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Subtitle track to extract from video input
    pub subtitle_track: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console log level: error, warn, info, debug or trace
    pub level: String,
    /// Directory for the rolling log file; no file logging when unset
    pub dir: Option<String>,
}

pub fn default_separators() -> Vec<String> {
    [" ∞ ", " ™ ", " ## ", " $$ ", " @@ ", " ¶ "]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_sentence_endings() -> Vec<EndingFamily> {
    vec![
        EndingFamily {
            name: "Usual".to_string(),
            chars: ".!?\"')".to_string(),
        },
        EndingFamily {
            name: "Japanese".to_string(),
            chars: "よねのさぞなか！。」…".to_string(),
        },
    ]
}

pub fn default_endpoints() -> Vec<String> {
    [
        "com", "co.kr", "lt", "ru", "es", "lv", "ee", "pl", "de", "us", "sk", "fr", "co.uk",
        "ae", "ro", "gy", "pt", "ms", "ca", "be", "co.jp", "it", "nl", "gr", "co.in", "dk",
        "ch", "ie", "at", "cl",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            translator: TranslatorKind::Gtx,
            target_language: "es".to_string(),
            separators: default_separators(),
            separator_max_len: 5,
            sentence_endings: default_sentence_endings(),
            ignore_line_ends: false,
            pronounce_original: false,
            pronounce_translated: false,
            endpoints: default_endpoints(),
            timeout_secs: 30,
            char_limit: None,
        }
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Auto,
            line_char_limit: 30,
            secondary_scale: 80,
            merge: false,
            reverse: false,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            subtitle_track: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            dir: None,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtransError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubtransError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubtransError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Replace the candidate list with a single user separator, unless it is the sentinel
    pub fn set_separator(&mut self, separator: &str) -> Result<()> {
        if separator != TRY_DEFAULT_SEPARATORS {
            self.translate.separators = vec![separator.to_string()];
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        let translate = &self.translate;
        if translate.separators.is_empty() {
            return Err(SubtransError::Config("At least one separator is required".to_string()));
        }
        for separator in &translate.separators {
            if separator.trim().is_empty() {
                return Err(SubtransError::Config(format!(
                    "Separator {:?} must contain something other than whitespace",
                    separator
                )));
            }
            if separator.chars().count() > translate.separator_max_len {
                return Err(SubtransError::Config(format!(
                    "Separator {:?} is longer than {} characters",
                    separator, translate.separator_max_len
                )));
            }
        }
        if translate.endpoints.is_empty() {
            return Err(SubtransError::Config("At least one endpoint is required".to_string()));
        }
        if self.subtitle.secondary_scale == 0 {
            return Err(SubtransError::Config("Secondary scale must be above 0".to_string()));
        }
        Ok(())
    }
}
