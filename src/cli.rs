use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, InputType, TranslatorKind};
use crate::error::Result;
use crate::subtitle::encoding::TextEncoding;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Translate movie subtitles into another language, or show both languages together",
    long_about = None
)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Console log level: error, warn, info, debug or trace
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also write a daily rolling log file into this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a subtitle file, or a subtitle track of a video file
    Translate(TranslateArgs),

    /// List the languages a translator supports
    Languages {
        /// Translator to list languages for
        #[arg(long)]
        translator: Option<String>,
    },

    /// List the default separator candidates, in the order they are tried
    Separators,
}

#[derive(clap::Args, Debug)]
pub struct TranslateArgs {
    /// Input subtitle or video file
    pub input: PathBuf,

    /// Generated subtitle file (.srt, .ass or .ssa)
    pub output: PathBuf,

    /// Target language, abbreviation or full name
    #[arg(long)]
    pub to_lang: Option<String>,

    /// Translation backend: gtx or batchexecute
    #[arg(long)]
    pub translator: Option<String>,

    /// Show the original and the translated subtitles together
    #[arg(long)]
    pub merge: bool,

    /// Show the original as main text and the translation below it
    #[arg(long)]
    pub reverse: bool,

    /// Use the pronunciation of the original text
    #[arg(long)]
    pub pronounce_original: bool,

    /// Use the pronunciation of the translated text
    #[arg(long)]
    pub pronounce_translated: bool,

    /// Lines shorter than this are merged onto a single line
    #[arg(long)]
    pub line_char_limit: Option<usize>,

    /// Size of the secondary text in percent
    #[arg(long)]
    pub secondary_scale: Option<u32>,

    /// Separator placed between lines of one request, or "try_default" to try every default
    #[arg(long)]
    pub separator: Option<String>,

    /// Treat every line as a complete sentence
    #[arg(long)]
    pub ignore_line_ends: bool,

    /// Input type: auto, video or subs
    #[arg(long, default_value = "auto")]
    pub input_type: String,

    /// Subtitle track to extract from video input
    #[arg(long)]
    pub subs_track: Option<usize>,

    /// Input encoding: utf-8 or auto
    #[arg(long)]
    pub encoding: Option<String>,
}

impl TranslateArgs {
    /// Override configuration values with the ones given on the command line
    pub fn apply_to(&self, config: &mut Config) -> Result<()> {
        if let Some(to_lang) = &self.to_lang {
            config.translate.target_language = to_lang.clone();
        }
        if let Some(translator) = &self.translator {
            config.translate.translator = TranslatorKind::from_name(translator)?;
        }
        if let Some(encoding) = &self.encoding {
            config.subtitle.encoding = TextEncoding::from_name(encoding)?;
        }
        if let Some(limit) = self.line_char_limit {
            config.subtitle.line_char_limit = limit;
        }
        if let Some(scale) = self.secondary_scale {
            config.subtitle.secondary_scale = scale;
        }
        if let Some(track) = self.subs_track {
            config.media.subtitle_track = track;
        }

        // Flags only ever switch behaviour on
        config.subtitle.merge |= self.merge;
        config.subtitle.reverse |= self.reverse;
        config.translate.pronounce_original |= self.pronounce_original;
        config.translate.pronounce_translated |= self.pronounce_translated;
        config.translate.ignore_line_ends |= self.ignore_line_ends;

        match &self.separator {
            Some(separator) => config.set_separator(separator),
            None => config.validate(),
        }
    }

    pub fn input_type(&self) -> Result<InputType> {
        InputType::from_name(&self.input_type)
    }
}
