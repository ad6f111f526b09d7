use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::TranslateConfig;
use crate::error::{Result, SubtransError};
use super::chunk::{join, split};
use super::{Chunk, Language, Translator};

/// Line-aligned result of a successful negotiation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    pub original: Vec<String>,
    pub translated: Vec<String>,
    /// Separator that kept every line boundary intact
    pub separator: String,
}

/// Tries candidate separators until one survives translation with the line count intact
#[derive(Debug, Clone)]
pub struct SeparatorNegotiator {
    separators: Vec<String>,
    pronounce_original: bool,
    pronounce_translated: bool,
}

impl SeparatorNegotiator {
    pub fn new(separators: Vec<String>) -> Self {
        Self {
            separators,
            pronounce_original: false,
            pronounce_translated: false,
        }
    }

    pub fn from_config(config: &TranslateConfig) -> Self {
        Self::new(config.separators.clone())
            .with_pronunciation(config.pronounce_original, config.pronounce_translated)
    }

    /// Read pronunciations instead of the literal texts
    pub fn with_pronunciation(mut self, original: bool, translated: bool) -> Self {
        self.pronounce_original = original;
        self.pronounce_translated = translated;
        self
    }

    /// Translate all chunks, retrying with the next separator when lines get merged or split.
    ///
    /// Running out of separators is fatal, as is running out of endpoints.
    pub async fn translate_with_negotiation(
        &self,
        chunks: &[Chunk],
        translator: &dyn Translator,
        language: &Language,
    ) -> Result<Negotiated> {
        let expected: usize = chunks.iter().map(Vec::len).sum();

        for separator in &self.separators {
            info!("Trying separator {:?} on {} chunks", separator, chunks.len());
            let (original, translated) = self.attempt(chunks, separator, translator, language).await?;

            if expected > 0 && original.len() == expected && translated.len() == expected {
                info!("Separator {:?} kept all {} lines aligned", separator, expected);
                return Ok(Negotiated {
                    original,
                    translated,
                    separator: separator.clone(),
                });
            }

            warn!(
                "Separator {:?} did not survive translation: expected {} lines, got {} original and {} translated",
                separator, expected, original.len(), translated.len()
            );
        }

        Err(SubtransError::SeparatorsExhausted {
            tried: self
                .separators
                .iter()
                .map(|separator| format!("{:?}", separator))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    async fn attempt(
        &self,
        chunks: &[Chunk],
        separator: &str,
        translator: &dyn Translator,
        language: &Language,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let progress = ProgressBar::new(chunks.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks")
        {
            progress.set_style(style.progress_chars("#>-"));
        }

        let mut original = Vec::new();
        let mut translated = Vec::new();

        // Chunks go out one by one and in order; alignment is purely positional
        for chunk in chunks {
            let request = join(chunk, separator);
            let results = translator
                .translate(std::slice::from_ref(&request), language)
                .await?;

            for result in &results {
                original.extend(split(result.original_text(self.pronounce_original), separator));
                translated.extend(split(result.translated_text(self.pronounce_translated), separator));
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok((original, translated))
    }
}
