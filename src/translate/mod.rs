// Subtitle translation architecture
//
// Lines are grouped into sentences, sentences are packed into chunks that fit a
// single request, and each chunk is joined with a separator that survives the
// round trip through the translation service:
// - sentence: Sentence grouping and chunk packing
// - chunk: Joining chunk lines and splitting translations back apart
// - negotiate: Retrying with the next separator when line boundaries get lost
// - gtx / batchexecute: The two Google Translate backends, behind `Translator`
// - endpoint: Regional endpoint failover shared by both backends

pub mod sentence;
pub mod chunk;
pub mod negotiate;
pub mod language;
pub mod endpoint;
pub mod gtx;
pub mod batchexecute;

use async_trait::async_trait;

pub use language::Language;
pub use negotiate::{Negotiated, SeparatorNegotiator};
pub use sentence::{group_into_sentences, pack_into_chunks, Chunk, SentenceEndings};
use crate::config::{TranslateConfig, TranslatorKind};
use crate::error::Result;

/// One translated request string with its pronunciations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    pub original: String,
    pub translated: String,
    /// Falls back to `original` when the backend cannot pronounce it
    pub pronounce_original: String,
    /// Falls back to `translated` when the backend cannot pronounce it
    pub pronounce_translated: String,
}

impl Translated {
    /// Translation without any pronunciation data
    pub fn literal(original: impl Into<String>, translated: impl Into<String>) -> Self {
        let original = original.into();
        let translated = translated.into();
        Self {
            pronounce_original: original.clone(),
            pronounce_translated: translated.clone(),
            original,
            translated,
        }
    }

    pub fn original_text(&self, pronounce: bool) -> &str {
        if pronounce { &self.pronounce_original } else { &self.original }
    }

    pub fn translated_text(&self, pronounce: bool) -> &str {
        if pronounce { &self.pronounce_translated } else { &self.translated }
    }
}

/// Main trait for translation backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate every text in order, one result per text
    async fn translate(&self, texts: &[String], language: &Language) -> Result<Vec<Translated>>;

    /// Resolve an abbreviation or full language name
    fn detect_language(&self, name: &str) -> Option<Language>;

    /// Human readable listing of supported languages
    fn supported(&self) -> String;

    /// Longest request the backend accepts, in characters
    fn char_limit(&self) -> usize;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create the translator selected in the configuration
    pub fn create_translator(config: &TranslateConfig) -> Result<Box<dyn Translator>> {
        Self::create(config.translator, config)
    }

    pub fn create(kind: TranslatorKind, config: &TranslateConfig) -> Result<Box<dyn Translator>> {
        let translator: Box<dyn Translator> = match kind {
            TranslatorKind::Gtx => Box::new(gtx::GtxTranslator::new(config)?),
            TranslatorKind::Batchexecute => Box::new(batchexecute::BatchexecuteTranslator::new(config)?),
        };
        Ok(translator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_falls_back_to_text() {
        let translated = Translated::literal("Hello", "Hola");
        assert_eq!(translated.original_text(true), "Hello");
        assert_eq!(translated.translated_text(true), "Hola");
        assert_eq!(translated.translated_text(false), "Hola");
    }

    #[test]
    fn test_factory_respects_kind() {
        let config = TranslateConfig::default();
        let gtx = TranslatorFactory::create(TranslatorKind::Gtx, &config).unwrap();
        let batch = TranslatorFactory::create(TranslatorKind::Batchexecute, &config).unwrap();

        assert!(gtx.detect_language("he").is_some());
        assert!(batch.detect_language("he").is_none());
        assert_eq!(gtx.char_limit(), 5000);
        assert_eq!(batch.char_limit(), 5000);
    }
}
