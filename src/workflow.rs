use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{Config, InputType};
use crate::error::{Result, SubtransError};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::subtitle::style::{InlineStyle, Projector};
use crate::subtitle::{SubtitleEvent, SubtitleFile, SubtitleFormat};
use crate::translate::{
    group_into_sentences, pack_into_chunks, Chunk, Language, SentenceEndings, SeparatorNegotiator,
    Translator, TranslatorFactory,
};

pub struct Workflow {
    config: Config,
    translator: Box<dyn Translator>,
    media: Box<dyn MediaProcessorTrait>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let translator = TranslatorFactory::create_translator(&config.translate)?;
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        Ok(Self::with_components(config, translator, media))
    }

    /// Build a workflow around already constructed backends
    pub fn with_components(
        config: Config,
        translator: Box<dyn Translator>,
        media: Box<dyn MediaProcessorTrait>,
    ) -> Self {
        Self {
            config,
            translator,
            media,
        }
    }

    /// Resolve the configured target language against the active backend
    pub fn language(&self) -> Result<Language> {
        let requested = &self.config.translate.target_language;
        self.translator
            .detect_language(requested)
            .ok_or_else(|| SubtransError::UnsupportedLanguage {
                requested: requested.clone(),
                supported: self.translator.supported(),
            })
    }

    /// Decide whether `auto` input is a video or a subtitle file
    pub fn resolve_input_type(path: &Path, input_type: InputType) -> InputType {
        match input_type {
            InputType::Auto if SubtitleFormat::is_subtitle_path(path) => InputType::Subs,
            InputType::Auto => InputType::Video,
            explicit => explicit,
        }
    }

    /// Translate a subtitle or video file into a subtitle file
    pub async fn translate_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        input_type: InputType,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        // Step 1: Resolve the target language before touching any file
        let language = self.language()?;
        info!("┌─ Translating {} to {}", input_path.display(), language);

        // Step 2: Load subtitles, extracting them from the video first if needed
        let mut subtitles = match Self::resolve_input_type(input_path, input_type) {
            InputType::Video => self.load_from_video(input_path).await?,
            _ => SubtitleFile::load(input_path, self.config.subtitle.encoding).await?,
        };

        // Step 3: Translate and project onto the events
        self.translate_subtitles(&mut subtitles, &language).await?;

        // Step 4: Save in the format of the output extension
        subtitles.save(output_path).await?;
        info!("└─ Saved translated subtitles to {}", output_path.display());

        Ok(())
    }

    async fn load_from_video(&self, video_path: &Path) -> Result<SubtitleFile> {
        if !video_path.exists() {
            return Err(SubtransError::FileNotFound(video_path.display().to_string()));
        }

        self.media.check_availability()?;
        if let Ok(version) = self.media.get_version_info().await {
            debug!("Using {}", version);
        }

        // Removed again once loaded
        let extracted = tempfile::Builder::new()
            .prefix("subtrans-")
            .suffix(".ass")
            .tempfile()?;

        self.media
            .extract_subtitles(video_path, self.config.media.subtitle_track, extracted.path())
            .await?;
        info!("├─ Extracted subtitle track {} from {}", self.config.media.subtitle_track, video_path.display());

        SubtitleFile::load(extracted.path(), self.config.subtitle.encoding).await
    }

    /// Replace the text of every event with its translation
    pub async fn translate_subtitles(&self, subtitles: &mut SubtitleFile, language: &Language) -> Result<()> {
        if subtitles.is_empty() {
            warn!("No subtitle events found, leaving the file unchanged");
            return Ok(());
        }

        let translate = &self.config.translate;
        let styles: Vec<InlineStyle> = subtitles
            .events
            .iter()
            .map(|event| InlineStyle::extract(&event.text))
            .collect();
        let lines: Vec<String> = subtitles.events.iter().map(SubtitleEvent::plaintext).collect();

        let endings = if translate.ignore_line_ends {
            SentenceEndings::EveryLine
        } else {
            SentenceEndings::detect(&translate.sentence_endings, &lines)
        };

        let chunks: Vec<Chunk> = pack_into_chunks(
            group_into_sentences(lines.iter().cloned(), &endings),
            self.translator.char_limit(),
            translate.separator_max_len,
        )
        .collect();
        info!("├─ Packed {} lines into {} requests", lines.len(), chunks.len());

        let negotiated = SeparatorNegotiator::from_config(translate)
            .translate_with_negotiation(&chunks, self.translator.as_ref(), language)
            .await?;
        info!("├─ Translated with separator {:?}", negotiated.separator);

        let (main, secondary) = if self.config.subtitle.reverse {
            (negotiated.original, negotiated.translated)
        } else {
            (negotiated.translated, negotiated.original)
        };

        Projector::from_config(&self.config.subtitle).project(&mut subtitles.events, &styles, &main, &secondary)
    }
}
