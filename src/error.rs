use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtransError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cannot detect language \"{requested}\". Supported either abbreviation or full language name:\n{supported}")]
    UnsupportedLanguage { requested: String, supported: String },

    #[error("Translator \"{requested}\" is not supported. Available translators: {available}")]
    UnsupportedTranslator { requested: String, available: String },

    #[error("Could not extract the subtitles: {0}")]
    VideoExtraction(String),

    #[error("Cannot decode \"{path}\" as {encoding}. Set the encoding explicitly or use --encoding auto")]
    Decode { path: String, encoding: String },

    #[error("No more endpoints left to try ({tried} tried). Wait a while until you get unblocked or update the endpoint list")]
    EndpointsExhausted { tried: usize },

    #[error("Translation kept breaking line boundaries with every separator tried ({tried}). \
             Supply a custom separator with --separator that differs from these")]
    SeparatorsExhausted { tried: String },

    #[error("Subtitle parsing error: {0}")]
    Subtitle(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, SubtransError>;
