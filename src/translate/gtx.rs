//! `translate.googleapis.*/translate_a/single` backend.
//!
//! The reply is a nested JSON array whose first element lists translation groups.
//! Pronunciation data, when present, sits in an extra group at the end:
//!
//! ```text
//! how are you? -> es   [["¿cómo estás?", "how are you?", null, null, 1]]
//! how are you? -> ja   [["お元気ですか？", "how are you?", null, null, 1], [null, null, "Ogenkidesuka?"]]
//! お元気ですか？ -> en  [["How are you?", "お元気ですか？", null, null, 1], [null, null, null, "Ogenkidesuka?"]]
//! お元気ですか？ -> ko  [["잘 지내?", "お元気ですか？", null, null, 0], [null, null, "jal jinae?", "Ogenkidesuka?"]]
//! ```
//!
//! The last group carries pronunciations only when its last element is a string.
//! The original is pronounced when that group has exactly four elements (index 3),
//! the translation when index 2 is not null.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::Result;
use super::endpoint::{fetch_text, EndpointReply, EndpointRotation};
use super::language::GTX_LANGUAGES;
use super::{Language, Translated, Translator};

const HOST_BASE: &str = "translate.googleapis.";
const CHAR_LIMIT: usize = 5000;
const DATA_TYPES: [&str; 10] = ["at", "bd", "ex", "ld", "md", "qca", "rw", "rm", "ss", "t"];

pub struct GtxTranslator {
    client: Client,
    endpoints: EndpointRotation,
    char_limit: usize,
}

impl GtxTranslator {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("subtrans/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoints: EndpointRotation::new(HOST_BASE, &config.endpoints),
            char_limit: config.char_limit.unwrap_or(CHAR_LIMIT),
        })
    }

    fn request(&self, host: &str, text: &str, to_lang: &str) -> RequestBuilder {
        let mut query = vec![
            ("client", "gtx"),
            ("sl", "auto"),
            ("tl", to_lang),
            ("hl", to_lang),
            ("ie", "UTF-8"),
            ("oe", "UTF-8"),
            ("otf", "1"),
            ("ssel", "0"),
            ("tsel", "0"),
        ];
        query.extend(DATA_TYPES.iter().map(|data_type| ("dt", *data_type)));
        query.push(("q", text));

        self.client
            .get(format!("https://{}/translate_a/single", host))
            .query(&query)
    }

    async fn translate_one(&self, text: &str, language: &Language) -> Result<Translated> {
        self.endpoints
            .first_answer(|host| {
                let request = self.request(&host, text, &language.abbreviation);
                async move {
                    fetch_text(request)
                        .await
                        .and_then(|body| {
                            EndpointReply::from_option(serde_json::from_str::<Value>(&body).ok(), "malformed JSON")
                        })
                        .and_then(|data| EndpointReply::from_option(parse_reply(text, &data), "unexpected reply shape"))
                }
            })
            .await
    }
}

/// Extract the translation and pronunciations from a reply
pub(crate) fn parse_reply(original: &str, data: &Value) -> Option<Translated> {
    let groups = data.get(0)?.as_array()?;

    let translated: String = groups
        .iter()
        .filter_map(|group| group.get(0).and_then(Value::as_str))
        .collect();
    let translated = translated.trim().to_string();

    let pronunciation = groups
        .last()
        .and_then(Value::as_array)
        .filter(|group| group.last().is_some_and(Value::is_string));

    let pronounce_original = pronunciation
        .filter(|group| group.len() == 4)
        .and_then(|group| non_empty(&group[3]))
        .unwrap_or_else(|| original.to_string());

    let pronounce_translated = pronunciation
        .and_then(|group| group.get(2))
        .and_then(non_empty)
        .unwrap_or_else(|| translated.clone());

    Some(Translated {
        original: original.to_string(),
        translated,
        pronounce_original,
        pronounce_translated,
    })
}

fn non_empty(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Translator for GtxTranslator {
    /// One request per text, in order
    async fn translate(&self, texts: &[String], language: &Language) -> Result<Vec<Translated>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            debug!("Translating {} chars to {}", text.chars().count(), language.abbreviation);
            results.push(self.translate_one(text, language).await?);
        }
        Ok(results)
    }

    fn detect_language(&self, name: &str) -> Option<Language> {
        GTX_LANGUAGES.detect(name)
    }

    fn supported(&self) -> String {
        GTX_LANGUAGES.listing()
    }

    fn char_limit(&self) -> usize {
        self.char_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_pronunciation() {
        let data = json!([[["¿cómo estás?", "how are you?", null, null, 1]], null, "en"]);
        let reply = parse_reply("how are you?", &data).unwrap();

        assert_eq!(reply.translated, "¿cómo estás?");
        assert_eq!(reply.pronounce_original, "how are you?");
        assert_eq!(reply.pronounce_translated, "¿cómo estás?");
    }

    #[test]
    fn test_translation_pronounced() {
        let data = json!([[
            ["お元気ですか？", "how are you?", null, null, 1],
            [null, null, "Ogenkidesuka?"]
        ]]);
        let reply = parse_reply("how are you?", &data).unwrap();

        assert_eq!(reply.translated, "お元気ですか？");
        assert_eq!(reply.pronounce_original, "how are you?");
        assert_eq!(reply.pronounce_translated, "Ogenkidesuka?");
    }

    #[test]
    fn test_original_pronounced() {
        let data = json!([[
            ["How are you?", "お元気ですか？", null, null, 1],
            [null, null, null, "Ogenkidesuka?"]
        ]]);
        let reply = parse_reply("お元気ですか？", &data).unwrap();

        assert_eq!(reply.translated, "How are you?");
        assert_eq!(reply.pronounce_original, "Ogenkidesuka?");
        assert_eq!(reply.pronounce_translated, "How are you?");
    }

    #[test]
    fn test_both_pronounced() {
        let data = json!([[
            ["잘 지내?", "お元気ですか？", null, null, 0],
            [null, null, "jal jinae?", "Ogenkidesuka?"]
        ]]);
        let reply = parse_reply("お元気ですか？", &data).unwrap();

        assert_eq!(reply.translated, "잘 지내?");
        assert_eq!(reply.pronounce_original, "Ogenkidesuka?");
        assert_eq!(reply.pronounce_translated, "jal jinae?");
    }

    #[test]
    fn test_multiple_groups_are_concatenated() {
        let data = json!([[
            ["Hola. ", "Hello. ", null, null, 3],
            ["¿Cómo estás? ", "How are you? ", null, null, 3]
        ]]);
        let reply = parse_reply("Hello. How are you?", &data).unwrap();
        assert_eq!(reply.translated, "Hola. ¿Cómo estás?");
    }

    #[test]
    fn test_unexpected_shape_is_rejected() {
        assert!(parse_reply("x", &json!({"error": "blocked"})).is_none());
        assert!(parse_reply("x", &json!([null])).is_none());
    }
}
