//! `translate.google.*` web RPC backend (`TranslateWebserverUi/data/batchexecute`).
//!
//! Every text is requested twice: once read for its literal translation and once
//! for pronunciations, since a single reading cannot be relied upon for both.
//! Pronunciations drop newlines, so styling that depends on line breaks does not
//! survive when pronunciation output is used.

use async_trait::async_trait;
use reqwest::header::REFERER;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::Result;
use super::endpoint::{fetch_text, EndpointReply, EndpointRotation};
use super::language::BATCHEXECUTE_LANGUAGES;
use super::{Language, Translated, Translator};

const HOST_BASE: &str = "translate.google.";
const CHAR_LIMIT: usize = 5000;
const RPC_ID: &str = "MkEWBc";

/// Which parts of a reply to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reading {
    Plain,
    Pronounced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RpcReply {
    pub text: String,
    pub pronounce_original: Option<String>,
    pub pronounce_translated: Option<String>,
}

pub struct BatchexecuteTranslator {
    client: Client,
    endpoints: EndpointRotation,
    char_limit: usize,
}

impl BatchexecuteTranslator {
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
        self.client
            .post(format!("https://{}/_/TranslateWebserverUi/data/batchexecute", host))
            .header(REFERER, format!("https://{}/", host))
            .form(&[("f.req", rpc_payload(text, to_lang))])
    }

    async fn call(&self, text: &str, language: &Language, reading: Reading) -> Result<RpcReply> {
        self.endpoints
            .first_answer(|host| {
                let request = self.request(&host, text, &language.abbreviation);
                async move {
                    fetch_text(request)
                        .await
                        .and_then(|body| EndpointReply::from_option(parse_reply(&body, reading), "unexpected reply shape"))
                }
            })
            .await
    }

    async fn translate_one(&self, text: &str, language: &Language) -> Result<Translated> {
        read_both(text, move |reading| self.call(text, language, reading)).await
    }
}

/// Pronounced reading first, then the plain one
pub(crate) async fn read_both<F, Fut>(text: &str, mut call: F) -> Result<Translated>
where
    F: FnMut(Reading) -> Fut,
    Fut: Future<Output = Result<RpcReply>>,
{
    let pronounced = call(Reading::Pronounced).await?;
    let plain = call(Reading::Plain).await?;
    Ok(merge_readings(text, pronounced, plain))
}

/// Missing pronunciations fall back to the literal texts
pub(crate) fn merge_readings(text: &str, pronounced: RpcReply, plain: RpcReply) -> Translated {
    let translated = plain.text.trim().to_string();

    Translated {
        original: text.to_string(),
        pronounce_original: pronounced.pronounce_original.unwrap_or_else(|| text.to_string()),
        pronounce_translated: pronounced.pronounce_translated.unwrap_or_else(|| translated.clone()),
        translated,
    }
}

/// `f.req` form value for one text
pub(crate) fn rpc_payload(text: &str, to_lang: &str) -> String {
    let parameter = json!([[text.trim(), "auto", to_lang, true], [1]]);
    json!([[[RPC_ID, parameter.to_string(), null, "generic"]]]).to_string()
}

/// Read the RPC line out of a batchexecute response body
pub(crate) fn parse_reply(body: &str, reading: Reading) -> Option<RpcReply> {
    let line = body.lines().find(|line| line.contains(RPC_ID))?;
    // The line is sometimes cut before the closing bracket
    let envelope = serde_json::from_str::<Value>(line)
        .or_else(|_| serde_json::from_str::<Value>(&format!("{}]", line)))
        .ok()?;
    let payload: Value = serde_json::from_str(envelope.get(0)?.get(2)?.as_str()?).ok()?;

    let best = payload.get(1)?.get(0)?.get(0)?;
    let text = match best.get(5).and_then(Value::as_array) {
        Some(sentences) => sentences
            .iter()
            .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(" "),
        // Only a url or a single word came back
        None => best.get(0)?.as_str()?.to_string(),
    };

    let (pronounce_original, pronounce_translated) = match reading {
        Reading::Plain => (None, None),
        Reading::Pronounced => (
            payload.get(0).and_then(|source| source.get(0)).and_then(non_empty),
            best.get(1).and_then(non_empty),
        ),
    };

    Some(RpcReply {
        text,
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
impl Translator for BatchexecuteTranslator {
    /// Two requests per text, in order
    async fn translate(&self, texts: &[String], language: &Language) -> Result<Vec<Translated>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            debug!("Translating {} chars to {}", text.chars().count(), language.abbreviation);
            results.push(self.translate_one(text, language).await?);
        }
        Ok(results)
    }

    fn detect_language(&self, name: &str) -> Option<Language> {
        BATCHEXECUTE_LANGUAGES.detect(name)
    }

    fn supported(&self) -> String {
        BATCHEXECUTE_LANGUAGES.listing()
    }

    fn char_limit(&self) -> usize {
        self.char_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubtransError;

    fn response_body(payload: &Value, close_bracket: bool) -> String {
        let envelope = json!([["wrb.fr", RPC_ID, payload.to_string(), null, null, null, "generic"]]).to_string();
        let line = if close_bracket {
            envelope
        } else {
            envelope[..envelope.len() - 1].to_string()
        };
        [")]}'", "", "1234", line.as_str(), "25", "[[\"e\",4,null,null,1337]]"].join("\n")
    }

    fn korean_payload() -> Value {
        json!([
            ["Ogenkidesuka?", null, "ja", [[[0, [[[null, 6]], [true]]]], 6]],
            [
                [[
                    "잘 지내?",
                    "jal jinae?",
                    null,
                    null,
                    null,
                    [["잘 지내? ", null, null, null, [["잘 지내?", [5]]]]]
                ]],
                "ko",
                1,
                "ja",
                ["お元気ですか？", "ja", "ko", true]
            ],
            "ja"
        ])
    }

    #[test]
    fn test_rpc_payload() {
        assert_eq!(
            rpc_payload(" Hello ", "ja"),
            r#"[[["MkEWBc","[[\"Hello\",\"auto\",\"ja\",true],[1]]",null,"generic"]]]"#
        );
    }

    #[test]
    fn test_pronounced_reading() {
        let reply = parse_reply(&response_body(&korean_payload(), true), Reading::Pronounced).unwrap();
        assert_eq!(reply.text, "잘 지내?");
        assert_eq!(reply.pronounce_original.as_deref(), Some("Ogenkidesuka?"));
        assert_eq!(reply.pronounce_translated.as_deref(), Some("jal jinae?"));
    }

    #[test]
    fn test_plain_reading_ignores_pronunciation() {
        let reply = parse_reply(&response_body(&korean_payload(), false), Reading::Plain).unwrap();
        assert_eq!(reply.text, "잘 지내?");
        assert_eq!(reply.pronounce_original, None);
        assert_eq!(reply.pronounce_translated, None);
    }

    #[test]
    fn test_missing_pronunciation_is_none() {
        let payload = json!([
            [null, null, "en"],
            [[["Hola", null, null, null, null, [["Hola", null, null, null, [["Hola", [5]]]]]]], "es"]
        ]);
        let reply = parse_reply(&response_body(&payload, true), Reading::Pronounced).unwrap();
        assert_eq!(reply.text, "Hola");
        assert_eq!(reply.pronounce_original, None);
        assert_eq!(reply.pronounce_translated, None);
    }

    #[test]
    fn test_url_only_reply() {
        let payload = json!([[null], [[["https://example.com"]], "en"]]);
        let reply = parse_reply(&response_body(&payload, true), Reading::Plain).unwrap();
        assert_eq!(reply.text, "https://example.com");
    }

    fn reply(text: &str, pronounce_original: Option<&str>, pronounce_translated: Option<&str>) -> RpcReply {
        RpcReply {
            text: text.to_string(),
            pronounce_original: pronounce_original.map(str::to_string),
            pronounce_translated: pronounce_translated.map(str::to_string),
        }
    }

    #[test]
    fn test_merge_uses_pronunciations() {
        let pronounced = reply("잘 지내?", Some("Ogenkidesuka?"), Some("jal jinae?"));
        let translated = merge_readings("お元気ですか？", pronounced, reply(" 잘 지내? ", None, None));

        assert_eq!(translated.original, "お元気ですか？");
        assert_eq!(translated.translated, "잘 지내?");
        assert_eq!(translated.original_text(true), "Ogenkidesuka?");
        assert_eq!(translated.translated_text(true), "jal jinae?");
    }

    #[test]
    fn test_merge_falls_back_to_literal_text() {
        let translated = merge_readings("Hello", reply("Hola", None, None), reply("Hola\n", None, None));

        assert_eq!(translated.translated, "Hola");
        assert_eq!(translated.original_text(true), "Hello");
        assert_eq!(translated.translated_text(true), "Hola");
    }

    #[test]
    fn test_empty_pronunciation_falls_back_through_parsing() {
        let payload = json!([
            ["", null, "en"],
            [[["Hola", "", null, null, null, [["Hola", null, null, null, [["Hola", [5]]]]]]], "es"]
        ]);
        let body = response_body(&payload, true);
        let pronounced = parse_reply(&body, Reading::Pronounced).unwrap();
        let plain = parse_reply(&body, Reading::Plain).unwrap();
        let translated = merge_readings("Hello", pronounced, plain);

        assert_eq!(translated.original_text(true), "Hello");
        assert_eq!(translated.translated_text(true), "Hola");
    }

    #[tokio::test]
    async fn test_two_readings_per_text_in_order() {
        let mut readings = Vec::new();
        let translated = read_both("Hello", |reading| {
            readings.push(reading);
            let answer = match reading {
                Reading::Pronounced => reply("Hola", Some("heh-loh"), None),
                Reading::Plain => reply("Hola ", None, None),
            };
            async move { Ok(answer) }
        })
        .await
        .unwrap();

        assert_eq!(readings, vec![Reading::Pronounced, Reading::Plain]);
        assert_eq!(translated.translated, "Hola");
        assert_eq!(translated.pronounce_original, "heh-loh");
        assert_eq!(translated.pronounce_translated, "Hola");
    }

    #[tokio::test]
    async fn test_blocked_reading_stops_the_text() {
        let mut calls = 0;
        let result = read_both("Hello", |_| {
            calls += 1;
            async { Err(SubtransError::EndpointsExhausted { tried: 3 }) }
        })
        .await;

        assert!(matches!(result, Err(SubtransError::EndpointsExhausted { tried: 3 })));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_blocked_page_is_rejected() {
        assert!(parse_reply("<html>Our systems have detected unusual traffic</html>", Reading::Plain).is_none());
        assert!(parse_reply("[[\"wrb.fr\",\"MkEWBc\",null]]", Reading::Plain).is_none());
    }
}
