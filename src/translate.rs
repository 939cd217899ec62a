use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::error::{CatalogError, Result};
use crate::llm::{ChatMessage, CompletionRequest, LanguageModel};

const TRANSLATOR_ROLE: &str = "You are a professional English to Hindi translator.";

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>?").expect("html tag pattern is valid"));
static SURROUNDING_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"(.*)"$"#).expect("quote pattern is valid"));
static TRAILING_STOPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[।॥|.]+$").expect("sentence stop pattern is valid"));

/// English to Hindi product description translation.
pub struct Translator {
    model: Arc<dyn LanguageModel>,
    temperature: f32,
    max_tokens: u32,
}

impl Translator {
    pub fn new(model: Arc<dyn LanguageModel>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            temperature,
            max_tokens,
        }
    }

    pub async fn translate(&self, text: &str) -> Result<String> {
        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system(TRANSLATOR_ROLE),
                ChatMessage::user(build_translation_prompt(text)),
            ],
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        };

        let raw = self
            .model
            .complete(request)
            .await
            .map_err(|e| CatalogError::TranslationFailed(Box::new(e)))?;

        Ok(sanitize_translation(&raw))
    }
}

pub fn build_translation_prompt(text: &str) -> String {
    format!(
        r#"
Translate the following English product description into **natural, fluent Hindi** as spoken by a native Hindi speaker.
Avoid robotic or literal translation. Make sure it sounds smooth, clean, and human-like.

Example:
English: "Apple MacBook Pro with M2 chip and Retina Display"
Hindi: "एम2 चिप और रेटिना डिस्प्ले वाला एप्पल मैकबुक प्रो"

Now translate:
"{}"
"#,
        text
    )
}

/// Clean a model reply into a bare translation.
///
/// Drops bidi control marks and HTML tags, one pair of surrounding double quotes
/// and trailing sentence stops, then capitalizes the first character.
pub fn sanitize_translation(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '\u{200E}' | '\u{200F}' | '\u{202A}'..='\u{202E}'))
        .collect();

    let untagged = HTML_TAG.replace_all(&stripped, "");
    let unquoted = SURROUNDING_QUOTES.replace(untagged.trim(), "$1");
    let trimmed = TRAILING_STOPS.replace(unquoted.trim(), "");

    capitalize_first(trimmed.trim())
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoModel {
        reply: String,
        seen: Mutex<Option<CompletionRequest>>,
    }

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn complete(&self, request: CompletionRequest) -> Result<String> {
            *self.seen.lock().unwrap() = Some(request);
            Ok(self.reply.clone())
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    struct DownModel;

    #[async_trait]
    impl LanguageModel for DownModel {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            Err(CatalogError::OracleUnavailable("401 Unauthorized".to_string()))
        }

        fn model_name(&self) -> &str {
            "down"
        }
    }

    #[test]
    fn test_sanitize_hindi_reply() {
        assert_eq!(
            sanitize_translation("\u{200E}\"एम2 चिप वाला लैपटॉप।\""),
            "एम2 चिप वाला लैपटॉप"
        );
    }

    #[test]
    fn test_sanitize_strips_html_and_bidi_marks() {
        assert_eq!(
            sanitize_translation("\u{202B}<b>शानदार</b> कैमरा\u{202C}"),
            "शानदार कैमरा"
        );
        assert_eq!(sanitize_translation("फ़ोन <br"), "फ़ोन");
    }

    #[test]
    fn test_sanitize_capitalizes_latin_first_letter() {
        assert_eq!(sanitize_translation("  \"iphone 15 प्रो||\"  "), "Iphone 15 प्रो");
        assert_eq!(sanitize_translation("apple वॉच."), "Apple वॉच");
    }

    #[test]
    fn test_sanitize_only_one_quote_pair() {
        assert_eq!(sanitize_translation("\"\"दोहरा\"\""), "\"दोहरा\"");
        assert_eq!(sanitize_translation("\"अधूरा"), "\"अधूरा");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_translation(""), "");
        assert_eq!(sanitize_translation("\u{200F}  ।"), "");
    }

    #[test]
    fn test_prompt_quotes_input() {
        let prompt = build_translation_prompt("Pixel 8 with Tensor G3");
        assert!(prompt.contains("\"Pixel 8 with Tensor G3\""));
        assert!(prompt.contains("natural, fluent Hindi"));
    }

    #[tokio::test]
    async fn test_translate_request_shape() {
        let model = Arc::new(EchoModel {
            reply: "\"टेंसर जी3 वाला पिक्सेल 8।\"".to_string(),
            seen: Mutex::new(None),
        });
        let translator = Translator::new(model.clone(), 0.7, 100);

        let translated = translator.translate("Pixel 8 with Tensor G3").await.unwrap();
        assert_eq!(translated, "टेंसर जी3 वाला पिक्सेल 8");

        let seen = model.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.messages.len(), 2);
        assert_eq!(seen.messages[0].role, "system");
        assert_eq!(seen.messages[0].content, TRANSLATOR_ROLE);
        assert_eq!(seen.temperature, Some(0.7));
        assert_eq!(seen.max_tokens, Some(100));
    }

    #[tokio::test]
    async fn test_translate_failure() {
        let translator = Translator::new(Arc::new(DownModel), 0.7, 100);
        let err = translator.translate("anything").await.unwrap_err();
        assert!(matches!(err, CatalogError::TranslationFailed(_)));
    }
}
