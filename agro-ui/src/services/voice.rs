//! Voice guidance
//!
//! Speaks the diagnosis in the farmer's chosen language. Synthesis goes through
//! [`SpeechSynthesizer`]; the production implementation calls the Google
//! Translate TTS endpoint, which accepts at most ~100 characters per request,
//! so longer messages are split on word boundaries and the returned MP3
//! streams are concatenated.

use agro_common::config::VoiceConfig;
use agro_common::Language;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Longest text sent in one synthesis request, in characters
pub const MAX_CHUNK_CHARS: usize = 100;

/// Speech synthesis errors
#[derive(Debug, Error)]
pub enum VoiceError {
    /// Voice playback switched off in configuration
    #[error("Voice assistance is disabled")]
    Disabled,

    /// Network or HTTP client failure
    #[error("Speech service request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Speech service answered with a non-success status
    #[error("Speech service returned status {0}")]
    Status(u16),

    /// Speech service returned no audio
    #[error("Speech service returned no audio")]
    EmptyAudio,
}

/// Converts text to MP3 audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` using the locale `lang_code` (e.g. "en")
    async fn synthesize(&self, text: &str, lang_code: &str) -> Result<Vec<u8>, VoiceError>;
}

/// Google Translate TTS client
pub struct TranslateTtsClient {
    client: reqwest::Client,
    endpoint: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TranslateTtsClient {
    pub fn new(config: &VoiceConfig) -> Result<Self, VoiceError> {
        let quota = governor::Quota::per_second(NonZeroU32::new(5).unwrap_or(NonZeroU32::MIN));

        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (AgroDetect voice assistant)")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/translate_tts", config.base_url.trim_end_matches('/')),
            rate_limiter: governor::RateLimiter::direct(quota),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for TranslateTtsClient {
    async fn synthesize(&self, text: &str, lang_code: &str) -> Result<Vec<u8>, VoiceError> {
        let chunks = split_into_chunks(text, MAX_CHUNK_CHARS);
        let total = chunks.len().to_string();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            self.rate_limiter.until_ready().await;

            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            debug!(lang = lang_code, idx = %idx, total = %total, "Requesting speech chunk");

            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", lang_code),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(VoiceError::Status(response.status().as_u16()));
            }

            audio.extend_from_slice(&response.bytes().await?);
        }

        if audio.is_empty() {
            return Err(VoiceError::EmptyAudio);
        }

        Ok(audio)
    }
}

/// Stand-in used when voice assistance is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSynthesizer;

#[async_trait]
impl SpeechSynthesizer for DisabledSynthesizer {
    async fn synthesize(&self, _text: &str, _lang_code: &str) -> Result<Vec<u8>, VoiceError> {
        Err(VoiceError::Disabled)
    }
}

/// Split `text` into chunks of at most `max_chars` characters
///
/// Breaks between words where possible; a single word longer than
/// `max_chars` is cut at the character limit.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Synthesized voice message ready for playback
#[derive(Debug, Clone)]
pub struct VoiceClip {
    pub language: Language,
    pub text: String,
    pub audio: Vec<u8>,
}

impl VoiceClip {
    /// `data:` URI for an inline `<audio>` element
    pub fn data_uri(&self) -> String {
        format!("data:audio/mpeg;base64,{}", STANDARD.encode(&self.audio))
    }
}

/// Speaks the fixed diagnosis message for a language
#[derive(Clone)]
pub struct VoiceRenderer {
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl VoiceRenderer {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { synthesizer }
    }

    /// Build the renderer described by `config`
    pub fn from_config(config: &VoiceConfig) -> Result<Self, VoiceError> {
        if !config.enabled {
            return Ok(Self::new(Arc::new(DisabledSynthesizer)));
        }
        Ok(Self::new(Arc::new(TranslateTtsClient::new(config)?)))
    }

    pub async fn render(&self, language: Language) -> Result<VoiceClip, VoiceError> {
        let text = language.voice_message();
        let audio = self.synthesizer.synthesize(&text, language.code()).await?;

        Ok(VoiceClip {
            language,
            text,
            audio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every request and answers with fixed bytes
    #[derive(Default)]
    struct RecordingSynthesizer {
        requests: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSynthesizer {
        async fn synthesize(&self, text: &str, lang_code: &str) -> Result<Vec<u8>, VoiceError> {
            self.requests
                .lock()
                .unwrap()
                .push((text.to_string(), lang_code.to_string()));
            Ok(b"ID3fake-mp3".to_vec())
        }
    }

    #[tokio::test]
    async fn test_render_sends_concatenated_message_per_language() {
        let synth = Arc::new(RecordingSynthesizer::default());
        let renderer = VoiceRenderer::new(synth.clone());

        for language in Language::ALL {
            let clip = renderer.render(language).await.unwrap();
            let text = language.voice_text();
            let expected = format!("{} {} {}", text.problem, text.solution, text.plan);
            assert_eq!(clip.text, expected);
            assert_eq!(clip.audio, b"ID3fake-mp3");
        }

        let requests = synth.requests.lock().unwrap();
        let codes: Vec<&str> = requests.iter().map(|(_, code)| code.as_str()).collect();
        assert_eq!(codes, vec!["en", "te", "hi"]);
        assert!(requests[1].0.starts_with("పంటలో"));
    }

    #[tokio::test]
    async fn test_disabled_synthesizer_fails() {
        let renderer = VoiceRenderer::from_config(&VoiceConfig {
            enabled: false,
            ..VoiceConfig::default()
        })
        .unwrap();

        let err = renderer.render(Language::Hindi).await.unwrap_err();
        assert!(matches!(err, VoiceError::Disabled));
    }

    #[tokio::test]
    async fn test_unreachable_service_reports_error() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let client = TranslateTtsClient::new(&VoiceConfig {
            enabled: true,
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
        })
        .unwrap();

        let result = client.synthesize("hello", "en").await;
        assert!(matches!(result, Err(VoiceError::Request(_))));
    }

    #[test]
    fn test_chunks_respect_limit() {
        for language in Language::ALL {
            let message = language.voice_message();
            let chunks = split_into_chunks(&message, MAX_CHUNK_CHARS);
            assert!(!chunks.is_empty());
            for chunk in &chunks {
                assert!(chunk.chars().count() <= MAX_CHUNK_CHARS, "chunk too long: {}", chunk);
            }
            assert_eq!(chunks.join(" "), message);
        }
    }

    #[test]
    fn test_chunks_break_between_words() {
        let chunks = split_into_chunks("aaa bbb ccc", 7);
        assert_eq!(chunks, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_long_word_is_cut() {
        let chunks = split_into_chunks("abcdefghij xy", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(split_into_chunks("   ", 10).is_empty());
    }

    #[test]
    fn test_data_uri() {
        let clip = VoiceClip {
            language: Language::English,
            text: String::new(),
            audio: b"abc".to_vec(),
        };
        assert_eq!(clip.data_uri(), "data:audio/mpeg;base64,YWJj");
    }
}
