//! Request and response shapes of the external services.
//!
//! Responses default every field, so a reply missing fields decodes to
//! placeholders instead of failing.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::types::subtitle::Subtitle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WhisperModel {
    #[default]
    #[serde(rename = "whisper-1")]
    Whisper1,
    #[serde(rename = "whisper-large")]
    WhisperLarge,
    #[serde(rename = "base")]
    Base,
}

impl WhisperModel {
    pub const ALL: [WhisperModel; 3] = [WhisperModel::Whisper1, WhisperModel::WhisperLarge, WhisperModel::Base];

    pub fn as_str(&self) -> &'static str {
        match self {
            WhisperModel::Whisper1 => "whisper-1",
            WhisperModel::WhisperLarge => "whisper-large",
            WhisperModel::Base => "base",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WhisperModel::Whisper1 => "Whisper v1",
            WhisperModel::WhisperLarge => "Whisper Large",
            WhisperModel::Base => "Base",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionRequest {
    /// Sent as a binary part next to the JSON fields.
    #[serde(skip)]
    pub audio: Vec<u8>,
    pub file_name: String,
    pub language: String,
    pub model: WhisperModel,
    pub temperature: f32,
}

impl TranscriptionRequest {
    pub fn new(audio: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            audio,
            file_name: file_name.into(),
            language: "auto".to_string(),
            model: WhisperModel::default(),
            temperature: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptSegment {
    pub id: String,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptionMetadata {
    pub model: String,
    pub language: String,
    pub temperature: f32,
    pub duration: f64,
    pub file_size: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptionResponse {
    pub segments: Vec<TranscriptSegment>,
    pub metadata: TranscriptionMetadata,
}

impl TranscriptionResponse {
    /// Subtitles in segment order, with ids left for the store to mint.
    pub fn to_subtitles(&self) -> Vec<Subtitle> {
        self.segments
            .iter()
            .map(|segment| Subtitle::new(segment.start_time.max(0.0), segment.end_time.max(0.0), segment.text.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationResponse {
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DubbingRequest {
    pub text: String,
    pub language: String,
    pub voice: String,
    pub speed: f32,
    pub pitch: f32,
}

impl DubbingRequest {
    pub fn new(text: impl Into<String>, language: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            voice: voice.into(),
            speed: 1.0,
            pitch: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub speed: f32,
    pub pitch: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self { speed: 1.0, pitch: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DubbingMetadata {
    pub generated: String,
    pub service: String,
    pub quality: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DubbingResponse {
    pub audio_url: String,
    pub duration: f64,
    pub text: String,
    pub language: String,
    pub voice: String,
    pub settings: VoiceSettings,
    pub metadata: DubbingMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectLanguageRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectLanguageResponse {
    pub language: String,
    pub confidence: f32,
}

impl Default for DetectLanguageResponse {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            confidence: 0.0,
        }
    }
}

pub trait TranscriptionService: Send + Sync {
    fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionResponse, ServiceError>;
}

pub trait TranslationService: Send + Sync {
    fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse, ServiceError>;
}

pub trait DubbingService: Send + Sync {
    fn dub(&self, request: &DubbingRequest) -> Result<DubbingResponse, ServiceError>;
}

pub trait LanguageDetector: Send + Sync {
    fn detect(&self, request: &DetectLanguageRequest) -> Result<DetectLanguageResponse, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ServiceError> {
        Ok(serde_json::from_str(body)?)
    }

    #[test]
    fn test_transcription_response_decodes_camel_case() {
        let body = r#"{
            "segments": [{"id": "1", "text": "Hi", "startTime": 0, "endTime": 3, "confidence": 0.9}],
            "metadata": {"model": "whisper-1", "language": "en", "temperature": 0.3, "duration": 15, "fileSize": 42}
        }"#;
        let response: TranscriptionResponse = decode(body).unwrap();
        assert_eq!(response.segments[0].end_time, 3.0);
        assert_eq!(response.metadata.file_size, 42);
        let subs = response.to_subtitles();
        assert_eq!(subs[0].text, "Hi");
        assert_eq!((subs[0].start, subs[0].end), (0.0, 3.0));
    }

    #[test]
    fn test_missing_fields_degrade_to_defaults() {
        let response: TranscriptionResponse = decode(r#"{"segments": [{"text": "only text"}]}"#).unwrap();
        assert_eq!(response.segments[0].start_time, 0.0);
        assert_eq!(response.metadata, TranscriptionMetadata::default());

        let dub: DubbingResponse = decode(r#"{"audioUrl": "/a.mp3"}"#).unwrap();
        assert_eq!(dub.settings, VoiceSettings::default());

        let detected: DetectLanguageResponse = decode("{}").unwrap();
        assert_eq!(detected.language, "en");
    }

    #[test]
    fn test_malformed_body_is_service_error() {
        let err = decode::<TranslationResponse>("not json").unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }

    #[test]
    fn test_request_shapes() {
        let request = TranslationRequest {
            text: "Hello".into(),
            source_language: "en".into(),
            target_language: "fa".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["targetLanguage"], "fa");

        let transcription = TranscriptionRequest::new(vec![1, 2, 3], "clip.wav");
        let json = serde_json::to_value(&transcription).unwrap();
        assert_eq!(json["model"], "whisper-1");
        assert_eq!(json["language"], "auto");
        assert!(json.get("audio").is_none());
    }
}
