//! Deterministic stand-ins for the external services.
//!
//! They answer with canned content so the editor works end to end without a
//! network. Each call can be slowed down with a fixed latency so loading
//! states are visible in the shell.

use std::thread;
use std::time::Duration;

use chrono::Utc;
use regex::Regex;

use crate::error::ServiceError;
use crate::services::contracts::{
    DetectLanguageRequest, DetectLanguageResponse, DubbingMetadata, DubbingRequest, DubbingResponse,
    DubbingService, LanguageDetector, TranscriptSegment, TranscriptionMetadata, TranscriptionRequest,
    TranscriptionResponse, TranscriptionService, TranslationRequest, TranslationResponse,
    TranslationService, VoiceSettings,
};

/// Seconds of speech per character, used to estimate dubbed audio length.
pub const SECONDS_PER_CHAR: f64 = 0.08;
const MOCK_MEDIA_DURATION: f64 = 15.0;

/// English and Persian lines of the canned transcript.
const TRANSCRIPT: [(&str, &str, f32); 5] = [
    ("Welcome to Abbasagha", "به عباس‌آقا خوش آمدید", 0.95),
    ("Professional video editing platform", "پلتفرم ویرایش ویدیوی حرفه‌ای", 0.92),
    ("With automatic subtitle features", "با امکانات زیرنویس خودکار", 0.88),
    ("And intelligent text translation", "و ترجمه هوشمند متن‌ها", 0.9),
    ("Get started now!", "همین حالا شروع کنید!", 0.93),
];

/// (target language, source text, translation)
const DICTIONARY: &[(&str, &str, &str)] = &[
    ("fa", "Welcome to Abbasagha", "به عباس‌آقا خوش آمدید"),
    ("fa", "Professional video editing platform", "پلتفرم ویرایش ویدیوی حرفه‌ای"),
    ("fa", "With automatic subtitle features", "با امکانات زیرنویس خودکار"),
    ("fa", "And intelligent text translation", "و ترجمه هوشمند متن‌ها"),
    ("fa", "Get started now!", "همین حالا شروع کنید!"),
    ("fa", "Create amazing videos", "ویدیوهای شگفت‌انگیز بسازید"),
    ("fa", "Edit with ease", "با سادگی ویرایش کنید"),
    ("fa", "Share your story", "داستان خود را به اشتراک بگذارید"),
    ("ar", "Welcome to Abbasagha", "مرحباً بعباس آغا"),
    ("ar", "Professional video editing platform", "منصة تحرير الفيديو المهنية"),
    ("ar", "With automatic subtitle features", "مع ميزات الترجمة التلقائية"),
    ("ar", "And intelligent text translation", "والترجمة الذكية للنصوص"),
    ("ar", "Get started now!", "ابدأ الآن!"),
    ("es", "Welcome to Abbasagha", "Bienvenido a Abbasagha"),
    ("es", "Professional video editing platform", "Plataforma profesional de edición de video"),
    ("es", "With automatic subtitle features", "Con funciones automáticas de subtítulos"),
    ("es", "And intelligent text translation", "Y traducción inteligente de texto"),
    ("es", "Get started now!", "¡Comienza ahora!"),
];

/// Dictionary lookup, or the text tagged with the target language.
pub fn mock_translation(text: &str, target: &str) -> String {
    DICTIONARY
        .iter()
        .find(|(lang, source, _)| *lang == target && *source == text)
        .map(|(_, _, translated)| translated.to_string())
        .unwrap_or_else(|| format!("[{}] {}", target, text))
}

struct LanguageRule {
    code: &'static str,
    regex: Regex,
    confidence: f32,
}

/// Script and keyword based language guesser. Rules are tried in order;
/// the first match wins and anything unmatched is English.
pub struct LanguageRules {
    rules: Vec<LanguageRule>,
}

impl LanguageRules {
    pub fn new() -> Result<Self, ServiceError> {
        let rule = |code, pattern: &str, confidence| -> Result<LanguageRule, ServiceError> {
            Ok(LanguageRule {
                code,
                regex: Regex::new(pattern)?,
                confidence,
            })
        };
        let rules = vec![
            // Arabic letters fall inside this block too and are reported as Persian.
            rule("fa", r"[\x{0600}-\x{06FF}]", 0.95)?,
            rule("ar", r"[\x{0621}-\x{064A}]", 0.9)?,
            rule("zh", r"[\x{4E00}-\x{9FFF}]", 0.95)?,
            rule("ja", r"[\x{3040}-\x{309F}\x{30A0}-\x{30FF}]", 0.9)?,
            rule("ko", r"[\x{AC00}-\x{D7AF}]", 0.9)?,
            rule(
                "es",
                r"(?i)\b(el|la|los|las|es|está|son|con|por|para|en|de|que|y|o|pero|no|sí)\b",
                0.75,
            )?,
            rule(
                "fr",
                r"(?i)\b(le|la|les|est|sont|avec|pour|dans|de|que|et|ou|mais|non|oui)\b",
                0.75,
            )?,
            rule(
                "de",
                r"(?i)\b(der|die|das|ist|sind|mit|für|in|von|dass|und|oder|aber|nicht|ja)\b",
                0.75,
            )?,
            rule(
                "it",
                r"(?i)\b(il|la|i|le|è|sono|con|per|in|di|che|e|o|ma|no|sì)\b",
                0.75,
            )?,
            rule(
                "pt",
                r"(?i)\b(o|a|os|as|é|são|com|para|em|de|que|e|ou|mas|não|sim)\b",
                0.75,
            )?,
            rule("ru", r"[\x{0400}-\x{04FF}]", 0.9)?,
        ];
        Ok(Self { rules })
    }

    pub fn detect(&self, text: &str) -> (&'static str, f32) {
        self.rules
            .iter()
            .find(|rule| rule.regex.is_match(text))
            .map(|rule| (rule.code, rule.confidence))
            .unwrap_or(("en", 0.7))
    }
}

pub struct MockServices {
    latency: Duration,
    languages: LanguageRules,
}

impl MockServices {
    pub fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            latency: Duration::ZERO,
            languages: LanguageRules::new()?,
        })
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn wait(&self) {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
    }
}

fn required(value: &str, what: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidRequest(format!("{} is required", what)));
    }
    Ok(())
}

impl TranscriptionService for MockServices {
    fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionResponse, ServiceError> {
        if request.audio.is_empty() {
            return Err(ServiceError::InvalidRequest("No audio file provided".to_string()));
        }
        self.wait();
        let persian = request.language == "fa";
        let segments = TRANSCRIPT
            .iter()
            .enumerate()
            .map(|(i, (en, fa, confidence))| TranscriptSegment {
                id: (i + 1).to_string(),
                text: if persian { fa } else { en }.to_string(),
                start_time: i as f64 * 3.0,
                end_time: (i + 1) as f64 * 3.0,
                confidence: *confidence,
            })
            .collect();
        log::info!(
            "mock transcription of {} ({} bytes, {})",
            request.file_name,
            request.audio.len(),
            request.model.as_str()
        );
        Ok(TranscriptionResponse {
            segments,
            metadata: TranscriptionMetadata {
                model: request.model.as_str().to_string(),
                language: request.language.clone(),
                temperature: request.temperature,
                duration: MOCK_MEDIA_DURATION,
                file_size: request.audio.len() as u64,
            },
        })
    }
}

impl TranslationService for MockServices {
    fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse, ServiceError> {
        required(&request.text, "Text")?;
        required(&request.target_language, "Target language")?;
        self.wait();
        let source_language = if request.source_language.is_empty() {
            "auto".to_string()
        } else {
            request.source_language.clone()
        };
        Ok(TranslationResponse {
            original_text: request.text.clone(),
            translated_text: mock_translation(&request.text, &request.target_language),
            source_language,
            target_language: request.target_language.clone(),
            confidence: 0.95,
        })
    }
}

impl DubbingService for MockServices {
    fn dub(&self, request: &DubbingRequest) -> Result<DubbingResponse, ServiceError> {
        required(&request.text, "Text")?;
        self.wait();
        let speed = if request.speed > 0.0 { request.speed } else { 1.0 };
        let pitch = if request.pitch > 0.0 { request.pitch } else { 1.0 };
        let duration = request.text.chars().count() as f64 * SECONDS_PER_CHAR / f64::from(speed);
        let generated = Utc::now().to_rfc3339();
        Ok(DubbingResponse {
            audio_url: format!(
                "/api/mock-audio?text={}&lang={}&voice={}",
                urlencoding::encode(&request.text),
                request.language,
                request.voice
            ),
            duration,
            text: request.text.clone(),
            language: request.language.clone(),
            voice: request.voice.clone(),
            settings: VoiceSettings { speed, pitch },
            metadata: DubbingMetadata {
                generated,
                service: "abbasagha-tts".to_string(),
                quality: "high".to_string(),
            },
        })
    }
}

impl LanguageDetector for MockServices {
    fn detect(&self, request: &DetectLanguageRequest) -> Result<DetectLanguageResponse, ServiceError> {
        required(&request.text, "Text")?;
        let (language, confidence) = self.languages.detect(&request.text);
        Ok(DetectLanguageResponse {
            language: language.to_string(),
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> MockServices {
        MockServices::new().unwrap()
    }

    #[test]
    fn test_transcript_by_language() {
        let mut request = TranscriptionRequest::new(vec![0; 42], "clip.wav");
        let english = services().transcribe(&request).unwrap();
        assert_eq!(english.segments.len(), 5);
        assert_eq!(english.segments[0].text, "Welcome to Abbasagha");
        assert_eq!(english.segments[4].start_time, 12.0);
        assert_eq!(english.segments[4].end_time, 15.0);
        assert_eq!(english.metadata.duration, 15.0);
        assert_eq!(english.metadata.file_size, 42);

        request.language = "fa".into();
        let persian = services().transcribe(&request).unwrap();
        assert_eq!(persian.segments[4].text, "همین حالا شروع کنید!");
    }

    #[test]
    fn test_transcription_needs_audio() {
        let request = TranscriptionRequest::new(Vec::new(), "empty.wav");
        assert!(matches!(
            services().transcribe(&request),
            Err(ServiceError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_translation_dictionary_and_fallback() {
        assert_eq!(mock_translation("Get started now!", "es"), "¡Comienza ahora!");
        assert_eq!(mock_translation("Hello", "de"), "[de] Hello");

        let response = services()
            .translate(&TranslationRequest {
                text: "Edit with ease".into(),
                source_language: String::new(),
                target_language: "fa".into(),
            })
            .unwrap();
        assert_eq!(response.translated_text, "با سادگی ویرایش کنید");
        assert_eq!(response.source_language, "auto");
    }

    #[test]
    fn test_dubbing_estimate_and_url() {
        let mut request = DubbingRequest::new("Hello world", "en", "en-US-male");
        request.speed = 2.0;
        let response = services().dub(&request).unwrap();
        assert!((response.duration - 11.0 * 0.08 / 2.0).abs() < 1e-9);
        assert_eq!(
            response.audio_url,
            "/api/mock-audio?text=Hello%20world&lang=en&voice=en-US-male"
        );
        assert_eq!(response.settings.speed, 2.0);
        assert_eq!(response.metadata.quality, "high");
        assert!(chrono::DateTime::parse_from_rfc3339(&response.metadata.generated).is_ok());
    }

    #[test]
    fn test_language_rules() {
        let rules = LanguageRules::new().unwrap();
        assert_eq!(rules.detect("سلام دنیا"), ("fa", 0.95));
        assert_eq!(rules.detect("你好"), ("zh", 0.95));
        assert_eq!(rules.detect("こんにちは"), ("ja", 0.9));
        assert_eq!(rules.detect("안녕하세요"), ("ko", 0.9));
        assert_eq!(rules.detect("Pero el perro"), ("es", 0.75));
        assert_eq!(rules.detect("Привет"), ("ru", 0.9));
        assert_eq!(rules.detect("Welcome to Abbasagha"), ("en", 0.7));
    }

    #[test]
    fn test_detect_rejects_empty_text() {
        let result = services().detect(&DetectLanguageRequest { text: "  ".into() });
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }
}
