pub mod batch;
pub mod catalog;
pub mod contracts;
pub mod jobs;
pub mod mock;
pub mod quota;

use contracts::{DetectLanguageRequest, LanguageDetector};

/// True when any character falls in the Arabic-script block used by Persian.
pub fn has_persian_script(text: &str) -> bool {
    text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

/// Asks the detector, falling back to a script check when it fails or
/// answers with a blank language.
pub fn detect_language_or_fallback(detector: &dyn LanguageDetector, text: &str) -> String {
    let request = DetectLanguageRequest { text: text.to_string() };
    match detector.detect(&request) {
        Ok(response) if !response.language.trim().is_empty() => response.language.trim().to_string(),
        Ok(_) => {
            log::warn!("language detection returned no language");
            script_fallback(text)
        }
        Err(err) => {
            log::warn!("language detection failed: {}", err);
            script_fallback(text)
        }
    }
}

fn script_fallback(text: &str) -> String {
    if has_persian_script(text) { "fa" } else { "en" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::services::contracts::DetectLanguageResponse;

    struct Down;

    impl LanguageDetector for Down {
        fn detect(&self, _request: &DetectLanguageRequest) -> Result<DetectLanguageResponse, ServiceError> {
            Err(ServiceError::Unavailable("down".into()))
        }
    }

    #[test]
    fn test_fallback_uses_script() {
        assert_eq!(detect_language_or_fallback(&Down, "سلام"), "fa");
        assert_eq!(detect_language_or_fallback(&Down, "hola"), "en");
    }

    struct Blank;

    impl LanguageDetector for Blank {
        fn detect(&self, _request: &DetectLanguageRequest) -> Result<DetectLanguageResponse, ServiceError> {
            Ok(serde_json::from_str(r#"{"language": " ", "confidence": 0.1}"#)?)
        }
    }

    #[test]
    fn test_blank_answer_uses_script() {
        assert_eq!(detect_language_or_fallback(&Blank, "سلام"), "fa");
        assert_eq!(detect_language_or_fallback(&Blank, "hello"), "en");
    }

    #[test]
    fn test_detector_answer_wins() {
        let mock = mock::MockServices::new().unwrap();
        assert_eq!(detect_language_or_fallback(&mock, "你好"), "zh");
    }
}
