//! Sequential batch translation and dubbing.
//!
//! One request per entity, with a pause between requests so the backing
//! service is not flooded. A failing entity never aborts the batch.

use std::thread;
use std::time::Duration;

use crate::services::contracts::{
    DubbingRequest, DubbingResponse, DubbingService, TranslationRequest, TranslationService,
};
use crate::types::subtitle::Subtitle;

pub trait Pacer: Send + Sync {
    fn wait(&self, delay: Duration);
}

/// Sleeps the calling (worker) thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn wait(&self, delay: Duration) {
        thread::sleep(delay);
    }
}

/// Translates every subtitle's text and returns `(id, translated)` pairs.
/// Entities whose request fails, or that come back empty, are left out so
/// their current text stays as it is.
pub fn translate_batch(
    service: &dyn TranslationService,
    items: &[Subtitle],
    source_language: &str,
    target_language: &str,
    pacer: &dyn Pacer,
    delay: Duration,
) -> Vec<(String, String)> {
    let mut translated = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            pacer.wait(delay);
        }
        let request = TranslationRequest {
            text: item.text.clone(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        match service.translate(&request) {
            Ok(response) if !response.translated_text.is_empty() => {
                translated.push((item.id.clone(), response.translated_text))
            }
            Ok(_) => log::warn!("empty translation for subtitle {}, keeping original", item.id),
            Err(err) => log::warn!("translation failed for subtitle {}: {}", item.id, err),
        }
    }
    translated
}

/// A dubbed subtitle line.
#[derive(Debug, Clone, PartialEq)]
pub struct DubbedLine {
    pub subtitle_id: String,
    pub start: f64,
    pub audio: DubbingResponse,
}

/// Dubs every subtitle with one voice. Failed entities are left out.
pub fn dub_batch(
    service: &dyn DubbingService,
    items: &[Subtitle],
    language: &str,
    voice: &str,
    pacer: &dyn Pacer,
    delay: Duration,
) -> Vec<DubbedLine> {
    let mut lines = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            pacer.wait(delay);
        }
        match service.dub(&DubbingRequest::new(item.text.clone(), language, voice)) {
            Ok(audio) => lines.push(DubbedLine {
                subtitle_id: item.id.clone(),
                start: item.start,
                audio,
            }),
            Err(err) => log::warn!("dubbing failed for subtitle {}: {}", item.id, err),
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::services::contracts::TranslationResponse;
    use crate::services::mock::MockServices;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPacer {
        waits: Mutex<Vec<Duration>>,
    }

    impl Pacer for RecordingPacer {
        fn wait(&self, delay: Duration) {
            self.waits.lock().unwrap().push(delay);
        }
    }

    /// Fails on the text "fail", otherwise upper-cases.
    struct Flaky;

    impl TranslationService for Flaky {
        fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse, ServiceError> {
            if request.text == "fail" {
                return Err(ServiceError::Unavailable("boom".into()));
            }
            Ok(TranslationResponse {
                original_text: request.text.clone(),
                translated_text: request.text.to_uppercase(),
                ..Default::default()
            })
        }
    }

    fn subs(texts: &[&str]) -> Vec<Subtitle> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let mut sub = Subtitle::new(i as f64, i as f64 + 1.0, *text);
                sub.id = format!("s{}", i);
                sub
            })
            .collect()
    }

    #[test]
    fn test_partial_failure_skips_failed_entity() {
        let pacer = RecordingPacer::default();
        let items = subs(&["one", "fail", "three"]);
        let out = translate_batch(&Flaky, &items, "en", "fa", &pacer, Duration::from_millis(100));
        let expected = [("s0".to_string(), "ONE".to_string()), ("s2".to_string(), "THREE".to_string())];
        assert_eq!(out, expected);
        assert_eq!(*pacer.waits.lock().unwrap(), vec![Duration::from_millis(100); 2]);
    }

    #[test]
    fn test_dub_batch_skips_failures() {
        let pacer = RecordingPacer::default();
        let services = MockServices::new().unwrap();
        let items = subs(&["Hello", "", "Bye"]);
        let lines = dub_batch(&services, &items, "en", "en-US-male", &pacer, Duration::from_millis(200));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].subtitle_id, "s2");
        assert_eq!(lines[1].start, 2.0);
        assert_eq!(pacer.waits.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_batch_never_waits() {
        let pacer = RecordingPacer::default();
        assert!(translate_batch(&Flaky, &[], "en", "fa", &pacer, Duration::from_millis(100)).is_empty());
        assert!(pacer.waits.lock().unwrap().is_empty());
    }
}
