//! Background service calls.
//!
//! Each call runs on its own worker thread and reports back over a channel
//! that the UI thread drains once per frame. Only the result of the most
//! recently issued request is applied; anything older is dropped. Once the
//! owner is torn down no result reaches a store.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::error::ServiceError;
use crate::services::batch::{DubbedLine, Pacer, SleepPacer, dub_batch, translate_batch};
use crate::services::contracts::{
    DubbingService, TranscriptionRequest, TranscriptionResponse, TranscriptionService,
    TranslationService,
};
use crate::services::quota::Quota;
use crate::store::SubtitleStore;
use crate::types::subtitle::{Subtitle, SubtitlePatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Hands out increasing tickets and remembers the latest one.
#[derive(Debug, Default)]
pub struct RequestGuard {
    latest: u64,
}

impl RequestGuard {
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

type JobResult<T> = (Ticket, Result<T, ServiceError>);

pub struct JobRunner<T> {
    tx: Sender<JobResult<T>>,
    rx: Receiver<JobResult<T>>,
    guard: RequestGuard,
    pending: Option<Ticket>,
    mounted: Arc<AtomicBool>,
}

impl<T: Send + 'static> Default for JobRunner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> JobRunner<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            guard: RequestGuard::default(),
            pending: None,
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// True while the latest request has not reported back.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Runs `job` on a worker thread. Supersedes any request still running.
    pub fn spawn<F>(&mut self, job: F) -> Ticket
    where
        F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    {
        let ticket = self.guard.issue();
        if !self.is_mounted() {
            log::debug!("job {:?} not started, owner torn down", ticket);
            return ticket;
        }
        self.pending = Some(ticket);
        let tx = self.tx.clone();
        let mounted = Arc::clone(&self.mounted);
        thread::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
                log::error!("job {:?} panicked", ticket);
                Err(ServiceError::Disconnected)
            });
            if mounted.load(Ordering::SeqCst) {
                // The runner may be gone already; nothing to report to then.
                let _ = tx.send((ticket, result));
            }
        });
        log::info!("job {:?} started", ticket);
        ticket
    }

    /// Drains finished jobs without blocking. Returns the latest request's
    /// result once it has arrived.
    pub fn poll(&mut self) -> Option<Result<T, ServiceError>> {
        let mut latest = None;
        while let Ok(message) = self.rx.try_recv() {
            if let Some(result) = self.accept(message) {
                latest = Some(result);
            }
        }
        latest
    }

    /// Waits up to `timeout` for the latest request's result, discarding
    /// stale results on the way.
    pub fn poll_blocking(&mut self, timeout: Duration) -> Option<Result<T, ServiceError>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(message) => {
                    if let Some(result) = self.accept(message) {
                        return Some(result);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Marks the owner as gone. Running jobs finish but their results are
    /// dropped.
    pub fn teardown(&mut self) {
        if self.mounted.swap(false, Ordering::SeqCst) {
            log::info!("job runner torn down");
        }
        self.pending = None;
    }

    fn accept(&mut self, (ticket, result): JobResult<T>) -> Option<Result<T, ServiceError>> {
        if !self.is_mounted() {
            log::debug!("dropping result of {:?}, owner torn down", ticket);
            return None;
        }
        if !self.guard.is_current(ticket) {
            log::debug!("dropping stale result of {:?}", ticket);
            return None;
        }
        self.pending = None;
        log::info!("job {:?} finished", ticket);
        Some(result)
    }
}

impl<T> Drop for JobRunner<T> {
    fn drop(&mut self) {
        self.mounted.store(false, Ordering::SeqCst);
    }
}

/// Auto-subtitle: transcribes and replaces the whole subtitle collection.
pub struct TranscriptionJob {
    service: Arc<dyn TranscriptionService>,
    runner: JobRunner<TranscriptionResponse>,
    quota: Quota,
}

impl TranscriptionJob {
    pub fn new(service: Arc<dyn TranscriptionService>, quota: Quota) -> Self {
        Self {
            service,
            runner: JobRunner::new(),
            quota,
        }
    }

    pub fn quota(&self) -> &Quota {
        &self.quota
    }

    pub fn is_loading(&self) -> bool {
        self.runner.is_loading()
    }

    pub fn start(&mut self, request: TranscriptionRequest) -> Result<Ticket, ServiceError> {
        self.quota.check()?;
        let service = Arc::clone(&self.service);
        Ok(self.runner.spawn(move || service.transcribe(&request)))
    }

    /// Applies a finished transcription. On failure the store is untouched.
    /// Returns the number of subtitles written.
    pub fn apply(&mut self, store: &SubtitleStore) -> Option<Result<usize, ServiceError>> {
        let result = self.runner.poll()?;
        Some(self.commit(result, store))
    }

    pub fn apply_blocking(&mut self, store: &SubtitleStore, timeout: Duration) -> Option<Result<usize, ServiceError>> {
        let result = self.runner.poll_blocking(timeout)?;
        Some(self.commit(result, store))
    }

    pub fn teardown(&mut self) {
        self.runner.teardown();
    }

    fn commit(
        &mut self,
        result: Result<TranscriptionResponse, ServiceError>,
        store: &SubtitleStore,
    ) -> Result<usize, ServiceError> {
        match result {
            Ok(response) => {
                let subtitles = response.to_subtitles();
                let count = subtitles.len();
                store.replace_all(subtitles);
                self.quota.record_run();
                log::info!("transcription applied, {} subtitles", count);
                Ok(count)
            }
            Err(err) => {
                log::warn!("transcription failed: {}", err);
                Err(err)
            }
        }
    }
}

/// Batch translation of the subtitle texts.
pub struct TranslationJob {
    service: Arc<dyn TranslationService>,
    pacer: Arc<dyn Pacer>,
    delay: Duration,
    runner: JobRunner<Vec<(String, String)>>,
}

impl TranslationJob {
    pub fn new(service: Arc<dyn TranslationService>, delay: Duration) -> Self {
        Self::with_pacer(service, Arc::new(SleepPacer), delay)
    }

    pub fn with_pacer(service: Arc<dyn TranslationService>, pacer: Arc<dyn Pacer>, delay: Duration) -> Self {
        Self {
            service,
            pacer,
            delay,
            runner: JobRunner::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.runner.is_loading()
    }

    pub fn start(&mut self, items: Vec<Subtitle>, source_language: &str, target_language: &str) -> Ticket {
        let service = Arc::clone(&self.service);
        let pacer = Arc::clone(&self.pacer);
        let delay = self.delay;
        let (source, target) = (source_language.to_string(), target_language.to_string());
        self.runner.spawn(move || {
            Ok(translate_batch(
                service.as_ref(),
                &items,
                &source,
                &target,
                pacer.as_ref(),
                delay,
            ))
        })
    }

    /// Writes translated texts back by id. Subtitles deleted meanwhile are
    /// skipped, and subtitles whose translation failed are never written.
    /// Returns how many were patched.
    pub fn apply(&mut self, store: &SubtitleStore) -> Option<usize> {
        let translated = self.runner.poll()?.ok()?;
        Some(Self::commit(&translated, store))
    }

    pub fn apply_blocking(&mut self, store: &SubtitleStore, timeout: Duration) -> Option<usize> {
        let translated = self.runner.poll_blocking(timeout)?.ok()?;
        Some(Self::commit(&translated, store))
    }

    pub fn teardown(&mut self) {
        self.runner.teardown();
    }

    fn commit(translated: &[(String, String)], store: &SubtitleStore) -> usize {
        translated
            .iter()
            .filter(|(id, text)| store.update(id, &SubtitlePatch::text(text.clone())))
            .count()
    }
}

/// Batch dubbing; results are kept on the job for the shell to list.
pub struct DubbingJob {
    service: Arc<dyn DubbingService>,
    delay: Duration,
    runner: JobRunner<Vec<DubbedLine>>,
    lines: Vec<DubbedLine>,
}

impl DubbingJob {
    pub fn new(service: Arc<dyn DubbingService>, delay: Duration) -> Self {
        Self {
            service,
            delay,
            runner: JobRunner::new(),
            lines: Vec::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.runner.is_loading()
    }

    pub fn lines(&self) -> &[DubbedLine] {
        &self.lines
    }

    pub fn start(&mut self, items: Vec<Subtitle>, language: &str, voice: &str) -> Ticket {
        let service = Arc::clone(&self.service);
        let delay = self.delay;
        let (language, voice) = (language.to_string(), voice.to_string());
        self.runner
            .spawn(move || Ok(dub_batch(service.as_ref(), &items, &language, &voice, &SleepPacer, delay)))
    }

    /// Picks up a finished batch. Returns true when new lines arrived.
    pub fn poll(&mut self) -> bool {
        match self.runner.poll() {
            Some(Ok(lines)) => {
                self.lines = lines;
                true
            }
            Some(Err(err)) => {
                log::warn!("dubbing failed: {}", err);
                false
            }
            None => false,
        }
    }

    pub fn teardown(&mut self) {
        self.runner.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::contracts::{TranscriptSegment, TranslationRequest, TranslationResponse};
    use crate::services::mock::MockServices;
    use crossbeam_channel::bounded;
    use std::collections::HashMap;

    const WAIT: Duration = Duration::from_secs(5);
    const SHORT: Duration = Duration::from_millis(100);

    /// Holds each request until its gate (keyed by file name) is opened, then
    /// answers with one segment carrying the file name as text.
    struct GatedTranscriber {
        gates: HashMap<String, Receiver<()>>,
    }

    impl TranscriptionService for GatedTranscriber {
        fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionResponse, ServiceError> {
            if let Some(gate) = self.gates.get(&request.file_name) {
                let _ = gate.recv();
            }
            if request.file_name == "broken" {
                return Err(ServiceError::Unavailable("offline".into()));
            }
            Ok(TranscriptionResponse {
                segments: vec![TranscriptSegment {
                    id: "1".into(),
                    text: request.file_name.clone(),
                    start_time: 0.0,
                    end_time: 2.0,
                    confidence: 0.9,
                }],
                ..Default::default()
            })
        }
    }

    fn gated(names: &[&str]) -> (Arc<GatedTranscriber>, HashMap<String, Sender<()>>) {
        let mut gates = HashMap::new();
        let mut openers = HashMap::new();
        for name in names {
            let (tx, rx) = bounded(1);
            gates.insert(name.to_string(), rx);
            openers.insert(name.to_string(), tx);
        }
        (Arc::new(GatedTranscriber { gates }), openers)
    }

    fn texts(store: &SubtitleStore) -> Vec<String> {
        store.snapshot().into_iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_guard_tickets_increase() {
        let mut guard = RequestGuard::default();
        let first = guard.issue();
        let second = guard.issue();
        assert!(second > first);
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
    }

    #[test]
    fn test_out_of_order_responses_apply_latest_only() {
        let (service, openers) = gated(&["first", "second"]);
        let mut job = TranscriptionJob::new(service, Quota::default());
        let store = SubtitleStore::from_items(vec![Subtitle::new(0.0, 1.0, "seed")]);

        job.start(TranscriptionRequest::new(vec![1], "first")).unwrap();
        job.start(TranscriptionRequest::new(vec![1], "second")).unwrap();

        openers["second"].send(()).unwrap();
        assert_eq!(job.apply_blocking(&store, WAIT), Some(Ok(1)));
        assert_eq!(texts(&store), ["second"]);
        assert!(!job.is_loading());

        openers["first"].send(()).unwrap();
        assert_eq!(job.apply_blocking(&store, SHORT), None);
        assert_eq!(texts(&store), ["second"]);
        assert_eq!(job.quota().used, 152);
    }

    #[test]
    fn test_failure_leaves_store_untouched() {
        let (service, openers) = gated(&["broken"]);
        let mut job = TranscriptionJob::new(service, Quota::default());
        let store = SubtitleStore::from_items(vec![Subtitle::new(0.0, 1.0, "seed")]);
        job.start(TranscriptionRequest::new(vec![1], "broken")).unwrap();
        openers["broken"].send(()).unwrap();
        assert!(matches!(job.apply_blocking(&store, WAIT), Some(Err(ServiceError::Unavailable(_)))));
        assert_eq!(texts(&store), ["seed"]);
        assert_eq!(job.quota().used, 147);
    }

    #[test]
    fn test_teardown_discards_late_result() {
        let (service, openers) = gated(&["late"]);
        let mut job = TranscriptionJob::new(service, Quota::default());
        let store = SubtitleStore::from_items(vec![Subtitle::new(0.0, 1.0, "seed")]);
        job.start(TranscriptionRequest::new(vec![1], "late")).unwrap();
        job.teardown();
        assert!(!job.is_loading());
        openers["late"].send(()).unwrap();
        assert_eq!(job.apply_blocking(&store, SHORT), None);
        assert_eq!(texts(&store), ["seed"]);
    }

    #[test]
    fn test_exhausted_quota_refuses_to_start() {
        let services = Arc::new(MockServices::new().unwrap());
        let quota = Quota {
            used: 500,
            ..Quota::default()
        };
        let mut job = TranscriptionJob::new(services, quota);
        let err = job.start(TranscriptionRequest::new(vec![1], "clip.wav")).unwrap_err();
        assert!(matches!(err, ServiceError::QuotaExhausted { .. }));
        assert!(!job.is_loading());
    }

    #[test]
    fn test_mock_transcription_replaces_store() {
        let services = Arc::new(MockServices::new().unwrap());
        let mut job = TranscriptionJob::new(services, Quota::default());
        let store = SubtitleStore::from_items(vec![Subtitle::new(0.0, 1.0, "seed")]);
        job.start(TranscriptionRequest::new(vec![0; 8], "clip.wav")).unwrap();
        assert_eq!(job.apply_blocking(&store, WAIT), Some(Ok(5)));
        let items = store.snapshot();
        assert_eq!(items[0].text, "Welcome to Abbasagha");
        assert!(items.iter().all(|s| !s.id.is_empty()));
    }

    struct NoPause;

    impl Pacer for NoPause {
        fn wait(&self, _delay: Duration) {}
    }

    struct Suffix;

    impl TranslationService for Suffix {
        fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse, ServiceError> {
            Ok(TranslationResponse {
                translated_text: format!("{}!", request.text),
                ..Default::default()
            })
        }
    }

    #[test]
    fn test_translation_patches_by_id_and_skips_removed() {
        let store = SubtitleStore::from_items(vec![Subtitle::new(0.0, 1.0, "a"), Subtitle::new(1.0, 2.0, "b")]);
        let mut job = TranslationJob::with_pacer(Arc::new(Suffix), Arc::new(NoPause), Duration::ZERO);
        let items = store.snapshot();
        job.start(items.clone(), "en", "fa");
        store.remove(&items[0].id);
        assert_eq!(job.apply_blocking(&store, WAIT), Some(1));
        assert_eq!(texts(&store), ["b!"]);
    }

    struct Panicking;

    impl TranscriptionService for Panicking {
        fn transcribe(&self, _request: &TranscriptionRequest) -> Result<TranscriptionResponse, ServiceError> {
            panic!("decoder crashed");
        }
    }

    #[test]
    fn test_panicking_worker_resolves_ticket() {
        let mut job = TranscriptionJob::new(Arc::new(Panicking), Quota::default());
        let store = SubtitleStore::from_items(vec![Subtitle::new(0.0, 1.0, "seed")]);
        job.start(TranscriptionRequest::new(vec![1], "clip.wav")).unwrap();
        assert_eq!(job.apply_blocking(&store, WAIT), Some(Err(ServiceError::Disconnected)));
        assert!(!job.is_loading());
        assert_eq!(texts(&store), ["seed"]);
        assert_eq!(job.quota().used, 147);
    }

    /// Waits for the gate, then fails every request.
    struct GatedOutage {
        gate: Receiver<()>,
    }

    impl TranslationService for GatedOutage {
        fn translate(&self, _request: &TranslationRequest) -> Result<TranslationResponse, ServiceError> {
            let _ = self.gate.recv();
            Err(ServiceError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn test_failed_translation_keeps_concurrent_edit() {
        let (open, gate) = bounded(1);
        let store = SubtitleStore::from_items(vec![Subtitle::new(0.0, 1.0, "original")]);
        let id = store.snapshot()[0].id.clone();
        let mut job = TranslationJob::with_pacer(Arc::new(GatedOutage { gate }), Arc::new(NoPause), Duration::ZERO);
        job.start(store.snapshot(), "en", "fa");
        store.update(&id, &SubtitlePatch::text("edited while translating"));
        open.send(()).unwrap();
        assert_eq!(job.apply_blocking(&store, WAIT), Some(0));
        assert_eq!(texts(&store), ["edited while translating"]);
    }

    #[test]
    fn test_dubbing_job_collects_lines() {
        let services = Arc::new(MockServices::new().unwrap());
        let mut job = DubbingJob::new(services, Duration::ZERO);
        job.start(vec![Subtitle::new(0.0, 1.0, "Hello")], "en", "en-US-male");
        let deadline = Instant::now() + WAIT;
        while !job.poll() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(job.lines().len(), 1);
        assert!(!job.is_loading());
    }
}
