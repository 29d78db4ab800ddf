//! The authoritative playback position.
//!
//! [`TimeSource`] wraps a [`MediaElement`] and keeps its own idea of "now" so
//! seeks are visible immediately, before the media confirms them.

use crate::types::time::{clamp_time, known_duration};

/// Playback surface the editor drives. The real implementation is a video
/// element owned by the host; [`SimulatedMedia`] stands in for it here.
pub trait MediaElement {
    fn current_time(&self) -> f64;
    /// `None` until metadata has loaded.
    fn duration(&self) -> Option<f64>;
    fn is_playing(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    fn set_current_time(&mut self, time: f64);

    fn playback_rate(&self) -> f64 {
        1.0
    }
}

pub struct TimeSource<M: MediaElement> {
    media: M,
    now: f64,
    duration: Option<f64>,
    /// Seek issued while the duration was unknown; re-clamped once it is.
    pending_seek: Option<f64>,
}

impl<M: MediaElement> TimeSource<M> {
    pub fn new(media: M) -> Self {
        let duration = known_duration(media.duration());
        let now = clamp_time(media.current_time(), duration);
        Self {
            media,
            now,
            duration,
            pending_seek: None,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.media.is_playing()
    }

    pub fn playback_rate(&self) -> f64 {
        self.media.playback_rate()
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Host access for driving the media itself (advancing a simulated
    /// clock, loading new metadata). Time changes must still go through
    /// [`TimeSource::seek`].
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn play(&mut self) {
        if !self.media.is_playing() {
            self.media.play();
        }
    }

    pub fn pause(&mut self) {
        if self.media.is_playing() {
            self.media.pause();
        }
    }

    pub fn toggle(&mut self) {
        if self.media.is_playing() {
            self.media.pause();
        } else {
            self.media.play();
        }
    }

    /// Clamps `time`, updates "now" optimistically and retargets the media.
    /// Returns the stored time.
    pub fn seek(&mut self, time: f64) -> f64 {
        let target = clamp_time(time, self.duration);
        self.now = target;
        self.pending_seek = match self.duration {
            Some(_) => None,
            None => Some(target),
        };
        self.media.set_current_time(target);
        target
    }

    /// Adopts a newly reported duration and re-clamps "now" against it.
    pub fn on_duration_change(&mut self, duration: Option<f64>) {
        let duration = known_duration(duration);
        if duration == self.duration {
            return;
        }
        self.duration = duration;
        if duration.is_none() {
            return;
        }
        let clamped = clamp_time(self.now, duration);
        let pending = self.pending_seek.take();
        if clamped != self.now || pending.is_some_and(|t| t != clamped) {
            log::debug!("re-clamping playhead {} -> {} after metadata", self.now, clamped);
            self.now = clamped;
            self.media.set_current_time(clamped);
        }
    }

    /// Reconciles "now" with the time the media reports.
    pub fn on_media_time_update(&mut self, time: f64) {
        self.now = clamp_time(time, self.duration);
    }
}

/// Deterministic media element advanced by explicit time steps.
#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    time: f64,
    length: f64,
    playing: bool,
    rate: f64,
    /// Seconds of wall time before metadata is reported.
    metadata_delay: f64,
    elapsed: f64,
}

impl SimulatedMedia {
    pub fn new(length: f64) -> Self {
        Self {
            time: 0.0,
            length,
            playing: false,
            rate: 1.0,
            metadata_delay: 0.0,
            elapsed: 0.0,
        }
    }

    /// Withholds the duration until `delay` seconds have been advanced.
    pub fn with_metadata_delay(mut self, delay: f64) -> Self {
        self.metadata_delay = delay;
        self
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
        }
    }

    fn metadata_loaded(&self) -> bool {
        self.elapsed >= self.metadata_delay
    }

    pub fn advance(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.elapsed += dt;
        if self.playing {
            self.time += dt * self.rate;
            if self.metadata_loaded() && self.time >= self.length {
                self.time = self.length;
                self.playing = false;
            }
        }
    }
}

impl MediaElement for SimulatedMedia {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> Option<f64> {
        self.metadata_loaded().then_some(self.length)
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn play(&mut self) {
        if self.metadata_loaded() && self.time >= self.length {
            self.time = 0.0;
        }
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_current_time(&mut self, time: f64) {
        self.time = if self.metadata_loaded() {
            time.clamp(0.0, self.length)
        } else {
            time.max(0.0)
        };
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }
}
