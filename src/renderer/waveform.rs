//! Waveform strip under the player.
//!
//! The waveform component keeps its own cursor. It reports user clicks as a
//! progress fraction and plays back its own time updates, which the editor
//! treats as passive.

use crate::types::time::known_duration;

/// External waveform component, seekable by progress fraction.
pub trait WaveformCursor {
    fn current_time(&self) -> f64;
    /// `progress` is in `[0, 1]`.
    fn seek_to(&mut self, progress: f64);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaveformEvent {
    /// User clicked or dragged on the waveform.
    Seek(f64),
    /// The waveform's own playback clock moved.
    TimeUpdate(f64),
    DurationChange(f64),
}

/// Display-only waveform with synthetic peaks. Seeks are counted so the
/// tolerance rule can be observed.
#[derive(Debug, Clone)]
pub struct PeakWaveform {
    peaks: Vec<f32>,
    duration: Option<f64>,
    progress: f64,
    seek_count: usize,
}

impl PeakWaveform {
    pub fn new(bins: usize) -> Self {
        let peaks = (0..bins)
            .map(|i| {
                let x = i as f32 * 0.37;
                (0.25 + 0.45 * (x.sin() * (x * 0.23).cos()).abs() + 0.3 * ((x * 2.9).sin() * 0.5 + 0.5))
                    .min(1.0)
            })
            .collect();
        Self {
            peaks,
            duration: None,
            progress: 0.0,
            seek_count: 0,
        }
    }

    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }

    pub fn set_duration(&mut self, duration: Option<f64>) {
        self.duration = known_duration(duration);
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn seek_count(&self) -> usize {
        self.seek_count
    }

    /// Converts a click at `x` in a strip of `width` px into a seek event.
    pub fn click(&self, x: f32, width: f32) -> Option<WaveformEvent> {
        if !(width > 0.0) || !x.is_finite() {
            return None;
        }
        Some(WaveformEvent::Seek(f64::from((x / width).clamp(0.0, 1.0))))
    }
}

impl WaveformCursor for PeakWaveform {
    fn current_time(&self) -> f64 {
        self.duration.map(|d| self.progress * d).unwrap_or(0.0)
    }

    fn seek_to(&mut self, progress: f64) {
        self.progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.seek_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peaks_are_normalised() {
        let wave = PeakWaveform::new(64);
        assert_eq!(wave.peaks().len(), 64);
        assert!(wave.peaks().iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_click_maps_to_progress() {
        let wave = PeakWaveform::new(8);
        assert_eq!(wave.click(50.0, 200.0), Some(WaveformEvent::Seek(0.25)));
        assert_eq!(wave.click(500.0, 200.0), Some(WaveformEvent::Seek(1.0)));
        assert_eq!(wave.click(50.0, 0.0), None);
    }

    #[test]
    fn test_cursor_time_needs_duration() {
        let mut wave = PeakWaveform::new(8);
        wave.seek_to(0.5);
        assert_eq!(wave.current_time(), 0.0);
        wave.set_duration(Some(10.0));
        assert_eq!(wave.current_time(), 5.0);
    }
}
