//! Side panels: subtitle list editor, add-text, auto-subtitle and
//! translate/dub.

use std::sync::Arc;

use eframe::egui;

use crate::config::EditorConfig;
use crate::renderer::overlay_renderer::parse_hex_color;
use crate::services::catalog::{SUPPORTED_LANGUAGES, language_name, voices_for};
use crate::services::contracts::{
    DubbingService, LanguageDetector, TranscriptionRequest, TranscriptionService, TranslationService,
    WhisperModel,
};
use crate::services::detect_language_or_fallback;
use crate::services::jobs::{DubbingJob, TranscriptionJob, TranslationJob};
use crate::services::quota::Quota;
use crate::store::{SubtitleStore, TextStore};
use crate::types::overlay::Align;
use crate::types::subtitle::SubtitlePatch;
use crate::types::text_overlay::{
    Animation, BRAND_COLORS, FONTS, STYLE_TEMPLATES, TextSource, new_text_at,
};
use crate::types::time::format_time;

/// Stand-in for the extracted soundtrack handed to the transcriber.
const TIMELINE_AUDIO_BYTES: usize = 44_100;

fn hex_to_rgb(hex: &str) -> [u8; 3] {
    parse_hex_color(hex).unwrap_or([255, 255, 255])
}

fn rgb_to_hex([r, g, b]: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn default_voice(language: &str) -> String {
    voices_for(language)
        .first()
        .map(|voice| voice.id.to_string())
        .unwrap_or_default()
}

fn language_label(code: &str) -> String {
    match language_name(code) {
        Some(name) => format!("{} ({})", name, code),
        None => code.to_string(),
    }
}

fn language_combo(ui: &mut egui::Ui, id: &str, label: &str, value: &mut String, with_auto: bool) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(if value.as_str() == "auto" {
            "Auto detect".to_string()
        } else {
            language_label(value)
        })
        .show_ui(ui, |ui| {
            if with_auto {
                ui.selectable_value(value, "auto".to_string(), "Auto detect");
            }
            for language in SUPPORTED_LANGUAGES {
                ui.selectable_value(value, language.code.to_string(), language_label(language.code));
            }
        });
    ui.label(label);
}

/// Lists every subtitle with inline editing. Returns a time to seek to when
/// the user jumps to a subtitle.
pub fn subtitle_list_panel(
    ui: &mut egui::Ui,
    store: &SubtitleStore,
    config: &EditorConfig,
    selected: &mut Option<String>,
) -> Option<f64> {
    let mut seek = None;
    ui.horizontal(|ui| {
        ui.heading("Subtitles");
        if ui.button("+ Add").clicked() {
            let id = store.write().add_after_last(config.subtitle_default_span);
            *selected = Some(id);
        }
    });
    ui.separator();

    let items = store.snapshot();
    if items.is_empty() {
        ui.label("No subtitles yet.");
        return None;
    }

    egui::ScrollArea::vertical()
        .id_salt("subtitle_list")
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            for (index, sub) in items.iter().enumerate() {
                ui.push_id(&sub.id, |ui| {
                    let is_selected = selected.as_deref() == Some(sub.id.as_str());
                    let frame = egui::Frame::group(ui.style()).stroke(if is_selected {
                        egui::Stroke::new(1.5, egui::Color32::from_rgb(168, 85, 247))
                    } else {
                        ui.style().visuals.widgets.noninteractive.bg_stroke
                    });
                    frame.show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if ui
                                .selectable_label(is_selected, format!("#{}", index + 1))
                                .clicked()
                            {
                                *selected = Some(sub.id.clone());
                            }
                            ui.label(format!("{} → {}", format_time(sub.start), format_time(sub.end)));
                            if ui.small_button("▶").on_hover_text("Go to").clicked() {
                                seek = Some(sub.start);
                            }
                            if ui.small_button("⧉").on_hover_text("Duplicate").clicked() {
                                *selected = store.duplicate(&sub.id);
                            }
                            if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                                store.remove(&sub.id);
                                if is_selected {
                                    *selected = None;
                                }
                            }
                        });

                        let mut text = sub.text.clone();
                        if ui
                            .add(egui::TextEdit::multiline(&mut text).desired_rows(1))
                            .changed()
                        {
                            store.update(&sub.id, &SubtitlePatch::text(text));
                        }

                        ui.horizontal(|ui| {
                            let (mut start, mut end) = (sub.start, sub.end);
                            let start_changed = ui
                                .add(egui::DragValue::new(&mut start).speed(0.05).range(0.0..=f64::MAX).prefix("in "))
                                .changed();
                            let end_changed = ui
                                .add(egui::DragValue::new(&mut end).speed(0.05).range(0.0..=f64::MAX).prefix("out "))
                                .changed();
                            if start_changed || end_changed {
                                store.update(&sub.id, &SubtitlePatch::window(start, end));
                            }

                            let mut font_size = sub.font_size;
                            if ui
                                .add(egui::DragValue::new(&mut font_size).range(8.0..=96.0).suffix("px"))
                                .changed()
                            {
                                store.update(
                                    &sub.id,
                                    &SubtitlePatch {
                                        font_size: Some(font_size),
                                        ..Default::default()
                                    },
                                );
                            }

                            let mut rgb = hex_to_rgb(&sub.color);
                            if egui::color_picker::color_edit_button_srgb(ui, &mut rgb).changed() {
                                store.update(
                                    &sub.id,
                                    &SubtitlePatch {
                                        color: Some(rgb_to_hex(rgb)),
                                        ..Default::default()
                                    },
                                );
                            }

                            let mut align = sub.align;
                            egui::ComboBox::from_id_salt("align")
                                .selected_text(align.label())
                                .width(70.0)
                                .show_ui(ui, |ui| {
                                    for option in [Align::Left, Align::Center, Align::Right] {
                                        ui.selectable_value(&mut align, option, option.label());
                                    }
                                });
                            if align != sub.align {
                                store.update(
                                    &sub.id,
                                    &SubtitlePatch {
                                        align: Some(align),
                                        ..Default::default()
                                    },
                                );
                            }
                        });
                    });
                });
            }
        });
    seek
}

/// Add-text panel: a style template or a custom font and color, plus an
/// entrance animation.
pub struct AddTextPanel {
    template: Option<usize>,
    font_family: String,
    color: String,
    animation: Animation,
}

impl Default for AddTextPanel {
    fn default() -> Self {
        Self {
            template: Some(0),
            font_family: FONTS[0].to_string(),
            color: BRAND_COLORS[0].to_string(),
            animation: Animation::FadeIn,
        }
    }
}

impl AddTextPanel {
    /// Returns the id of a newly added text.
    pub fn show(&mut self, ui: &mut egui::Ui, store: &TextStore, playhead: f64, config: &EditorConfig) -> Option<String> {
        ui.heading("Add Text");
        ui.separator();

        ui.label("Templates");
        for (index, template) in STYLE_TEMPLATES.iter().enumerate() {
            let rgb = hex_to_rgb(template.color);
            let preview = egui::RichText::new(template.preview)
                .size(template.font_size.min(22.0))
                .color(egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2]));
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.template, Some(index), template.name);
                ui.label(preview);
            });
        }
        ui.selectable_value(&mut self.template, None, "Custom");

        if self.template.is_none() {
            egui::ComboBox::from_id_salt("font_family")
                .selected_text(self.font_family.as_str())
                .show_ui(ui, |ui| {
                    for font in FONTS {
                        ui.selectable_value(&mut self.font_family, font.to_string(), font);
                    }
                });
            ui.horizontal_wrapped(|ui| {
                for color in BRAND_COLORS {
                    let rgb = hex_to_rgb(color);
                    let fill = egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2]);
                    let stroke = if self.color == color {
                        egui::Stroke::new(2.0, egui::Color32::WHITE)
                    } else {
                        egui::Stroke::new(1.0, egui::Color32::from_gray(80))
                    };
                    let swatch = egui::Button::new("").fill(fill).stroke(stroke).min_size(egui::vec2(18.0, 18.0));
                    if ui.add(swatch).on_hover_text(color).clicked() {
                        self.color = color.to_string();
                    }
                }
            });
        }

        egui::ComboBox::from_id_salt("animation")
            .selected_text(self.animation.label())
            .show_ui(ui, |ui| {
                for animation in Animation::ALL {
                    ui.selectable_value(&mut self.animation, animation, animation.label());
                }
            });

        if !ui.button("Add text at playhead").clicked() {
            return None;
        }
        let source = match self.template {
            Some(index) => TextSource::Template(&STYLE_TEMPLATES[index]),
            None => TextSource::Custom {
                font_family: self.font_family.clone(),
                color: self.color.clone(),
            },
        };
        let text = new_text_at(
            source,
            self.animation,
            playhead,
            config.text_default_span,
            (config.video_width, config.video_height),
        );
        Some(store.add(text))
    }
}

/// Auto-subtitle panel with quota display.
pub struct AutoSubtitlePanel {
    job: TranscriptionJob,
    language: String,
    model: WhisperModel,
    temperature: f32,
    status: Option<String>,
}

impl AutoSubtitlePanel {
    pub fn new(service: Arc<dyn TranscriptionService>, quota: Quota) -> Self {
        Self {
            job: TranscriptionJob::new(service, quota),
            language: "auto".to_string(),
            model: WhisperModel::default(),
            temperature: 0.3,
            status: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.job.is_loading()
    }

    /// Applies a finished transcription, if any.
    pub fn poll(&mut self, store: &SubtitleStore) {
        match self.job.apply(store) {
            Some(Ok(count)) => self.status = Some(format!("Generated {} subtitles", count)),
            Some(Err(err)) => self.status = Some(format!("Transcription failed: {}", err)),
            None => {}
        }
    }

    pub fn teardown(&mut self) {
        self.job.teardown();
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.heading("Auto Subtitles");
        ui.separator();

        let quota = *self.job.quota();
        ui.label(format!("{} / {} minutes used", quota.used, quota.total));
        ui.add(egui::ProgressBar::new(quota.percent() / 100.0).show_percentage());
        if quota.is_exhausted() {
            ui.colored_label(egui::Color32::from_rgb(255, 80, 80), "Quota exhausted");
        } else if quota.is_low() {
            ui.colored_label(
                egui::Color32::from_rgb(255, 200, 0),
                format!("Only {} minutes left", quota.remaining()),
            );
        }
        if quota.suggests_upgrade() {
            ui.small("Upgrade your plan for more transcription minutes.");
        }

        language_combo(ui, "transcribe_language", "Language", &mut self.language, true);
        egui::ComboBox::from_id_salt("whisper_model")
            .selected_text(self.model.label())
            .show_ui(ui, |ui| {
                for model in WhisperModel::ALL {
                    ui.selectable_value(&mut self.model, model, model.label());
                }
            });
        ui.add(egui::Slider::new(&mut self.temperature, 0.0..=1.0).text("Temperature"));

        let loading = self.job.is_loading();
        let button = egui::Button::new(if loading { "Transcribing…" } else { "Generate subtitles" });
        if ui.add_enabled(!loading && !quota.is_exhausted(), button).clicked() {
            let mut request = TranscriptionRequest::new(vec![0; TIMELINE_AUDIO_BYTES], "timeline-audio.wav");
            request.language = self.language.clone();
            request.model = self.model;
            request.temperature = self.temperature;
            match self.job.start(request) {
                Ok(_) => self.status = None,
                Err(err) => self.status = Some(err.to_string()),
            }
        }
        if loading {
            ui.spinner();
        }
        if let Some(status) = &self.status {
            ui.label(status);
        }
    }
}

/// Translate and dub panel.
pub struct TranslatePanel {
    translation: TranslationJob,
    dubbing: DubbingJob,
    detector: Arc<dyn LanguageDetector>,
    source: String,
    target: String,
    voice: String,
    status: Option<String>,
}

impl TranslatePanel {
    pub fn new(
        translator: Arc<dyn TranslationService>,
        dubber: Arc<dyn DubbingService>,
        detector: Arc<dyn LanguageDetector>,
        config: &EditorConfig,
    ) -> Self {
        let target = "fa".to_string();
        let voice = default_voice(&target);
        Self {
            translation: TranslationJob::new(translator, config.translate_pacing()),
            dubbing: DubbingJob::new(dubber, config.dub_pacing()),
            detector,
            source: "en".to_string(),
            target,
            voice,
            status: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.translation.is_loading() || self.dubbing.is_loading()
    }

    pub fn poll(&mut self, store: &SubtitleStore) {
        if let Some(count) = self.translation.apply(store) {
            self.status = Some(format!("Translated {} subtitles", count));
        }
        if self.dubbing.poll() {
            self.status = Some(format!("Dubbed {} lines", self.dubbing.lines().len()));
        }
    }

    pub fn teardown(&mut self) {
        self.translation.teardown();
        self.dubbing.teardown();
    }

    pub fn show(&mut self, ui: &mut egui::Ui, store: &SubtitleStore) {
        ui.heading("Translate & Dub");
        ui.separator();

        ui.horizontal(|ui| {
            language_combo(ui, "translate_source", "From", &mut self.source, false);
            if ui.button("Detect").clicked() {
                let sample: String = store
                    .snapshot()
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                if !sample.trim().is_empty() {
                    self.source = detect_language_or_fallback(self.detector.as_ref(), &sample);
                }
            }
        });
        let previous_target = self.target.clone();
        language_combo(ui, "translate_target", "To", &mut self.target, false);
        if self.target != previous_target {
            self.voice = default_voice(&self.target);
        }

        let busy = self.translation.is_loading();
        if ui
            .add_enabled(!busy, egui::Button::new(if busy { "Translating…" } else { "Translate all" }))
            .clicked()
        {
            self.translation.start(store.snapshot(), &self.source, &self.target);
        }

        ui.separator();
        egui::ComboBox::from_id_salt("dub_voice")
            .selected_text(self.voice.as_str())
            .show_ui(ui, |ui| {
                for voice in voices_for(&self.target) {
                    ui.selectable_value(&mut self.voice, voice.id.to_string(), voice.name);
                }
            });
        let dubbing = self.dubbing.is_loading();
        if ui
            .add_enabled(!dubbing, egui::Button::new(if dubbing { "Dubbing…" } else { "Dub all" }))
            .clicked()
        {
            self.dubbing.start(store.snapshot(), &self.target, &self.voice);
        }
        if self.is_loading() {
            ui.spinner();
        }
        if let Some(status) = &self.status {
            ui.label(status);
        }

        for line in self.dubbing.lines() {
            ui.horizontal(|ui| {
                ui.label(format!("{} ({:.1}s)", format_time(line.start), line.audio.duration));
                ui.small(&line.audio.audio_url);
            });
        }
    }
}
