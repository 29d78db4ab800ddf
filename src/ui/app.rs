use std::sync::Arc;
use std::time::Instant;

use eframe::egui;

use crate::config::EditorConfig;
use crate::renderer::overlay_renderer::SubtitleOverlayView;
use crate::renderer::scene::{SceneModel, SystemClock};
use crate::renderer::time_player_bridge::{Gesture, SyncBridge, TimeView, WaveformLink};
use crate::renderer::time_source::SimulatedMedia;
use crate::renderer::waveform::PeakWaveform;
use crate::services::mock::MockServices;
use crate::services::quota::Quota;
use crate::store::{SubtitleStore, TextStore};
use crate::types::track::TrackList;
use crate::ui::panels::{AddTextPanel, AutoSubtitlePanel, TranslatePanel, subtitle_list_panel};
use crate::ui::timeline_widget::{TimelineEvent, TimelineState, TimelineWidget};
use crate::ui::video_player::{PlayerEvent, VideoPlayer};

const WAVEFORM_BINS: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SideTab {
    #[default]
    Subtitles,
    Text,
    AutoSubtitle,
    Translate,
}

impl SideTab {
    const ALL: [SideTab; 4] = [SideTab::Subtitles, SideTab::Text, SideTab::AutoSubtitle, SideTab::Translate];

    fn label(&self) -> &'static str {
        match self {
            SideTab::Subtitles => "Subtitles",
            SideTab::Text => "Text",
            SideTab::AutoSubtitle => "Auto",
            SideTab::Translate => "Translate",
        }
    }
}

pub struct CutlineApp {
    config: EditorConfig,
    bridge: SyncBridge<SimulatedMedia>,
    subtitles: SubtitleStore,
    texts: TextStore,
    subtitle_view: SubtitleOverlayView,
    scene: SceneModel,
    waveform: WaveformLink<PeakWaveform>,
    tracks: TrackList,
    timeline_state: TimelineState,
    player: VideoPlayer,
    tab: SideTab,
    selected_subtitle: Option<String>,
    add_text: AddTextPanel,
    auto_subtitle: AutoSubtitlePanel,
    translate: TranslatePanel,
    last_frame: Option<Instant>,
}

impl CutlineApp {
    pub fn new(
        config: EditorConfig,
        media: SimulatedMedia,
        subtitles: SubtitleStore,
        texts: TextStore,
        services: Arc<MockServices>,
    ) -> Self {
        let scene = SceneModel::new(texts.clone(), Box::new(SystemClock::default()), &config);
        Self {
            bridge: SyncBridge::new(media),
            subtitle_view: SubtitleOverlayView::new(subtitles.clone()),
            scene,
            waveform: WaveformLink::new(PeakWaveform::new(WAVEFORM_BINS), config.sync_tolerance),
            tracks: TrackList::default(),
            timeline_state: TimelineState::new(&config),
            player: VideoPlayer::new(&config),
            tab: SideTab::default(),
            selected_subtitle: None,
            add_text: AddTextPanel::default(),
            auto_subtitle: AutoSubtitlePanel::new(services.clone(), Quota::default()),
            translate: TranslatePanel::new(services.clone(), services.clone(), services, &config),
            last_frame: None,
            subtitles,
            texts,
            config,
        }
    }

    /// Pushes the current time to every view.
    fn tick(&mut self) {
        self.waveform.cursor_mut().set_duration(self.bridge.duration());
        let mut views: [&mut dyn TimeView; 3] = [&mut self.subtitle_view, &mut self.scene, &mut self.waveform];
        self.bridge.tick(&mut views);
    }
}

impl eframe::App for CutlineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_frame = Some(now);

        self.bridge.begin_frame();
        self.bridge.media_mut().advance(dt);
        self.tick();

        self.auto_subtitle.poll(&self.subtitles);
        self.translate.poll(&self.subtitles);

        let playback = self.bridge.playback_state();
        let mut seeks: Vec<(f64, Gesture)> = Vec::new();
        let mut toggle_play = false;

        egui::SidePanel::right("side_panel")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for tab in SideTab::ALL {
                        ui.selectable_value(&mut self.tab, tab, tab.label());
                    }
                });
                ui.separator();
                match self.tab {
                    SideTab::Subtitles => {
                        let jump = subtitle_list_panel(ui, &self.subtitles, &self.config, &mut self.selected_subtitle);
                        if let Some(time) = jump {
                            seeks.push((time, Gesture::Click));
                        }
                    }
                    SideTab::Text => {
                        let added = self.add_text.show(ui, &self.texts, playback.playhead, &self.config);
                        if let Some(id) = added {
                            self.scene.rebuild(playback.playhead);
                            self.scene.select(Some(id));
                        }
                    }
                    SideTab::AutoSubtitle => self.auto_subtitle.show(ui),
                    SideTab::Translate => self.translate.show(ui, &self.subtitles),
                }
            });

        egui::TopBottomPanel::bottom("timeline_area_panel")
            .resizable(true)
            .min_height(240.0)
            .show(ctx, |ui| {
                let events = TimelineWidget::new(
                    &mut self.timeline_state,
                    &mut self.tracks,
                    &self.subtitles,
                    &self.texts,
                    playback,
                )
                .show(ui);
                for event in events {
                    match event {
                        TimelineEvent::Seek { time, gesture } => seeks.push((time, gesture)),
                        TimelineEvent::PlayToggled => toggle_play = true,
                        TimelineEvent::BlockSelected(id) => self.selected_subtitle = Some(id),
                    }
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let events = self.player.show(
                ui,
                playback,
                self.subtitle_view.current(),
                &mut self.scene,
                self.waveform.cursor(),
                &self.config,
            );
            for event in events {
                match event {
                    PlayerEvent::TogglePlay => toggle_play = true,
                    PlayerEvent::Waveform(event) => self.bridge.on_waveform_event(event),
                }
            }
        });

        if ctx.input(|i| i.key_pressed(egui::Key::Space)) && !ctx.wants_keyboard_input() {
            toggle_play = true;
        }
        if toggle_play {
            self.bridge.toggle_play();
        }
        for (time, gesture) in seeks {
            self.bridge.user_seek(time, gesture);
        }

        // Gesture-driven frames re-notify the views without reconciling
        // against the media.
        self.tick();

        let busy = self.auto_subtitle.is_loading()
            || self.translate.is_loading()
            || self.bridge.duration().is_none();
        if self.bridge.source().is_playing() || self.scene.is_animating() || self.timeline_state.drag.is_dragging() {
            ctx.request_repaint();
        } else if busy {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }
}

impl Drop for CutlineApp {
    fn drop(&mut self) {
        self.auto_subtitle.teardown();
        self.translate.teardown();
    }
}
