pub mod overlay_renderer;
pub mod scene;
pub mod time_player_bridge;
pub mod time_source;
pub mod waveform;
