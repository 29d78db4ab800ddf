pub mod overlay;
pub mod playback_state;
pub mod subtitle;
pub mod text_overlay;
pub mod time;
pub mod track;
