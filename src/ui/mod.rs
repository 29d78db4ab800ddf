pub mod app;
pub mod panels;
pub mod timeline_widget;
pub mod track_widget;
pub mod video_player;
