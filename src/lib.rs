//! Timeline editor core for subtitle and text-overlay video editing.
//!
//! The library keeps playback time, timeline blocks and on-screen overlays
//! consistent. The `ui` module paints it with egui.

pub mod config;
pub mod error;
pub mod interaction;
pub mod ops;
pub mod renderer;
pub mod services;
pub mod store;
pub mod types;
pub mod ui;
