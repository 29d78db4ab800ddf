pub mod drag;
pub mod keyboard;
pub mod pinch;
pub mod scrubber;
