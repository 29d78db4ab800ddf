pub mod overlay_ops;
