//! UI layer: app shell, panels and small widgets for the wallpaper view.

pub mod app;
pub mod widgets;

pub use app::{MoodPaperApp, StartupConfig};
