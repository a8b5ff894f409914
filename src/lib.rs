pub mod config;
pub mod hand;
pub mod music;
pub mod planner;
pub mod resolver;
pub mod shape;
pub mod songfile;
pub mod tab;

use config::AppConfig;
use music::Song;
use planner::Transcription;

/// Application name for XDG paths
pub const APP_NAME: &str = "tabwright";

/// Plan fingerings for a song with the configured instrument and policies.
pub fn transcribe(song: &Song, config: &AppConfig) -> Transcription {
    config.planner().plan(song)
}

/// Print a transcription as tablature with the configured layout.
pub fn render(transcription: &Transcription, config: &AppConfig) -> String {
    transcription
        .arrange(config.bar_width(), config.max_width)
        .render()
}
