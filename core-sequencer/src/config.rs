//! Sequencer timing configuration

use std::time::Duration;

/// Fixed delays used between playback steps.
///
/// Defaults match the pacing the widget was tuned with: a short settle after
/// a render before autoplay kicks in, and audible gaps between looped or
/// sequential clips so sentences do not run into each other.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// Delay between a navigation render and the autoplay of the new entry
    pub render_settle_delay: Duration,
    /// Delay before autoplaying the first entry of a fresh lookup
    pub autoplay_delay: Duration,
    /// Pause between repeats in loop mode
    pub loop_gap: Duration,
    /// Pause between entries in play-all mode
    pub play_all_gap: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            render_settle_delay: Duration::from_millis(100),
            autoplay_delay: Duration::from_millis(150),
            loop_gap: Duration::from_millis(100),
            play_all_gap: Duration::from_millis(300),
        }
    }
}

impl SequencerConfig {
    /// All-zero delays. Keeps tests fast and deterministic.
    pub fn instant() -> Self {
        Self {
            render_settle_delay: Duration::ZERO,
            autoplay_delay: Duration::ZERO,
            loop_gap: Duration::ZERO,
            play_all_gap: Duration::ZERO,
        }
    }
}
