//! Domain types for example sentences

use serde::{Deserialize, Serialize};

/// A single example sentence with optional media, ready for display.
///
/// Media URLs are fully resolved at fetch time so downstream consumers never
/// need to know which provider or CDN the entry came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSentence {
    /// Provider-side identifier (e.g. "anime_xxx_123")
    pub id: String,
    /// Raw deck slug the sentence was sourced from
    pub deck_slug: String,
    /// Human-readable deck title, falls back to the slug when unknown
    pub deck_title: String,
    /// Japanese sentence text
    pub sentence: String,
    /// English translation, may be empty
    pub translation: String,
    /// Fully resolved image URL, if the entry has one
    pub image_url: Option<String>,
    /// Fully resolved audio URL, if the entry has one
    pub sound_url: Option<String>,
}

impl ExampleSentence {
    /// Whether this entry can be played by the sequencer.
    pub fn has_audio(&self) -> bool {
        self.sound_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_audio_reflects_sound_url() {
        let mut example = ExampleSentence {
            id: "anime_frieren_1".to_string(),
            deck_slug: "frieren".to_string(),
            deck_title: "Sousou no Frieren".to_string(),
            sentence: "魔法は想像力の世界だ".to_string(),
            translation: "Magic is a world of imagination.".to_string(),
            image_url: None,
            sound_url: Some("https://cdn.example/a.mp3".to_string()),
        };
        assert!(example.has_audio());

        example.sound_url = None;
        assert!(!example.has_audio());
    }
}
