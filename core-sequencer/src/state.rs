//! Pure sequencer state transitions
//!
//! Holds the example set, current index, and the loop / play-all flags, with
//! no I/O and no timing. The async shell in [`crate::sequencer`] drives these
//! transitions and performs the side effects (audio, events) they imply,
//! which keeps the transition rules testable without audio hardware.

use core_examples::ExampleSentence;

/// Sequencer-owned view of one keyword lookup.
///
/// Invariants:
/// - `current_index < examples.len()` whenever the set is non-empty
/// - `looping` and `playing_all` are never both true
#[derive(Debug, Default)]
pub struct SequencerState {
    examples: Vec<ExampleSentence>,
    current_index: usize,
    looping: bool,
    playing_all: bool,
}

/// Result of flipping a mode flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    /// The flag actually changed value
    pub changed: bool,
    /// The opposite mode was active and has been cancelled
    pub cancelled_other: bool,
}

impl ModeChange {
    const UNCHANGED: ModeChange = ModeChange {
        changed: false,
        cancelled_other: false,
    };
}

impl SequencerState {
    /// Replaces the example set wholesale and resets index and modes.
    pub fn adopt(&mut self, examples: Vec<ExampleSentence>) {
        self.examples = examples;
        self.current_index = 0;
        self.looping = false;
        self.playing_all = false;
    }

    /// Drops the current set, leaving the empty/loading/error shape.
    pub fn clear(&mut self) {
        self.adopt(Vec::new());
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn playing_all(&self) -> bool {
        self.playing_all
    }

    /// The entry at the current index, `None` when the set is empty.
    pub fn current(&self) -> Option<&ExampleSentence> {
        self.examples.get(self.current_index)
    }

    /// Audio URL of the current entry, if it has one.
    pub fn current_sound_url(&self) -> Option<String> {
        self.current().and_then(|e| e.sound_url.clone())
    }

    /// Moves the index by `direction`, wrapping in both directions.
    ///
    /// Returns the new index, or `None` when the set is empty (no-op).
    pub fn step(&mut self, direction: i32) -> Option<usize> {
        let n = self.examples.len();
        if n == 0 {
            return None;
        }
        let next = (self.current_index as i64 + direction as i64).rem_euclid(n as i64);
        self.current_index = next as usize;
        Some(self.current_index)
    }

    /// Sets the loop flag, cancelling play-all when turning on.
    pub fn set_looping(&mut self, on: bool) -> ModeChange {
        if on == self.looping {
            return ModeChange::UNCHANGED;
        }
        self.looping = on;
        let cancelled_other = on && self.playing_all;
        if cancelled_other {
            self.playing_all = false;
        }
        ModeChange {
            changed: true,
            cancelled_other,
        }
    }

    /// Sets the play-all flag, cancelling loop when turning on.
    pub fn set_playing_all(&mut self, on: bool) -> ModeChange {
        if on == self.playing_all {
            return ModeChange::UNCHANGED;
        }
        self.playing_all = on;
        let cancelled_other = on && self.looping;
        if cancelled_other {
            self.looping = false;
        }
        ModeChange {
            changed: true,
            cancelled_other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(id: &str, sound: Option<&str>) -> ExampleSentence {
        ExampleSentence {
            id: id.to_string(),
            deck_slug: "deck".to_string(),
            deck_title: "Deck".to_string(),
            sentence: "文".to_string(),
            translation: "sentence".to_string(),
            image_url: None,
            sound_url: sound.map(str::to_string),
        }
    }

    fn state_with(n: usize) -> SequencerState {
        let mut state = SequencerState::default();
        state.adopt((0..n).map(|i| example(&format!("e{}", i), Some("u"))).collect());
        state
    }

    #[test]
    fn step_wraps_both_directions() {
        let mut state = state_with(3);
        assert_eq!(state.step(-1), Some(2));
        assert_eq!(state.step(1), Some(0));
        assert_eq!(state.step(1), Some(1));

        // n forward steps return to the start, from any index
        for start in 0..3 {
            let mut state = state_with(3);
            state.current_index = start;
            for _ in 0..3 {
                state.step(1);
            }
            assert_eq!(state.current_index(), start);
        }
    }

    #[test]
    fn step_on_empty_set_is_noop() {
        let mut state = SequencerState::default();
        assert_eq!(state.step(1), None);
        assert_eq!(state.step(-1), None);
        assert_eq!(state.current_index(), 0);
        assert!(state.current().is_none());
    }

    #[test]
    fn adopt_resets_index_and_modes() {
        let mut state = state_with(4);
        state.step(1);
        state.set_looping(true);
        state.adopt(vec![example("fresh", None)]);
        assert_eq!(state.current_index(), 0);
        assert!(!state.looping());
        assert!(!state.playing_all());
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn modes_are_mutually_exclusive() {
        let mut state = state_with(2);

        let change = state.set_looping(true);
        assert!(change.changed);
        assert!(!change.cancelled_other);

        let change = state.set_playing_all(true);
        assert!(change.changed);
        assert!(change.cancelled_other);
        assert!(state.playing_all());
        assert!(!state.looping());

        let change = state.set_looping(true);
        assert!(change.cancelled_other);
        assert!(state.looping());
        assert!(!state.playing_all());
    }

    #[test]
    fn setting_same_mode_twice_is_noop() {
        let mut state = state_with(2);
        state.set_looping(true);
        let change = state.set_looping(true);
        assert!(!change.changed);
        assert!(!change.cancelled_other);
    }

    #[test]
    fn current_sound_url_reflects_entry() {
        let mut state = SequencerState::default();
        state.adopt(vec![example("a", Some("url-a")), example("b", None)]);
        assert_eq!(state.current_sound_url().as_deref(), Some("url-a"));
        state.step(1);
        assert_eq!(state.current_sound_url(), None);
    }
}
