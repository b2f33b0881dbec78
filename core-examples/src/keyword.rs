//! Keyword sanitization and random study words
//!
//! Lookup keywords arrive from flashcard fronts, which often carry furigana
//! brackets, romaji hints, or punctuation. Sanitization keeps only Japanese
//! script and whitespace so the provider query matches what the corpus
//! actually indexes.

use rand::seq::SliceRandom;

/// Built-in study words used by the random-word lookup.
pub const RANDOM_WORDS: &[&str] = &["鼻が高い", "鼻にかける", "鼻につく", "齎す"];

/// Returns true for characters in the Hiragana, Katakana, or Han scripts.
///
/// Covers the common blocks plus the CJK symbol range that holds the
/// iteration marks (々, 〆, 〇) which appear inside ordinary words.
fn is_japanese_script(c: char) -> bool {
    matches!(c,
        '\u{3005}'..='\u{3007}'   // 々 〆 〇
        | '\u{3040}'..='\u{309F}' // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
        | '\u{31F0}'..='\u{31FF}' // Katakana phonetic extensions
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
        | '\u{F900}'..='\u{FAFF}' // CJK compatibility ideographs
        | '\u{FF66}'..='\u{FF9D}' // Halfwidth katakana
    )
}

/// Strips everything except Japanese script and whitespace from a keyword.
///
/// Returns the empty string when nothing survives, which callers treat as an
/// invalid keyword.
pub fn sanitize_keyword(raw: &str) -> String {
    raw.chars()
        .filter(|c| is_japanese_script(*c) || c.is_whitespace())
        .collect()
}

/// Picks a random entry from [`RANDOM_WORDS`].
///
/// Returns `None` only when the list is empty.
pub fn random_word<R: rand::Rng + ?Sized>(rng: &mut R) -> Option<&'static str> {
    RANDOM_WORDS.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_japanese_scripts() {
        assert_eq!(sanitize_keyword("鼻が高い"), "鼻が高い");
        assert_eq!(sanitize_keyword("カタカナ"), "カタカナ");
        assert_eq!(sanitize_keyword("時々"), "時々");
    }

    #[test]
    fn strips_latin_and_punctuation() {
        assert_eq!(sanitize_keyword("食べる (to eat)"), "食べる ");
        assert_eq!(sanitize_keyword("【重要】漢字!"), "重要漢字");
        assert_eq!(sanitize_keyword("hello world"), " ");
    }

    #[test]
    fn empty_when_no_japanese() {
        assert_eq!(sanitize_keyword("abc123"), "");
        assert_eq!(sanitize_keyword(""), "");
    }

    #[test]
    fn random_word_comes_from_list() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let word = random_word(&mut rng).unwrap();
            assert!(RANDOM_WORDS.contains(&word));
        }
    }
}
