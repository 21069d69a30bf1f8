//! Dictionaries for compressed categorical columns.
//!
//! A categorical column stores small `uint32` codes; its [`Dictionary`] maps each
//! code back to the string it stands for. Codes are assigned in order of first
//! appearance by [`Dictionary::encode`], and every kernel operation orders a
//! categorical column by code, not by word.

use std::collections::HashMap;

/// Code → string table for a categorical column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dictionary {
    words: Vec<String>,
    codes: HashMap<String, u32>,
}

impl Dictionary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary whose code `i` is `words[i]`. Later duplicates keep the
    /// first code for lookups.
    #[must_use]
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dict = Self::new();
        for w in words {
            let w = w.into();
            let code = dict.next_code();
            dict.codes.entry(w.clone()).or_insert(code);
            dict.words.push(w);
        }
        dict
    }

    #[allow(clippy::cast_possible_truncation)]
    fn next_code(&self) -> u32 {
        self.words.len() as u32
    }

    /// Return the code for `word`, assigning the next free one if it is new.
    pub fn intern(&mut self, word: &str) -> u32 {
        if let Some(&code) = self.codes.get(word) {
            return code;
        }
        let code = self.next_code();
        self.words.push(word.to_string());
        self.codes.insert(word.to_string(), code);
        code
    }

    /// Encode a sequence of strings, extending the dictionary as needed.
    pub fn encode<'a, I>(&mut self, words: I) -> Vec<u32>
    where
        I: IntoIterator<Item = &'a str>,
    {
        words.into_iter().map(|w| self.intern(w)).collect()
    }

    #[must_use]
    pub fn word(&self, code: u32) -> Option<&str> {
        self.words.get(code as usize).map(String::as_str)
    }

    #[must_use]
    pub fn code(&self, word: &str) -> Option<u32> {
        self.codes.get(word).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_assigns_codes_in_first_seen_order() {
        let mut d = Dictionary::new();
        let codes = d.encode(["red", "blue", "red", "green"]);
        assert_eq!(codes, vec![0, 1, 0, 2]);
        assert_eq!(d.word(1), Some("blue"));
        assert_eq!(d.code("green"), Some(2));
        assert_eq!(d.word(9), None);
    }

    #[test]
    fn from_words_keeps_positions() {
        let d = Dictionary::from_words(["x", "y"]);
        assert_eq!(d.len(), 2);
        assert_eq!(d.word(0), Some("x"));
        assert_eq!(d.code("y"), Some(1));
    }
}
