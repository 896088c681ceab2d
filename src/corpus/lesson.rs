use serde::{Deserialize, Serialize};

/// One scripted lesson: an ordered run of target sentences plus the
/// vocabulary it introduces. Immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lesson {
    pub level: u32,
    pub title: String,
    #[serde(default)]
    pub difficulty: u32,
    #[serde(default)]
    pub words: Vec<String>,
    pub sentences: Vec<String>,
    /// Parallel to `sentences`; entries may be empty.
    #[serde(default)]
    pub translations: Vec<String>,
}

impl Lesson {
    pub fn sentence(&self, index: usize) -> Option<&str> {
        self.sentences.get(index).map(String::as_str)
    }

    pub fn translation(&self, index: usize) -> Option<&str> {
        self.translations
            .get(index)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }
}
