pub mod lesson;

use std::fs;
use std::path::Path;

use log::warn;
use rust_embed::Embed;
use thiserror::Error;

pub use lesson::Lesson;

#[derive(Embed)]
#[folder = "assets/lessons/"]
struct LessonAssets;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read lesson file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse lesson file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("lesson asset {0} is not valid UTF-8")]
    Encoding(String),
}

/// Ordered, read-only lesson corpus. Bundled lessons load first (by asset
/// filename), then any `*.json` files from the user lessons directory.
pub struct Corpus {
    lessons: Vec<Lesson>,
}

impl Corpus {
    pub fn load(user_dir: Option<&Path>) -> Self {
        let mut lessons = Vec::new();

        let mut names: Vec<_> = LessonAssets::iter().collect();
        names.sort();
        for name in names {
            match Self::load_asset(&name) {
                Ok(mut batch) => lessons.append(&mut batch),
                Err(e) => warn!("skipping bundled lessons {name}: {e}"),
            }
        }

        if let Some(dir) = user_dir {
            match Self::load_dir(dir) {
                Ok(mut batch) => lessons.append(&mut batch),
                Err(e) => warn!("skipping user lessons in {}: {e}", dir.display()),
            }
        }

        Self { lessons }
    }

    pub fn from_lessons(lessons: Vec<Lesson>) -> Self {
        Self { lessons }
    }

    fn load_asset(name: &str) -> Result<Vec<Lesson>, CorpusError> {
        let file = LessonAssets::get(name)
            .ok_or_else(|| CorpusError::Encoding(name.to_string()))?;
        let content = std::str::from_utf8(file.data.as_ref())
            .map_err(|_| CorpusError::Encoding(name.to_string()))?;
        Ok(serde_json::from_str(content)?)
    }

    fn load_dir(dir: &Path) -> Result<Vec<Lesson>, CorpusError> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut lessons = Vec::new();
        for path in paths {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<Vec<Lesson>>(&content) {
                Ok(mut batch) => lessons.append(&mut batch),
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }
        Ok(lessons)
    }

    pub fn get(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_lessons_load_in_order() {
        let corpus = Corpus::load(None);
        assert!(!corpus.is_empty());
        for lesson in corpus.lessons() {
            assert!(!lesson.sentences.is_empty(), "{} has no sentences", lesson.title);
        }
        let levels: Vec<u32> = corpus.lessons().iter().map(|l| l.level).collect();
        let mut sorted = levels.clone();
        sorted.sort_unstable();
        assert_eq!(levels, sorted);
    }

    #[test]
    fn user_dir_lessons_append_after_bundled() {
        let dir = tempfile::TempDir::new().unwrap();
        let custom = r#"[{"level": 99, "title": "Custom", "sentences": ["Hi."]}]"#;
        fs::write(dir.path().join("zz_custom.json"), custom).unwrap();
        // A corrupt file in the same directory is skipped, not fatal.
        fs::write(dir.path().join("broken.json"), "[{").unwrap();

        let bundled = Corpus::load(None).len();
        let corpus = Corpus::load(Some(dir.path()));
        assert_eq!(corpus.len(), bundled + 1);
        assert_eq!(corpus.get(bundled).map(|l| l.title.as_str()), Some("Custom"));
    }

    #[test]
    fn missing_user_dir_is_not_fatal() {
        let corpus = Corpus::load(Some(Path::new("/nonexistent/lessons")));
        assert_eq!(corpus.len(), Corpus::load(None).len());
    }
}
