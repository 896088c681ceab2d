use tempfile::TempDir;

use sentora::app::{App, Screen};
use sentora::config::Config;
use sentora::corpus::{Corpus, Lesson};
use sentora::engine::leaderboard::View;
use sentora::feedback::NullSink;
use sentora::store::json_store::JsonStore;

fn lesson(level: u32, title: &str, sentences: &[&str]) -> Lesson {
    Lesson {
        level,
        title: title.to_string(),
        difficulty: 1,
        words: Vec::new(),
        sentences: sentences.iter().map(|s| s.to_string()).collect(),
        translations: Vec::new(),
    }
}

fn make_corpus() -> Corpus {
    Corpus::from_lessons(vec![
        lesson(1, "Greetings", &["Excuse me.", "Yes, it is."]),
        lesson(2, "Questions", &["Is this your pen?"]),
    ])
}

fn make_app(dir: &TempDir) -> App {
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut config = Config::default();
    config.player_name = "Ada".to_string();
    App::new(config, store, make_corpus(), Box::new(NullSink))
}

fn play_sentence(app: &mut App, text: &str) {
    for ch in text.chars() {
        app.type_char(ch);
    }
    app.submit();
}

#[test]
fn a_full_level_persists_every_engine() {
    let dir = TempDir::new().unwrap();
    {
        let mut app = make_app(&dir);
        app.start_level(0);
        assert_eq!(app.screen, Screen::Playing);

        play_sentence(&mut app, "Excuse me.");
        assert_eq!(app.screen, Screen::Playing);
        play_sentence(&mut app, "Yes, it is.");
        assert_eq!(app.screen, Screen::LevelComplete);

        assert!(app.achievements.is_unlocked("first_level"));
        assert!(app.achievements.is_unlocked("no_errors"));
        assert!(app.achievements.is_unlocked("perfect_sentence"));
        assert!(app.levels.exp() > 0);
        assert_eq!(app.leaderboard.top(View::AllTime, 10)[0].name, "Ada");
    }

    // Everything lands in its own JSON file.
    for file in ["achievements.json", "progress.json", "leaderboard.json"] {
        assert!(dir.path().join(file).exists(), "{file} missing");
    }

    // A fresh process sees the same state.
    let app = make_app(&dir);
    assert!(app.achievements.is_unlocked("first_level"));
    assert!(app.levels.exp() > 0);
    let top = app.leaderboard.top(View::AllTime, 10);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].accuracy, 100);
}

#[test]
fn mistakes_cost_combo_but_not_completion() {
    let dir = TempDir::new().unwrap();
    let mut app = make_app(&dir);
    app.start_level(1);

    // A typo, corrected with backspace, still lets the sentence through.
    app.type_char('I');
    app.type_char('x');
    assert_eq!(app.combo.combo, 0);
    app.backspace();
    for ch in "s this your pen?".chars() {
        app.type_char(ch);
    }
    app.submit();

    assert_eq!(app.screen, Screen::LevelComplete);
    let session = app.session.as_ref().unwrap();
    assert!(session.errors == 0, "backspace refunded the typo");
    assert!(session.score > 0);
    // Accuracy reflects the typo even though it was corrected.
    assert!(app.leaderboard.top(View::AllTime, 10)[0].accuracy < 100);
}

#[test]
fn daily_challenge_progress_is_persisted_across_restarts() {
    let dir = TempDir::new().unwrap();
    {
        let mut app = make_app(&dir);
        app.start_daily_challenge();
        app.start_level(0);
        play_sentence(&mut app, "Excuse me.");
    }
    assert!(dir.path().join("daily_challenge.json").exists());

    let app = make_app(&dir);
    let progress = app.daily.progress();
    assert!(progress.started);
    assert_eq!(progress.chars, 10);
    assert_eq!(progress.sentences, 1);
}

#[test]
fn retry_resets_the_session_counters() {
    let dir = TempDir::new().unwrap();
    let mut app = make_app(&dir);
    app.start_level(0);
    play_sentence(&mut app, "Excuse me.");
    app.go_to_menu();
    assert!(app.session.is_none());

    app.start_level(0);
    let session = app.session.as_ref().unwrap();
    assert_eq!(session.sentence_index, 0);
    assert_eq!(session.total_chars, 0);
    assert_eq!(session.errors, 0);
}
