use std::sync::mpsc;
use std::thread;

use log::debug;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Notification hooks the session controller fires on game events. All of
/// them are fire-and-forget: the core never waits on or inspects the result.
pub trait EventSink {
    fn on_sentence_started(&mut self, _text: &str) {}
    fn on_correct_char(&mut self) {}
    fn on_incorrect_char(&mut self) {}
    fn on_submit_rejected(&mut self) {}
    fn on_sentence_complete(&mut self) {}
    fn on_level_complete(&mut self) {}
    fn on_achievement_unlocked(&mut self, _name: &str) {}
}

/// Sink for tests and for running with narration disabled.
pub struct NullSink;

impl EventSink for NullSink {}

pub const PRAISE_PHRASES: &[&str] = &[
    "Awesome!",
    "Excellent!",
    "Great job!",
    "Perfect!",
    "Well done!",
    "Fantastic!",
    "Outstanding!",
    "Brilliant!",
    "Superb!",
    "Amazing!",
    "Wonderful!",
    "Incredible!",
];

pub const ENCOURAGEMENT_PHRASES: &[&str] = &[
    "Keep trying!",
    "Don't give up!",
    "You can do it!",
    "Almost there!",
    "Keep going!",
    "Try again!",
    "Stay focused!",
    "Keep practicing!",
    "You're getting better!",
];

pub enum NarrationRequest {
    Sentence(String),
    Praise,
    Encouragement,
    Announcement(String),
}

/// Where narration text ends up. The real speech synthesis backend lives
/// outside this crate; the default sink just logs what would be spoken.
pub trait Speaker: Send {
    fn speak(&mut self, text: &str);
}

pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn speak(&mut self, text: &str) {
        debug!("narrating: {text}");
    }
}

/// Handle to the background narration worker. Requests go over an unbounded
/// channel; the worker owns the speaker and drains the queue until the last
/// sender is dropped. Nothing ever flows back to the game thread.
pub struct Narrator {
    tx: mpsc::Sender<NarrationRequest>,
}

impl Narrator {
    pub fn spawn(mut speaker: Box<dyn Speaker>) -> Self {
        let (tx, rx) = mpsc::channel::<NarrationRequest>();

        thread::spawn(move || {
            let mut rng = SmallRng::from_entropy();
            while let Ok(request) = rx.recv() {
                match request {
                    NarrationRequest::Sentence(text) => speaker.speak(&text),
                    NarrationRequest::Praise => {
                        let idx = rng.gen_range(0..PRAISE_PHRASES.len());
                        speaker.speak(PRAISE_PHRASES[idx]);
                    }
                    NarrationRequest::Encouragement => {
                        let idx = rng.gen_range(0..ENCOURAGEMENT_PHRASES.len());
                        speaker.speak(ENCOURAGEMENT_PHRASES[idx]);
                    }
                    NarrationRequest::Announcement(text) => speaker.speak(&text),
                }
            }
        });

        Self { tx }
    }

    pub fn say(&self, request: NarrationRequest) {
        let _ = self.tx.send(request);
    }
}

/// Routes game events to the narration worker the way the original voice
/// coach behaves: read each new sentence aloud, praise accepted submissions,
/// encourage after a rejected one.
pub struct NarrationSink {
    narrator: Narrator,
}

impl NarrationSink {
    pub fn new(narrator: Narrator) -> Self {
        Self { narrator }
    }
}

impl EventSink for NarrationSink {
    fn on_sentence_started(&mut self, text: &str) {
        self.narrator.say(NarrationRequest::Sentence(text.to_string()));
    }

    fn on_sentence_complete(&mut self) {
        self.narrator.say(NarrationRequest::Praise);
    }

    fn on_submit_rejected(&mut self) {
        self.narrator.say(NarrationRequest::Encouragement);
    }

    fn on_level_complete(&mut self) {
        self.narrator
            .say(NarrationRequest::Announcement("Level complete!".to_string()));
    }

    fn on_achievement_unlocked(&mut self, name: &str) {
        self.narrator
            .say(NarrationRequest::Announcement(format!("Achievement unlocked: {name}")));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    struct RecordingSpeaker {
        spoken: Arc<Mutex<Vec<String>>>,
    }

    impl Speaker for RecordingSpeaker {
        fn speak(&mut self, text: &str) {
            self.spoken.lock().unwrap().push(text.to_string());
        }
    }

    #[test]
    fn worker_drains_requests_in_order() {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let narrator = Narrator::spawn(Box::new(RecordingSpeaker {
            spoken: Arc::clone(&spoken),
        }));

        narrator.say(NarrationRequest::Sentence("Excuse me.".to_string()));
        narrator.say(NarrationRequest::Praise);
        narrator.say(NarrationRequest::Announcement("Level complete!".to_string()));

        // Fire-and-forget: give the worker a moment to drain.
        for _ in 0..50 {
            if spoken.lock().unwrap().len() == 3 {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(10));
        }

        let spoken = spoken.lock().unwrap();
        assert_eq!(spoken.len(), 3);
        assert_eq!(spoken[0], "Excuse me.");
        assert!(PRAISE_PHRASES.contains(&spoken[1].as_str()));
        assert_eq!(spoken[2], "Level complete!");
    }
}
