pub mod combo;
pub mod scoring;
pub mod state;

pub use combo::ComboTracker;
pub use state::{CharOutcome, SessionState};
