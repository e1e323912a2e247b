pub mod speech;

pub use speech::{HttpSpeechService, SpeechBackend, SpeechTask, TranscribeOptions};
