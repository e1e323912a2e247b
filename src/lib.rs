pub mod account;
pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod services;

// Re-export the main entry points for convenient access
pub use config::AppConfig;
pub use pipeline::{SynthesisPipeline, Transcript, TranscriptionPipeline};
pub use services::{HttpSpeechService, SpeechBackend};
