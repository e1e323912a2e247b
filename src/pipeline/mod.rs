pub mod assemble;
pub mod event;
pub mod synthesize;
pub mod transcribe;

pub use assemble::assemble_transcript;
pub use event::PipelineEvent;
pub use synthesize::SynthesisPipeline;
pub use transcribe::{Transcript, TranscriptionPipeline};
