//! Progress events emitted while a job runs.
//!
//! Counts and identifiers only, never transcript content.

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub enum PipelineEvent {
    Decoded {
        job_id: Uuid,
        duration_secs: f64,
        chunk_count: usize,
    },
    ChunkStarted {
        job_id: Uuid,
        index: usize,
        total: usize,
    },
    ChunkFinished {
        job_id: Uuid,
        index: usize,
        total: usize,
    },
    Completed {
        job_id: Uuid,
        chunk_count: usize,
    },
    Failed {
        job_id: Uuid,
        chunk_index: Option<usize>,
    },
}

/// Fire-and-forget progress sender. A dropped or full receiver never affects
/// the pipeline.
pub(crate) fn emit(progress: &Option<mpsc::Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = progress {
        let _ = tx.try_send(event);
    }
}
