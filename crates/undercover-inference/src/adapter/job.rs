use std::sync::Arc;
use std::thread::JoinHandle;

use super::base::InferenceAdapter;
use crate::error::{InferenceError, panic_message};
use crate::logging::LOG_TARGET;

/// Handle to a generation running on a background thread.
pub struct GenerationJob {
    state: JobState,
}

enum JobState {
    Running(JoinHandle<Result<String, InferenceError>>),
    Failed(InferenceError),
}

impl GenerationJob {
    pub fn is_finished(&self) -> bool {
        match &self.state {
            JobState::Running(join) => join.is_finished(),
            JobState::Failed(_) => true,
        }
    }

    /// Wait for the generation and return its result.
    pub fn join(self) -> Result<String, InferenceError> {
        match self.state {
            JobState::Running(join) => join.join().unwrap_or_else(|payload| {
                Err(InferenceError::ThreadPanicked(panic_message(
                    payload.as_ref(),
                )))
            }),
            JobState::Failed(e) => Err(e),
        }
    }
}

impl InferenceAdapter {
    /// Run [`InferenceAdapter::generate`] on a new thread so the caller is not blocked.
    pub fn spawn_generate(self: &Arc<Self>, prompt: impl Into<String>) -> GenerationJob {
        let adapter = Arc::clone(self);
        let prompt = prompt.into();
        let spawned = std::thread::Builder::new()
            .name("undercover-generate".into())
            .spawn(move || adapter.generate(&prompt));
        let state = match spawned {
            Ok(join) => JobState::Running(join),
            Err(e) => {
                log::error!(target: LOG_TARGET, "Failed to start generation thread: {e}");
                JobState::Failed(InferenceError::Execution(e.into()))
            }
        };
        GenerationJob { state }
    }
}
