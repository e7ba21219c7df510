use std::fmt::Display;

use futures::stream::{self, Stream, StreamExt};

use crate::types::content::FileContentMap;
use crate::types::job::{
    AgentJob, AgentStatus, DocumentJob, DocumentStatus, JobKind, JobState, UpdateRecord,
};

const MAX_PROGRESS: f64 = 100.0;

impl JobState {
    /// Merge one update record into this state.
    ///
    /// Scalar fields are overwritten only when the record carries them. Logs
    /// are appended in delivery order and never dropped.
    pub fn fold(mut self, update: UpdateRecord) -> JobState {
        let kind = self.kind();
        match &mut self {
            JobState::Generate(job) | JobState::Debug(job) | JobState::Scaffold(job) => {
                merge_agent(job, kind, update)
            }
            JobState::BusinessPlan(doc) | JobState::StartupPlan(doc) => {
                merge_document(doc, kind, update)
            }
        }
        tracing::debug!(
            kind = kind.as_str(),
            status = self.status().as_str(),
            progress = self.progress(),
            logs = self.logs().len(),
            "folded update"
        );
        self
    }

    /// Terminal failure after the update stream itself broke.
    /// Logs stay exactly as they were after the last successful fold. A job
    /// that already reached a terminal status keeps it.
    pub fn fail(mut self, message: impl Into<String>) -> JobState {
        let message = message.into();
        if self.is_terminal() {
            tracing::warn!(
                kind = self.kind().as_str(),
                status = self.status().as_str(),
                error = %message,
                "ignoring failure of an already finished job"
            );
            return self;
        }
        match &mut self {
            JobState::Generate(job) | JobState::Debug(job) | JobState::Scaffold(job) => {
                job.status = AgentStatus::Failed;
                job.error = Some(message);
            }
            JobState::BusinessPlan(doc) | JobState::StartupPlan(doc) => {
                doc.status = DocumentStatus::Failed;
                doc.error = Some(message);
            }
        }
        self
    }
}

/// Round into `0..=100`; NaN carries no information and keeps the prior value
fn clamp_progress(progress: f64) -> Option<u8> {
    if progress.is_nan() {
        return None;
    }
    Some(progress.round().clamp(0.0, MAX_PROGRESS) as u8)
}

fn merge_agent(job: &mut AgentJob, kind: JobKind, update: UpdateRecord) {
    if let Some(wire) = update.status {
        match AgentStatus::from_wire(wire) {
            Some(next) if job.status.to_wire().is_terminal() && next != job.status => {
                tracing::warn!(
                    kind = kind.as_str(),
                    from = job.status.to_wire().as_str(),
                    to = wire.as_str(),
                    "ignoring status change out of a terminal state"
                );
            }
            Some(next) => job.status = next,
            None => {
                tracing::warn!(kind = kind.as_str(), status = wire.as_str(), "status not valid for job kind");
            }
        }
    }
    if let Some(progress) = update.progress.and_then(clamp_progress) {
        job.progress = progress;
    }
    if let Some(task) = update.current_task {
        job.current_task = Some(task);
    }
    if let Some(logs) = update.logs {
        job.logs.extend(logs);
    }
    if let Some(error) = update.error {
        job.error = Some(error);
    }

    // `fileContents` wins over a generic `result` payload
    if let Some(files) = update.file_contents {
        job.result = Some(files);
    } else if let Some(value) = update.result {
        match serde_json::from_value::<FileContentMap>(value) {
            Ok(files) => job.result = Some(files),
            Err(e) => {
                tracing::warn!(kind = kind.as_str(), error = %e, "result is not a file map, ignoring");
            }
        }
    }
}

fn merge_document(doc: &mut DocumentJob, kind: JobKind, update: UpdateRecord) {
    if let Some(wire) = update.status {
        match DocumentStatus::from_wire(wire) {
            Some(next) if doc.status.to_wire().is_terminal() && next != doc.status => {
                tracing::warn!(
                    kind = kind.as_str(),
                    from = doc.status.to_wire().as_str(),
                    to = wire.as_str(),
                    "ignoring status change out of a terminal state"
                );
            }
            Some(next) => doc.status = next,
            None => {
                tracing::warn!(kind = kind.as_str(), status = wire.as_str(), "status not valid for job kind");
            }
        }
    }
    if let Some(progress) = update.progress.and_then(clamp_progress) {
        doc.progress = progress;
    }
    if let Some(error) = update.error {
        doc.error = Some(error);
    }
    if let Some(value) = update.result {
        doc.result = Some(value);
    }
    if update.logs.is_some() || update.current_task.is_some() || update.file_contents.is_some() {
        tracing::trace!(kind = kind.as_str(), "document job ignores agent-only fields");
    }
}

/// Free-function form of [`JobState::fold`]
pub fn fold(state: JobState, update: UpdateRecord) -> JobState {
    state.fold(update)
}

/// Fold a batch of already-delivered records
pub fn fold_all(initial: JobState, updates: impl IntoIterator<Item = UpdateRecord>) -> JobState {
    updates.into_iter().fold(initial, JobState::fold)
}

/// Turn a stream of update records into a stream of accumulated states.
///
/// One state is yielded per record. If the source reports an error, a final
/// `failed` state carrying the error message is yielded and nothing more is
/// pulled from the source.
pub fn consume<S, E>(initial: JobState, updates: S) -> impl Stream<Item = JobState>
where
    S: Stream<Item = Result<UpdateRecord, E>>,
    E: Display,
{
    stream::unfold(Some((initial, Box::pin(updates))), |slot| async move {
        let Some((state, mut updates)) = slot else {
            return None;
        };
        match updates.next().await {
            Some(Ok(update)) => {
                let next = state.fold(update);
                Some((next.clone(), Some((next, updates))))
            }
            Some(Err(e)) if state.is_terminal() => {
                tracing::warn!(
                    kind = state.kind().as_str(),
                    status = state.status().as_str(),
                    error = %e,
                    "update stream failed after the job finished"
                );
                None
            }
            Some(Err(e)) => {
                let message = e.to_string();
                tracing::warn!(kind = state.kind().as_str(), error = %message, "update stream failed");
                Some((state.fail(message), None))
            }
            None => None,
        }
    })
}
