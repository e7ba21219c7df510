//! Decides when a folded job state publishes files into the live project.

use crate::types::content::FileContentMap;
use crate::types::job::{AgentStatus, JobState};

/// Receiver of materialized project content
pub trait ProjectSink {
    /// Publish `content` under `project_name`.
    ///
    /// With `is_new_project` the content replaces the project wholesale;
    /// otherwise it is patched into the project that is already loaded.
    fn on_project_update(&mut self, content: FileContentMap, project_name: &str, is_new_project: bool);
}

/// A pending call to [`ProjectSink::on_project_update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeEffect {
    pub content: FileContentMap,
    pub project_name: String,
    pub is_new_project: bool,
}

impl MaterializeEffect {
    pub fn apply<S: ProjectSink + ?Sized>(self, sink: &mut S) {
        sink.on_project_update(self.content, &self.project_name, self.is_new_project);
    }
}

/// Per-job dispatch bookkeeping. Create one for every job that is started.
#[derive(Debug)]
pub struct UpdateDispatcher {
    project_name: String,
    published_completion: bool,
    last_preview: Option<FileContentMap>,
}

impl UpdateDispatcher {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            published_completion: false,
            last_preview: None,
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Inspect the state produced by one fold step.
    ///
    /// - `generate` publishes its result once, as a new project, on completion.
    /// - `debug` patches the loaded project on completion, and also while
    ///   running whenever a new partial result arrives.
    /// - Failed jobs and the document/scaffold kinds never publish.
    pub fn inspect(&mut self, state: &JobState) -> Option<MaterializeEffect> {
        let effect = match state {
            JobState::Generate(job) => match (job.status, &job.result) {
                (AgentStatus::Completed, Some(files)) if !self.published_completion => {
                    self.published_completion = true;
                    Some(self.effect(files, true))
                }
                _ => None,
            },
            JobState::Debug(job) => match (job.status, &job.result) {
                (AgentStatus::Completed, Some(files)) if !self.published_completion => {
                    self.published_completion = true;
                    Some(self.effect(files, false))
                }
                (AgentStatus::Running, Some(files)) if self.last_preview.as_ref() != Some(files) => {
                    self.last_preview = Some(files.clone());
                    Some(self.effect(files, false))
                }
                _ => None,
            },
            JobState::Scaffold(_) | JobState::BusinessPlan(_) | JobState::StartupPlan(_) => None,
        };

        match &effect {
            Some(e) => tracing::info!(
                kind = state.kind().as_str(),
                project = %e.project_name,
                files = e.content.len(),
                new_project = e.is_new_project,
                "materializing job result"
            ),
            None => tracing::debug!(
                kind = state.kind().as_str(),
                status = state.status().as_str(),
                "no materialize effect"
            ),
        }
        effect
    }

    /// Inspect `state` and apply any resulting effect to `sink`.
    /// Returns whether the sink was called.
    pub fn dispatch<S: ProjectSink + ?Sized>(&mut self, state: &JobState, sink: &mut S) -> bool {
        match self.inspect(state) {
            Some(effect) => {
                effect.apply(sink);
                true
            }
            None => false,
        }
    }

    fn effect(&self, files: &FileContentMap, is_new_project: bool) -> MaterializeEffect {
        MaterializeEffect {
            content: files.clone(),
            project_name: self.project_name.clone(),
            is_new_project,
        }
    }
}
