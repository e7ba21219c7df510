//! Application context: the loaded project plus one job slot per kind.

use std::collections::BTreeMap;
use std::fmt::Display;

use futures::{Stream, StreamExt};

use crate::accumulator::consume;
use crate::dispatch::UpdateDispatcher;
use crate::store::ProjectStore;
use crate::tree::PathNode;
use crate::types::job::{JobKind, JobState, UpdateRecord};

/// Handle for one started job. Superseded once another job of the same kind
/// is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTicket {
    kind: JobKind,
    generation: u64,
}

impl JobTicket {
    pub fn kind(&self) -> JobKind {
        self.kind
    }
}

#[derive(Debug)]
struct JobSlot {
    generation: u64,
    state: JobState,
    dispatcher: UpdateDispatcher,
}

#[derive(Debug, Default)]
pub struct Session {
    project: ProjectStore,
    slots: BTreeMap<JobKind, JobSlot>,
    next_generation: u64,
}

impl Session {
    pub fn new(project: ProjectStore) -> Self {
        Self {
            project,
            ..Self::default()
        }
    }

    pub fn project(&self) -> &ProjectStore {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut ProjectStore {
        &mut self.project
    }

    pub fn tree(&self) -> PathNode {
        self.project.tree()
    }

    /// Current state of the job in `kind`'s slot, if one was started
    pub fn job(&self, kind: JobKind) -> Option<&JobState> {
        self.slots.get(&kind).map(|slot| &slot.state)
    }

    /// Start a job, discarding whatever the slot held before.
    /// `project_name` is the name its result will be published under.
    pub fn begin(&mut self, kind: JobKind, project_name: impl Into<String>) -> JobTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        if let Some(previous) = self.slots.get(&kind) {
            if !previous.state.is_terminal() {
                tracing::info!(
                    kind = kind.as_str(),
                    status = previous.state.status().as_str(),
                    "abandoning unfinished job"
                );
            }
        }
        self.slots.insert(
            kind,
            JobSlot {
                generation,
                state: JobState::new(kind),
                dispatcher: UpdateDispatcher::new(project_name),
            },
        );
        JobTicket { kind, generation }
    }

    pub fn is_current(&self, ticket: &JobTicket) -> bool {
        self.slots
            .get(&ticket.kind)
            .map(|slot| slot.generation == ticket.generation)
            .unwrap_or(false)
    }

    /// Store a folded state and run the dispatch decision for it.
    ///
    /// Returns false (and changes nothing) if the ticket has been superseded;
    /// the caller should stop consuming its update stream.
    pub fn record(&mut self, ticket: &JobTicket, state: JobState) -> bool {
        let Some(slot) = self.slots.get_mut(&ticket.kind) else {
            return false;
        };
        if slot.generation != ticket.generation {
            tracing::debug!(kind = ticket.kind.as_str(), "dropping state from superseded job");
            return false;
        }
        slot.dispatcher.dispatch(&state, &mut self.project);
        slot.state = state;
        true
    }

    /// Start a job and drive it to the end of its update stream
    pub async fn run_job<S, E>(
        &mut self,
        kind: JobKind,
        project_name: impl Into<String>,
        updates: S,
    ) -> JobState
    where
        S: Stream<Item = Result<UpdateRecord, E>>,
        E: Display,
    {
        self.run_job_with(kind, project_name, updates, |_| {}).await
    }

    /// Like [`Session::run_job`], calling `observe` with every folded state
    /// before it is recorded and dispatched.
    pub async fn run_job_with<S, E, F>(
        &mut self,
        kind: JobKind,
        project_name: impl Into<String>,
        updates: S,
        mut observe: F,
    ) -> JobState
    where
        S: Stream<Item = Result<UpdateRecord, E>>,
        E: Display,
        F: FnMut(&JobState),
    {
        let ticket = self.begin(kind, project_name);
        let initial = JobState::new(kind);
        let mut last = initial.clone();
        let mut states = std::pin::pin!(consume(initial, updates));

        while let Some(state) = states.next().await {
            observe(&state);
            last = state.clone();
            if !self.record(&ticket, state) {
                break;
            }
        }
        tracing::info!(
            kind = kind.as_str(),
            status = last.status().as_str(),
            progress = last.progress(),
            logs = last.logs().len(),
            "job stream finished"
        );
        last
    }

    /// Discard the project and every job
    pub fn reset(&mut self) {
        self.project.reset();
        self.slots.clear();
    }
}
