pub mod content;
pub mod job;

pub use content::{ContentKind, FileContentMap};
pub use job::{
    AgentJob, AgentStatus, DocumentJob, DocumentStatus, JobKind, JobState, JobStatus, LogEntry,
    Replacement, UpdateRecord,
};
