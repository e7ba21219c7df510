use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::FileContentMap;

/// Which generation action a job belongs to. Each kind owns one job slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobKind {
    Generate,
    Debug,
    Scaffold,
    BusinessPlan,
    StartupPlan,
}

impl JobKind {
    pub const ALL: [JobKind; 5] = [
        JobKind::Generate,
        JobKind::Debug,
        JobKind::Scaffold,
        JobKind::BusinessPlan,
        JobKind::StartupPlan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Generate => "generate",
            JobKind::Debug => "debug",
            JobKind::Scaffold => "scaffold",
            JobKind::BusinessPlan => "businessPlan",
            JobKind::StartupPlan => "startupPlan",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        JobKind::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Agent kinds report running progress with task names and logs;
    /// the rest are document generators.
    pub fn is_agent(&self) -> bool {
        matches!(self, JobKind::Generate | JobKind::Debug | JobKind::Scaffold)
    }
}

/// Status vocabulary as it appears on the wire, across all kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Idle,
    Parsing,
    Generating,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Idle => "idle",
            JobStatus::Parsing => "parsing",
            JobStatus::Generating => "generating",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Lifecycle of generate/debug/scaffold jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl AgentStatus {
    pub fn from_wire(status: JobStatus) -> Option<Self> {
        match status {
            JobStatus::Pending => Some(AgentStatus::Pending),
            JobStatus::Running => Some(AgentStatus::Running),
            JobStatus::Completed => Some(AgentStatus::Completed),
            JobStatus::Failed => Some(AgentStatus::Failed),
            _ => None,
        }
    }

    pub fn to_wire(self) -> JobStatus {
        match self {
            AgentStatus::Pending => JobStatus::Pending,
            AgentStatus::Running => JobStatus::Running,
            AgentStatus::Completed => JobStatus::Completed,
            AgentStatus::Failed => JobStatus::Failed,
        }
    }
}

/// Lifecycle of document generation jobs.
///
/// `Parsing` covers ingestion of user-supplied files and returns to `Idle`
/// before generation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Idle,
    Parsing,
    Generating,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn from_wire(status: JobStatus) -> Option<Self> {
        match status {
            JobStatus::Idle => Some(DocumentStatus::Idle),
            JobStatus::Parsing => Some(DocumentStatus::Parsing),
            JobStatus::Generating => Some(DocumentStatus::Generating),
            JobStatus::Completed => Some(DocumentStatus::Completed),
            JobStatus::Failed => Some(DocumentStatus::Failed),
            _ => None,
        }
    }

    pub fn to_wire(self) -> JobStatus {
        match self {
            DocumentStatus::Idle => JobStatus::Idle,
            DocumentStatus::Parsing => JobStatus::Parsing,
            DocumentStatus::Generating => JobStatus::Generating,
            DocumentStatus::Completed => JobStatus::Completed,
            DocumentStatus::Failed => JobStatus::Failed,
        }
    }
}

/// Value substituted into a localized log message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Replacement {
    Text(String),
    Number(serde_json::Number),
}

impl From<&str> for Replacement {
    fn from(s: &str) -> Self {
        Replacement::Text(s.to_string())
    }
}

impl From<u64> for Replacement {
    fn from(n: u64) -> Self {
        Replacement::Number(n.into())
    }
}

/// One log line reported by the generation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub source: String,
    pub message_key: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacements: Option<BTreeMap<String, Replacement>>,
}

impl LogEntry {
    pub fn new(source: impl Into<String>, message_key: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message_key: message_key.into(),
            timestamp: Utc::now(),
            replacements: None,
        }
    }

    pub fn with_replacement(mut self, key: impl Into<String>, value: impl Into<Replacement>) -> Self {
        self.replacements
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// One incremental message from the generation backend.
///
/// Every field is optional; an absent field leaves the job's value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    /// Percentage; fractional, negative and oversized values are normalized on fold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<LogEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_contents: Option<FileContentMap>,
}

impl UpdateRecord {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_progress(mut self, progress: impl Into<f64>) -> Self {
        self.progress = Some(progress.into());
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.current_task = Some(task.into());
        self
    }

    pub fn with_log(mut self, entry: LogEntry) -> Self {
        self.logs.get_or_insert_with(Vec::new).push(entry);
        self
    }

    pub fn with_files(mut self, files: FileContentMap) -> Self {
        self.file_contents = Some(files);
        self
    }
}

/// Accumulated state of a generate/debug/scaffold job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentJob {
    pub status: AgentStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    pub logs: Vec<LogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<FileContentMap>,
}

impl Default for AgentJob {
    fn default() -> Self {
        Self {
            status: AgentStatus::Pending,
            progress: 0,
            current_task: None,
            logs: Vec::new(),
            error: None,
            result: None,
        }
    }
}

/// Accumulated state of a business/startup plan job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentJob {
    pub status: DocumentStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl Default for DocumentJob {
    fn default() -> Self {
        Self {
            status: DocumentStatus::Idle,
            progress: 0,
            error: None,
            result: None,
        }
    }
}

/// A job's accumulated state, keyed by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JobState {
    Generate(AgentJob),
    Debug(AgentJob),
    Scaffold(AgentJob),
    BusinessPlan(DocumentJob),
    StartupPlan(DocumentJob),
}

impl JobState {
    /// Fresh initial state for a newly triggered job
    pub fn new(kind: JobKind) -> Self {
        match kind {
            JobKind::Generate => JobState::Generate(AgentJob::default()),
            JobKind::Debug => JobState::Debug(AgentJob::default()),
            JobKind::Scaffold => JobState::Scaffold(AgentJob::default()),
            JobKind::BusinessPlan => JobState::BusinessPlan(DocumentJob::default()),
            JobKind::StartupPlan => JobState::StartupPlan(DocumentJob::default()),
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            JobState::Generate(_) => JobKind::Generate,
            JobState::Debug(_) => JobKind::Debug,
            JobState::Scaffold(_) => JobKind::Scaffold,
            JobState::BusinessPlan(_) => JobKind::BusinessPlan,
            JobState::StartupPlan(_) => JobKind::StartupPlan,
        }
    }

    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Generate(job) | JobState::Debug(job) | JobState::Scaffold(job) => {
                job.status.to_wire()
            }
            JobState::BusinessPlan(doc) | JobState::StartupPlan(doc) => doc.status.to_wire(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    pub fn progress(&self) -> u8 {
        match self {
            JobState::Generate(job) | JobState::Debug(job) | JobState::Scaffold(job) => job.progress,
            JobState::BusinessPlan(doc) | JobState::StartupPlan(doc) => doc.progress,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            JobState::Generate(job) | JobState::Debug(job) | JobState::Scaffold(job) => {
                job.error.as_deref()
            }
            JobState::BusinessPlan(doc) | JobState::StartupPlan(doc) => doc.error.as_deref(),
        }
    }

    /// Log entries in delivery order (document jobs keep none)
    pub fn logs(&self) -> &[LogEntry] {
        match self {
            JobState::Generate(job) | JobState::Debug(job) | JobState::Scaffold(job) => &job.logs,
            JobState::BusinessPlan(_) | JobState::StartupPlan(_) => &[],
        }
    }

    pub fn current_task(&self) -> Option<&str> {
        match self {
            JobState::Generate(job) | JobState::Debug(job) | JobState::Scaffold(job) => {
                job.current_task.as_deref()
            }
            JobState::BusinessPlan(_) | JobState::StartupPlan(_) => None,
        }
    }

    /// Materialized files carried by an agent job
    pub fn files(&self) -> Option<&FileContentMap> {
        match self {
            JobState::Generate(job) | JobState::Debug(job) | JobState::Scaffold(job) => {
                job.result.as_ref()
            }
            JobState::BusinessPlan(_) | JobState::StartupPlan(_) => None,
        }
    }

    /// Structured payload carried by a document job
    pub fn document(&self) -> Option<&serde_json::Value> {
        match self {
            JobState::BusinessPlan(doc) | JobState::StartupPlan(doc) => doc.result.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings() {
        for kind in JobKind::ALL {
            assert_eq!(JobKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(JobKind::from_str("deploy"), None);
        assert!(JobKind::Scaffold.is_agent());
        assert!(!JobKind::StartupPlan.is_agent());
    }

    #[test]
    fn test_initial_states() {
        assert_eq!(JobState::new(JobKind::Generate).status(), JobStatus::Pending);
        assert_eq!(JobState::new(JobKind::BusinessPlan).status(), JobStatus::Idle);
        for kind in JobKind::ALL {
            let state = JobState::new(kind);
            assert_eq!(state.kind(), kind);
            assert_eq!(state.progress(), 0);
            assert!(state.logs().is_empty());
        }
    }

    #[test]
    fn test_status_vocabulary_per_kind() {
        assert_eq!(AgentStatus::from_wire(JobStatus::Parsing), None);
        assert_eq!(AgentStatus::from_wire(JobStatus::Running), Some(AgentStatus::Running));
        assert_eq!(DocumentStatus::from_wire(JobStatus::Running), None);
        assert_eq!(
            DocumentStatus::from_wire(JobStatus::Generating),
            Some(DocumentStatus::Generating)
        );
    }

    #[test]
    fn test_update_record_wire_form() {
        let json = r#"{
            "status": "running",
            "progress": 40,
            "currentTask": "writing files",
            "logs": [{"source": "agent", "messageKey": "log.step", "timestamp": "2024-05-01T10:00:00Z",
                      "replacements": {"file": "src/main.rs", "count": 3}}],
            "fileContents": {"src/main.rs": "fn main() {}"}
        }"#;
        let record: UpdateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, Some(JobStatus::Running));
        assert_eq!(record.progress, Some(40.0));
        assert_eq!(record.current_task.as_deref(), Some("writing files"));
        let logs = record.logs.unwrap();
        let replacements = logs[0].replacements.as_ref().unwrap();
        assert_eq!(replacements["file"], Replacement::Text("src/main.rs".into()));
        assert_eq!(replacements["count"], Replacement::Number(3u64.into()));
        assert_eq!(record.file_contents.unwrap().get("src/main.rs"), Some("fn main() {}"));
        assert!(record.error.is_none());
    }

    #[test]
    fn test_job_state_is_tagged_by_kind() {
        let state = JobState::new(JobKind::Debug);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["kind"], "debug");
        assert_eq!(json["status"], "pending");
        let back: JobState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
