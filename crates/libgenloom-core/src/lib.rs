pub mod accumulator;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod mutator;
pub mod paths;
pub mod session;
pub mod store;
pub mod tree;
pub mod types;

pub use config::{load_config, save_config, ExportConfig, GenloomConfig};
pub use dispatch::{MaterializeEffect, ProjectSink, UpdateDispatcher};
pub use error::{GenloomError, ValidationError};
pub use session::{JobTicket, Session};
pub use store::ProjectStore;
pub use tree::{NodeKind, PathNode};
pub use types::{ContentKind, FileContentMap, JobKind, JobState, JobStatus, LogEntry, UpdateRecord};
