use std::path::Path;

use futures::{stream, Stream};
use libgenloom_core::{GenloomError, JobKind, JobState, JobStatus, Session, UpdateRecord};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::Cli;
use crate::context::AppContext;
use crate::output::{format_log, output_success, print_human};

#[derive(Serialize)]
struct RunOutput {
    project_name: String,
    project_saved: bool,
    state: JobState,
}

pub fn run(cli: &Cli, kind: JobKind, updates: &Path, name: Option<String>) -> Result<(), GenloomError> {
    let ctx = AppContext::resolve(cli)?;
    let store = ctx.open_store()?;
    let project_name = name.unwrap_or_else(|| ctx.project_name());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut session = Session::new(store.clone());
    let state = runtime.block_on(drive(cli, &mut session, kind, &project_name, updates))?;

    let project_saved = session.project().files() != store.files();
    if project_saved {
        ctx.save_store(session.project())?;
    }

    if cli.json {
        output_success(cli, RunOutput {
            project_name,
            project_saved,
            state: state.clone(),
        });
    } else {
        print_summary(cli, &state, project_saved);
    }

    if state.status() == JobStatus::Failed {
        let message = state.error().unwrap_or("job failed without an error message");
        return Err(GenloomError::Stream(message.to_string()));
    }
    Ok(())
}

/// Parse `path` as JSON lines, one update record per non-blank line
async fn read_updates(path: &Path) -> Result<impl Stream<Item = Result<UpdateRecord, GenloomError>>, GenloomError> {
    let file = tokio::fs::File::open(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => GenloomError::NotFound(path.display().to_string()),
        _ => GenloomError::Io(e),
    })?;
    let lines = BufReader::new(file).lines();

    Ok(stream::unfold((lines, 0usize), |(mut lines, mut line_no)| async move {
        loop {
            line_no += 1;
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    let record = serde_json::from_str::<UpdateRecord>(&line)
                        .map_err(|e| GenloomError::Stream(format!("line {}: {}", line_no, e)));
                    return Some((record, (lines, line_no)));
                }
                Ok(None) => return None,
                Err(e) => return Some((Err(GenloomError::Io(e)), (lines, line_no))),
            }
        }
    }))
}

async fn drive(
    cli: &Cli,
    session: &mut Session,
    kind: JobKind,
    project_name: &str,
    path: &Path,
) -> Result<JobState, GenloomError> {
    let records = read_updates(path).await?;
    let mut printed = 0;
    let state = session
        .run_job_with(kind, project_name, records, |state| {
            for entry in state.logs().iter().skip(printed) {
                print_human(cli, &format_log(entry));
            }
            printed = state.logs().len();
        })
        .await;
    Ok(state)
}

fn print_summary(cli: &Cli, state: &JobState, project_saved: bool) {
    print_human(
        cli,
        &format!(
            "{} job {} ({}%)",
            state.kind().as_str(),
            state.status().as_str(),
            state.progress()
        ),
    );
    if let Some(task) = state.current_task() {
        print_human(cli, &format!("last task: {}", task));
    }
    if let Some(error) = state.error() {
        print_human(cli, &format!("error: {}", error));
    }

    match (state.files(), state.document()) {
        (Some(files), _) if state.kind() == JobKind::Scaffold => {
            print_human(cli, &format!("scaffold ({} entries):", files.len()));
            for (path, _) in files.visible_files() {
                print_human(cli, &format!("  {}", path));
            }
        }
        (_, Some(document)) => {
            let pretty = serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string());
            print_human(cli, &pretty);
        }
        _ => {}
    }

    if project_saved {
        print_human(cli, "project updated");
    }
}
