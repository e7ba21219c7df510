use libgenloom_core::types::Replacement;
use libgenloom_core::{GenloomError, LogEntry};
use serde::Serialize;
use crate::cli::Cli;

/// JSON response envelope
#[derive(Serialize)]
pub struct JsonResponse<T: Serialize> {
    pub schema_version: u32,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

#[derive(Serialize)]
pub struct JsonError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

fn to_pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"ok\":false,\"error\":\"unserializable output: {}\"}}", e))
}

/// Output a successful result
pub fn output_success<T: Serialize>(cli: &Cli, data: T) {
    if cli.json {
        let response = JsonResponse {
            schema_version: 1,
            ok: true,
            data: Some(data),
            error: None,
        };
        println!("{}", to_pretty(&response));
    } else if !cli.quiet {
        println!("{}", to_pretty(&data));
    }
}

/// Output an error
pub fn output_error(cli: &Cli, err: &GenloomError) {
    if cli.json {
        let suggestions = err.suggestions();
        let details = if suggestions.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::json!({ "suggestions": suggestions })
        };

        let response: JsonResponse<()> = JsonResponse {
            schema_version: 1,
            ok: false,
            data: None,
            error: Some(JsonError {
                code: err.error_code().to_string(),
                message: err.to_string(),
                details,
            }),
        };
        eprintln!("{}", to_pretty(&response));
    } else {
        eprintln!("error: {}", err);
        let suggestions = err.suggestions();
        if !suggestions.is_empty() {
            eprintln!();
            eprintln!("Suggestions:");
            for suggestion in suggestions {
                eprintln!("  - {}", suggestion);
            }
        }
    }
}

/// Print human-readable output (ignored in quiet and JSON modes)
pub fn print_human(cli: &Cli, msg: &str) {
    if !cli.json && !cli.quiet {
        println!("{}", msg);
    }
}

/// One log line: `[source] key (k=v, ...)`
pub fn format_log(entry: &LogEntry) -> String {
    let mut line = format!(
        "{} [{}] {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.source,
        entry.message_key
    );
    if let Some(replacements) = &entry.replacements {
        let parts: Vec<String> = replacements
            .iter()
            .map(|(k, v)| match v {
                Replacement::Text(s) => format!("{}={}", k, s),
                Replacement::Number(n) => format!("{}={}", k, n),
            })
            .collect();
        line.push_str(&format!(" ({})", parts.join(", ")));
    }
    line
}
