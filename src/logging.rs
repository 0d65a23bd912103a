//! File-backed tracing so diagnostics never corrupt the terminal UI.

use crate::config::AppConfig;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

const TRACE_PATH_VAR: &str = "VOXSPHERE_TRACE_LOG";
const TRACE_FILE_NAME: &str = "voxsphere_trace.jsonl";

/// Install the global JSONL subscriber once, if logging is enabled.
///
/// `--no-logs` wins over `--logs`. A log file that cannot be opened disables
/// logging silently; writing anything to stdout here would tear the UI.
pub fn init_tracing(config: &AppConfig) {
    if !config.logs || config.no_logs {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let file = match OpenOptions::new().create(true).append(true).open(trace_path()) {
            Ok(file) => file,
            Err(_) => return,
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(Arc::new(file))
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn trace_path() -> PathBuf {
    env::var(TRACE_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join(TRACE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_path_prefers_the_env_override() {
        env::set_var(TRACE_PATH_VAR, "/tmp/voxsphere_override.jsonl");
        assert_eq!(trace_path(), PathBuf::from("/tmp/voxsphere_override.jsonl"));
        env::remove_var(TRACE_PATH_VAR);
        assert!(trace_path().ends_with(TRACE_FILE_NAME));
    }
}
