//! Script-based external planner runner.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

use crate::error::BackendError;
use crate::external::{ExternalPlan, ExternalRequest};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct ScriptRunnerConfig {
    pub script: PathBuf,
    /// Interpreters tried in order; the first answering `--version` is used.
    pub interpreters: Vec<String>,
    pub timeout_secs: u64,
}

impl ScriptRunnerConfig {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            interpreters: vec!["python".to_string(), "python3".to_string(), "py".to_string()],
            timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScriptRunner {
    config: ScriptRunnerConfig,
}

impl ScriptRunner {
    pub fn new(config: ScriptRunnerConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, request: &ExternalRequest) -> Result<ExternalPlan, BackendError> {
        if !self.config.script.is_file() {
            return Err(BackendError::ScriptMissing(self.config.script.clone()));
        }
        let interpreter = self.resolve_interpreter()?;

        let mut command = Command::new(&interpreter);
        command
            .arg("-X")
            .arg("utf8")
            .arg(&self.config.script)
            .arg("--data")
            .arg(&request.data_dir);
        if let Some(swap_days) = request.swap_days {
            command.arg("--swapDays").arg(swap_days.to_string());
        }
        if let Some(days) = request.days {
            command.arg("--days").arg(days.to_string());
        }
        command.env("PYTHONIOENCODING", "utf-8").env("PYTHONUTF8", "1");

        debug!(%interpreter, script = %self.config.script.display(), "running planner script");
        let stdout = run_with_timeout(command, Duration::from_secs(self.config.timeout_secs))?;

        let fallback_files = [
            PathBuf::from("output.json"),
            PathBuf::from("python").join("output.json"),
            request.data_dir.join("output.json"),
        ];
        extract_json(&stdout)
            .or_else(|| read_first_json(&fallback_files))
            .map(ExternalPlan)
            .ok_or(BackendError::NoJson)
    }

    fn resolve_interpreter(&self) -> Result<String, BackendError> {
        self.config
            .interpreters
            .iter()
            .find(|candidate| {
                Command::new(candidate.as_str())
                    .arg("--version")
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
                    .map(|status| status.success())
                    .unwrap_or(false)
            })
            .cloned()
            .ok_or_else(|| BackendError::NoInterpreter(self.config.interpreters.clone()))
    }
}

/// Run to completion, killing the child if it outlives `timeout`. Returns stdout.
fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<String, BackendError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // pipes are read concurrently with the wait loop
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            return Err(BackendError::Timeout(timeout.as_secs()));
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = join_reader(stdout_reader);
    let stderr = join_reader(stderr_reader);

    if status.success() {
        Ok(stdout.trim().to_string())
    } else {
        Err(BackendError::ProcessFailure {
            status: status.to_string(),
            stderr: stderr.trim().to_string(),
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Err(err) = pipe.read_to_end(&mut buffer) {
            debug!(error = %err, bytes = buffer.len(), "pipe read failed, keeping partial output");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Find a JSON document in script output.
///
/// Tries, in order: the whole output, the text between `JSON_START` and
/// `JSON_END`, and the window from the first `{` to the last `}`.
pub fn extract_json(stdout: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(stdout) {
        return Some(value);
    }

    if let (Some(start), Some(end)) = (stdout.find("JSON_START"), stdout.rfind("JSON_END")) {
        let from = start + "JSON_START".len();
        if end > from {
            if let Ok(value) = serde_json::from_str::<Value>(stdout[from..end].trim()) {
                return Some(value);
            }
        }
    }

    let (first, last) = (stdout.find('{')?, stdout.rfind('}')?);
    if last > first {
        return serde_json::from_str(&stdout[first..=last]).ok();
    }
    None
}

fn read_first_json(paths: &[PathBuf]) -> Option<Value> {
    paths.iter().find_map(|path| read_json(path))
}

fn read_json(path: &Path) -> Option<Value> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_output_is_json() {
        let value = extract_json(r#"{"total_cost": 10}"#).unwrap();
        assert_eq!(value["total_cost"], 10);
    }

    #[test]
    fn json_between_markers() {
        let out = "loading...\nJSON_START\n{\"swaps_count\": 3}\nJSON_END\ndone";
        assert_eq!(extract_json(out).unwrap()["swaps_count"], 3);
    }

    #[test]
    fn json_inside_noise() {
        let out = "step 1 ok\nresult: {\"a\": {\"b\": 1}} (elapsed 2s)";
        assert_eq!(extract_json(out).unwrap()["a"]["b"], 1);
    }

    #[test]
    fn no_json_at_all() {
        assert!(extract_json("nothing here").is_none());
        assert!(extract_json("} reversed {").is_none());
    }

    struct BrokenPipe {
        sent: bool,
    }

    impl Read for BrokenPipe {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.sent {
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"));
            }
            self.sent = true;
            let chunk = b"{\"partial\": true}";
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn pipe_failure_keeps_what_was_read() {
        let output = join_reader(Some(spawn_reader(BrokenPipe { sent: false })));
        assert_eq!(output, r#"{"partial": true}"#);
    }

    #[test]
    fn missing_script_is_reported() {
        let runner = ScriptRunner::new(ScriptRunnerConfig::new("/nonexistent/planner.py"));
        let request = ExternalRequest {
            data_dir: PathBuf::from("data"),
            swap_days: None,
            days: None,
        };
        assert!(matches!(runner.run(&request), Err(BackendError::ScriptMissing(_))));
    }
}
