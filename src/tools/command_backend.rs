//! Backend that runs the configured external programs.
//!
//! Every invocation runs from the project root (so relative arguments such as
//! `screenshot.js` resolve), gets a null stdin, and has stdout and stderr
//! drained on helper threads while the worker waits. A run that exceeds the
//! configured timeout is killed and reported as [`ToolError::Timeout`].

use super::backend::{ToolBackend, ToolError};
use super::params::{CompileParams, RecompressParams, ScreenshotParams};
use crate::config::ProjectConfig;
use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Lines of stderr kept in a [`ToolError::Failed`].
const STDERR_TAIL_LINES: usize = 8;

/// Spawns `stylus`, `phantomjs` and `pngcrush` (or their configured
/// replacements) as child processes.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    workdir: PathBuf,
    compiler: Vec<String>,
    screenshotter: Vec<String>,
    recompressor: Vec<String>,
    timeout: Duration,
}

impl CommandBackend {
    pub fn new(config: &ProjectConfig, workdir: &Path) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
            compiler: config.build.compiler.clone(),
            screenshotter: config.screenshots.command.clone(),
            recompressor: config.screenshots.recompressor.clone(),
            timeout: config.processing.tool_timeout(),
        }
    }

    /// Run `argv` followed by `extra`, returning stdout on success.
    fn run(&self, argv: &[String], extra: Vec<OsString>) -> Result<Vec<u8>, ToolError> {
        let (program, leading) = argv
            .split_first()
            .ok_or_else(|| ToolError::ProcessingFailed("empty command line".to_string()))?;

        let mut child = Command::new(program)
            .args(leading)
            .args(extra)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                child.kill()?;
                child.wait()?;
                return Err(ToolError::Timeout(program.clone(), self.timeout));
            }
        };

        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;
        if !status.success() {
            return Err(ToolError::Failed {
                program: program.clone(),
                status,
                stderr: stderr_tail(&stderr),
            });
        }
        Ok(stdout)
    }
}

impl ToolBackend for CommandBackend {
    fn compile(&self, params: &CompileParams) -> Result<Vec<u8>, ToolError> {
        self.run(&self.compiler, params.args())
    }

    fn screenshot(&self, params: &ScreenshotParams) -> Result<(), ToolError> {
        self.run(&self.screenshotter, params.args()).map(drop)
    }

    fn recompress(&self, params: &RecompressParams) -> Result<(), ToolError> {
        self.run(&self.recompressor, params.args()).map(drop)
    }
}

/// Read a child pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(handle: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("pipe reader panicked")))
}

/// Last few non-empty stderr lines, joined for a one-line error message.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    let tail = lines[start..].join(" | ");
    if tail.is_empty() {
        "(no output on stderr)".to_string()
    } else {
        tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend(workdir: &Path, compiler: &[&str], timeout: Duration) -> CommandBackend {
        let mut config = ProjectConfig::default();
        config.build.compiler = compiler.iter().map(|s| s.to_string()).collect();
        config.screenshots.command = vec!["true".to_string()];
        config.screenshots.recompressor = vec!["cp".to_string()];
        config.processing.tool_timeout_secs = timeout.as_secs().max(1);
        let mut backend = CommandBackend::new(&config, workdir);
        backend.timeout = timeout;
        backend
    }

    fn params() -> CompileParams {
        CompileParams {
            include_dir: "styl".into(),
            theme_stylesheet: "themes/dark/a.styl".into(),
            site_stylesheet: "sites/home.styl".into(),
        }
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let input: String = (1..=20).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(input.as_bytes());
        assert!(tail.starts_with("line 13"));
        assert!(tail.ends_with("line 20"));
    }

    #[test]
    fn stderr_tail_empty() {
        assert_eq!(stderr_tail(b"\n  \n"), "(no output on stderr)");
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let b = backend(
            tmp.path(),
            &["skinmake-no-such-program"],
            Duration::from_secs(5),
        );
        assert!(matches!(b.compile(&params()), Err(ToolError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn compile_captures_stdout_with_appended_args() {
        let tmp = TempDir::new().unwrap();
        let b = backend(
            tmp.path(),
            &["sh", "-c", "echo \"$@\"", "fake-stylus"],
            Duration::from_secs(10),
        );
        let out = b.compile(&params()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "--include styl --import themes/dark/a.styl --import styl -p sites/home.styl\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn compile_runs_in_workdir() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("marker"), "here").unwrap();
        let b = backend(tmp.path(), &["sh", "-c", "cat marker"], Duration::from_secs(10));
        assert_eq!(b.compile(&params()).unwrap(), b"here");
    }

    #[cfg(unix)]
    #[test]
    fn large_output_does_not_deadlock() {
        let tmp = TempDir::new().unwrap();
        let b = backend(
            tmp.path(),
            &["sh", "-c", "head -c 1000000 /dev/zero"],
            Duration::from_secs(30),
        );
        assert_eq!(b.compile(&params()).unwrap().len(), 1_000_000);
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_reports_stderr() {
        let tmp = TempDir::new().unwrap();
        let b = backend(
            tmp.path(),
            &["sh", "-c", "echo 'ParseError: expected indent' >&2; exit 3"],
            Duration::from_secs(10),
        );
        match b.compile(&params()) {
            Err(ToolError::Failed { program, status, stderr }) => {
                assert_eq!(program, "sh");
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "ParseError: expected indent");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn hung_tool_times_out() {
        let tmp = TempDir::new().unwrap();
        let b = backend(tmp.path(), &["sleep", "5"], Duration::from_millis(300));
        let start = std::time::Instant::now();
        assert!(matches!(b.compile(&params()), Err(ToolError::Timeout(..))));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn recompress_runs_configured_program() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("in.png"), "data").unwrap();
        let b = backend(tmp.path(), &["true"], Duration::from_secs(10));
        b.recompress(&RecompressParams {
            input: "in.png".into(),
            output: "out.png".into(),
        })
        .unwrap();
        assert_eq!(std::fs::read(tmp.path().join("out.png")).unwrap(), b"data");
    }
}
