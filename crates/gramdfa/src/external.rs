// Module: External automaton tools.
//
// Drives the `mkfa`, `dfa_determinize` and `dfa_minimize` binaries. Every
// call works inside its own scratch directory, removed when the call returns
// on any path, so concurrent runs never share intermediate files. Each child
// is given a bounded run time and killed when it expires.

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gramdfa_core::grammar::Grammar;
use gramdfa_core::vocabulary::Vocabulary;
use gramdfa_fa::Dfa;
use gramdfa_fa::format::{DfaRecord, parse_records, render_records};
use tempfile::TempDir;

use crate::CompileError;
use crate::config::ToolConfig;
use crate::toolkit::Toolkit;

pub const MKFA: &str = "mkfa";
pub const DFA_MINIMIZE: &str = "dfa_minimize";
pub const DFA_DETERMINIZE: &str = "dfa_determinize";

/// `mkfa` reads category headers with this marker, not `%`.
const MKFA_CATEGORY_MARKER: char = '#';

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Toolkit that shells out to the reference binaries.
#[derive(Debug, Clone)]
pub struct ExternalToolkit {
    mkfa: PathBuf,
    minimize: PathBuf,
    determinize: PathBuf,
    timeout: Duration,
}

/// Path of tool `name` inside `dir`, with the platform executable suffix.
pub fn tool_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX))
}

impl ExternalToolkit {
    /// Locate all three tools. Every missing one is reported, not just the first.
    pub fn new(config: &ToolConfig) -> Result<Self, CompileError> {
        let mkfa = tool_path(&config.tool_dir, MKFA);
        let minimize = tool_path(&config.tool_dir, DFA_MINIMIZE);
        let determinize = tool_path(&config.tool_dir, DFA_DETERMINIZE);

        let missing: Vec<PathBuf> = [&mkfa, &minimize, &determinize]
            .into_iter()
            .filter(|p| !p.is_file())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(CompileError::MissingTools(missing));
        }

        Ok(Self {
            mkfa,
            minimize,
            determinize,
            timeout: config.timeout,
        })
    }

    fn scratch(&self) -> Result<TempDir, CompileError> {
        tempfile::Builder::new()
            .prefix("gramdfa-")
            .tempdir()
            .map_err(|e| CompileError::io(std::env::temp_dir(), e))
    }

    /// `dfa_determinize`/`dfa_minimize` share the `IN -o OUT` command line.
    fn filter(&self, tool: &Path, records: &[DfaRecord]) -> Result<Dfa, CompileError> {
        let dir = self.scratch()?;
        let input = dir.path().join("in.dfa");
        let output = dir.path().join("out.dfa");
        write_file(&input, &render_records(records))?;
        run_tool(
            tool,
            &[input.as_os_str(), OsStr::new("-o"), output.as_os_str()],
            self.timeout,
        )?;
        read_dfa(&output)
    }
}

impl Toolkit for ExternalToolkit {
    fn name(&self) -> &'static str {
        "external"
    }

    fn build(&self, grammar: &Grammar, vocabulary: &Vocabulary) -> Result<Dfa, CompileError> {
        let dir = self.scratch()?;
        let gram = dir.path().join("mkfa.grammar");
        let voca = dir.path().join("mkfa.voca");
        let raw = dir.path().join("mkfa.dfa");
        let header = dir.path().join("mkfa.h");
        let minimized = dir.path().join("min.dfa");

        write_file(&gram, &grammar.render())?;
        write_file(&voca, &vocabulary.render_headers(MKFA_CATEGORY_MARKER))?;

        run_tool(
            &self.mkfa,
            &[
                OsStr::new("-e1"),
                OsStr::new("-fg"),
                gram.as_os_str(),
                OsStr::new("-fv"),
                voca.as_os_str(),
                OsStr::new("-fo"),
                raw.as_os_str(),
                OsStr::new("-fh"),
                header.as_os_str(),
            ],
            self.timeout,
        )?;
        run_tool(
            &self.minimize,
            &[raw.as_os_str(), OsStr::new("-o"), minimized.as_os_str()],
            self.timeout,
        )?;
        read_dfa(&minimized)
    }

    fn determinize(&self, records: &[DfaRecord]) -> Result<Dfa, CompileError> {
        self.filter(&self.determinize, records)
    }

    fn minimize(&self, dfa: &Dfa) -> Result<Dfa, CompileError> {
        self.filter(&self.minimize, &dfa.to_records())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), CompileError> {
    std::fs::write(path, contents).map_err(|e| CompileError::io(path, e))
}

fn read_dfa(path: &Path) -> Result<Dfa, CompileError> {
    let text = std::fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
    let records = parse_records(&text)?;
    Ok(Dfa::from_records(&records)?)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut text);
        }
        text
    })
}

fn tool_name(tool: &Path) -> String {
    tool.file_name()
        .unwrap_or(tool.as_os_str())
        .to_string_lossy()
        .into_owned()
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Run `tool` to completion within `timeout`.
///
/// Output is captured. On success stderr lines, where the tools print their
/// progress, are logged at info level and stdout lines at debug level; on
/// failure stderr is returned unchanged in the error.
pub fn run_tool(tool: &Path, args: &[&OsStr], timeout: Duration) -> Result<(), CompileError> {
    let name = tool_name(tool);
    tracing::debug!("running {} {:?}", tool.display(), args);

    let mut child = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| CompileError::io(tool, e))?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                kill(&mut child);
                return Err(CompileError::ToolTimeout {
                    tool: name,
                    secs: timeout.as_secs(),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill(&mut child);
                return Err(CompileError::io(tool, e));
            }
        }
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();
    if !status.success() {
        return Err(CompileError::ToolFailed {
            tool: name,
            status,
            stderr,
        });
    }
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        tracing::info!("{name}: {line}");
    }
    for line in stdout.lines() {
        tracing::debug!("{name}: {line}");
    }
    Ok(())
}
