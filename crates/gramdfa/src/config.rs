// Module: Run configuration.
//
// A run is identified by a file prefix; every input and output path is the
// prefix with a fixed suffix appended (`fruit` -> `fruit.grammar`, ...).

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gramdfa_core::dictionary::DictionaryPolicy;

/// Default limit for a single external tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(600);

/// What one compile run reads and produces.
#[derive(Debug, Clone)]
pub struct CompileConfig {
    pub prefix: PathBuf,
    /// Keep the existing `.dict` instead of regenerating it.
    pub skip_dict: bool,
    /// Do not produce `.dfa.forward`.
    pub skip_forward: bool,
    pub dict_policy: DictionaryPolicy,
}

impl CompileConfig {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            skip_dict: false,
            skip_forward: false,
            dict_policy: DictionaryPolicy::default(),
        }
    }

    pub fn paths(&self) -> OutputPaths {
        OutputPaths::for_prefix(&self.prefix)
    }
}

/// Input and output files derived from a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub grammar: PathBuf,
    pub voca: PathBuf,
    pub dfa: PathBuf,
    pub forward: PathBuf,
    pub term: PathBuf,
    pub dict: PathBuf,
}

impl OutputPaths {
    pub fn for_prefix(prefix: &Path) -> Self {
        let with = |suffix: &str| {
            let mut name = OsString::from(prefix.as_os_str());
            name.push(suffix);
            PathBuf::from(name)
        };
        Self {
            grammar: with(".grammar"),
            voca: with(".voca"),
            dfa: with(".dfa"),
            forward: with(".dfa.forward"),
            term: with(".term"),
            dict: with(".dict"),
        }
    }
}

/// Where the external tools live and how long each may run.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub tool_dir: PathBuf,
    pub timeout: Duration,
}

impl ToolConfig {
    pub fn new(tool_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool_dir: tool_dir.into(),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}
