//! Grammar compiler pipeline.
//!
//! Reads `<prefix>.grammar` and `<prefix>.voca`, and writes the reverse DFA
//! (`.dfa`), the forward DFA (`.dfa.forward`), the term table (`.term`) and
//! the word dictionary (`.dict`). The automaton work goes through the
//! [`Toolkit`] trait, implemented by external binaries ([`ExternalToolkit`])
//! or in-process ([`NativeToolkit`]).
//!
//! # Architecture
//!
//! - [`config`] -- Run configuration and derived output paths
//! - [`toolkit`] -- Build/determinize/minimize boundary and the native implementation
//! - [`external`] -- `mkfa`, `dfa_determinize` and `dfa_minimize` as child processes
//! - [`output`] -- Staged output files committed together or rolled back
//! - [`pipeline`] -- The compile sequence
//! - [`check`] -- Sentence acceptance against the compiled files

use std::path::PathBuf;
use std::process::ExitStatus;

use gramdfa_core::dictionary::DictError;
use gramdfa_fa::FaError;

pub mod check;
pub mod config;
pub mod external;
pub mod output;
pub mod pipeline;
pub mod toolkit;

pub use check::{InputMode, Rejection, SentenceChecker};
pub use config::{CompileConfig, OutputPaths, ToolConfig};
pub use external::ExternalToolkit;
pub use pipeline::{Compiler, DfaStats, Report};
pub use toolkit::{NativeToolkit, Toolkit};

/// Error type for a compile run.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{}", missing_tools_message(.0))]
    MissingTools(Vec<PathBuf>),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} failed ({status}){}", stderr_suffix(.stderr))]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("{tool} did not finish within {secs} seconds")]
    ToolTimeout { tool: String, secs: u64 },
    #[error(transparent)]
    Automaton(#[from] FaError),
    #[error(transparent)]
    Dictionary(#[from] DictError),
}

impl CompileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }
}

fn missing_tools_message(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("{} not found", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}
