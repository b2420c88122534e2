// gramdfa-cli: shared utilities for the grammar tools.

use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use gramdfa::CompileError;
use gramdfa_fa::Dfa;
use gramdfa_fa::format::{parse_records, render_records};
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over the flags when set.
pub fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .init();
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("Error: {msg}");
    process::exit(1);
}

/// Report a failed compile run and exit with code 1.
pub fn exit_with(err: &CompileError) -> ! {
    if let CompileError::MissingTools(paths) = err {
        for path in paths {
            eprintln!("Error: {} not found", path.display());
        }
        process::exit(1);
    }
    fatal(&err.to_string())
}

/// Directory holding the running executable, where the external tools are
/// installed side by side.
pub fn default_tool_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Read a graph from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_dfa(path: Option<&Path>) -> Result<Dfa, String> {
    let text = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .map_err(|e| format!("failed to read {}: {e}", p.display()))?,
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            text
        }
    };
    let records = parse_records(&text).map_err(|e| e.to_string())?;
    Dfa::from_records(&records).map_err(|e| e.to_string())
}

/// Write a graph to `path`, or to stdout when `path` is `None` or `-`.
pub fn write_dfa(path: Option<&Path>, dfa: &Dfa) -> Result<(), String> {
    let text = render_records(&dfa.to_records());
    match path {
        Some(p) if p != Path::new("-") => std::fs::write(p, text)
            .map_err(|e| format!("failed to write {}: {e}", p.display())),
        _ => io::stdout()
            .lock()
            .write_all(text.as_bytes())
            .map_err(|e| format!("failed to write stdout: {e}")),
    }
}

/// `"<k> categories, <n> nodes, <a> arcs"`
pub fn describe(dfa: &Dfa) -> String {
    format!(
        "{} categories, {} nodes, {} arcs",
        dfa.category_count(),
        dfa.state_count(),
        dfa.arc_count()
    )
}
