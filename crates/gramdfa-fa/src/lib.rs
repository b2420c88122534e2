//! Category automata for recognition grammars.
//!
//! This crate holds the DFA state graph exchanged between the compiler
//! stages, its `.dfa` text codec, and the automaton primitives: subset
//! construction, partition-refinement minimization, NFA construction from a
//! regular grammar, and the reverse-to-forward synthesis.
//!
//! # Architecture
//!
//! - [`graph`] -- In-memory state graph with typed accepting flags
//! - [`format`] -- `.dfa` record parsing and rendering
//! - [`determinize`] -- Subset construction
//! - [`minimize`] -- Partition refinement
//! - [`builder`] -- Grammar + vocabulary to automaton
//! - [`forward`] -- Forward-language NFA synthesis from a reverse DFA

pub mod builder;
pub mod determinize;
pub mod format;
pub mod forward;
pub mod graph;
pub mod minimize;

pub use graph::{Arc, Dfa, Label, State, StateId};

/// Error type for automaton parsing and construction.
#[derive(Debug, thiserror::Error)]
pub enum FaError {
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("automaton has no states")]
    EmptyAutomaton,
    #[error("no free state id after {0}")]
    StateIdOverflow(i32),
    #[error("state {state} has more than one transition on label {label}")]
    Nondeterministic { state: StateId, label: Label },
    #[error("grammar has no rules")]
    NoStartSymbol,
    #[error("undefined symbol \"{0}\"")]
    UndefinedSymbol(String),
    #[error("recursion in non-tail position through \"{0}\": grammar is not regular")]
    NonRegular(String),
}
