// Module: Automaton toolkit boundary.
//
// The pipeline needs three primitives: build a minimized DFA from a grammar,
// determinize an NFA given as `.dfa` records, and minimize a DFA. They are
// reached through `Toolkit` so the same pipeline drives either the external
// binaries or the in-process implementations below.

use gramdfa_core::grammar::Grammar;
use gramdfa_core::vocabulary::Vocabulary;
use gramdfa_fa::format::DfaRecord;
use gramdfa_fa::{Dfa, builder, determinize, minimize};

use crate::CompileError;

pub trait Toolkit {
    /// Short name used in progress messages.
    fn name(&self) -> &'static str;

    /// Minimized DFA for the sentences of `grammar` over the category ids of
    /// `vocabulary`.
    fn build(&self, grammar: &Grammar, vocabulary: &Vocabulary) -> Result<Dfa, CompileError>;

    /// Deterministic graph equivalent to the automaton in `records`.
    fn determinize(&self, records: &[DfaRecord]) -> Result<Dfa, CompileError>;

    /// Minimal equivalent of `dfa`.
    fn minimize(&self, dfa: &Dfa) -> Result<Dfa, CompileError>;
}

/// In-process toolkit backed by `gramdfa_fa`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeToolkit;

impl Toolkit for NativeToolkit {
    fn name(&self) -> &'static str {
        "native"
    }

    fn build(&self, grammar: &Grammar, vocabulary: &Vocabulary) -> Result<Dfa, CompileError> {
        Ok(builder::build_dfa(grammar, vocabulary)?)
    }

    fn determinize(&self, records: &[DfaRecord]) -> Result<Dfa, CompileError> {
        let nfa = Dfa::from_records(records)?;
        Ok(determinize::determinize(&nfa)?)
    }

    fn minimize(&self, dfa: &Dfa) -> Result<Dfa, CompileError> {
        Ok(minimize::minimize(dfa)?)
    }
}
