// Grammar-to-automaton construction.
//
// Each nonterminal is expanded against a continuation: the state the
// expansion must reach once the nonterminal has been read. Expansions are
// memoized on (symbol, continuation), so a nonterminal that recurs in tail
// position closes into a loop instead of recursing forever. Recursion in any
// other position would need a stack; it is rejected as non-regular.
//
// The expansion uses epsilon moves internally. They are removed before the
// graph is handed out, so the result is an ordinary (nondeterministic)
// category graph that `determinize` accepts.

use hashbrown::{HashMap, HashSet};

use gramdfa_core::grammar::Grammar;
use gramdfa_core::vocabulary::Vocabulary;

use crate::FaError;
use crate::determinize::determinize;
use crate::graph::{Dfa, Label, StateId};
use crate::minimize::minimize;

/// A graph with epsilon moves, used only during construction.
#[derive(Debug, Default)]
struct EpsilonNfa {
    graph: Dfa,
    epsilon: Vec<Vec<StateId>>,
}

impl EpsilonNfa {
    fn add_state(&mut self) -> StateId {
        self.epsilon.push(Vec::new());
        self.graph.add_state()
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.epsilon[from as usize].push(to);
    }

    fn closure(&self, start: StateId) -> Vec<StateId> {
        let mut seen = HashSet::new();
        let mut stack = vec![start];
        let mut members = Vec::new();
        while let Some(s) = stack.pop() {
            if !seen.insert(s) {
                continue;
            }
            members.push(s);
            stack.extend(self.epsilon[s as usize].iter().copied());
        }
        members
    }

    /// Fold epsilon closures into labeled arcs and accepting flags.
    fn into_graph(self) -> Dfa {
        let mut out = Dfa::with_states(self.graph.state_count());
        for s in 0..self.graph.state_count() as StateId {
            let mut arcs = Vec::new();
            let mut accepting = false;
            for member in self.closure(s) {
                let state = self.graph.state(member);
                accepting |= state.accepting;
                arcs.extend(state.arcs.iter().copied());
            }
            arcs.sort_unstable();
            arcs.dedup();
            out.set_accepting(s, accepting);
            for arc in arcs {
                out.add_arc(s, arc.label, arc.to);
            }
        }
        out
    }
}

struct Expander<'a> {
    grammar: &'a Grammar,
    vocabulary: &'a Vocabulary,
    nfa: EpsilonNfa,
    memo: HashMap<(&'a str, StateId), StateId>,
    active: Vec<&'a str>,
}

impl<'a> Expander<'a> {
    /// Return a state from which reading `symbol` leads to `cont`.
    fn expand(&mut self, symbol: &'a str, cont: StateId) -> Result<StateId, FaError> {
        if let Some(&entry) = self.memo.get(&(symbol, cont)) {
            return Ok(entry);
        }

        if !self.grammar.defines(symbol) {
            let label: Label = self
                .vocabulary
                .term_id(symbol)
                .ok_or_else(|| FaError::UndefinedSymbol(symbol.to_string()))?;
            let entry = self.nfa.add_state();
            self.nfa.graph.add_arc(entry, label, cont);
            self.memo.insert((symbol, cont), entry);
            return Ok(entry);
        }

        // Tail recursion hits the memo above. A nonterminal that is still
        // being expanded but missed the memo recurs with a fresh continuation.
        if self.active.contains(&symbol) {
            return Err(FaError::NonRegular(symbol.to_string()));
        }

        let entry = self.nfa.add_state();
        self.memo.insert((symbol, cont), entry);
        self.active.push(symbol);
        let grammar = self.grammar;
        for rule in grammar.rules_for(symbol) {
            let mut next = cont;
            for token in rule.right.iter().rev() {
                next = self.expand(token, next)?;
            }
            self.nfa.add_epsilon(entry, next);
        }
        self.active.pop();
        Ok(entry)
    }
}

/// Build a nondeterministic graph accepting the sentences of `grammar`.
///
/// The start symbol is the head of the first rule. Tokens that head no rule
/// must be vocabulary categories; their id becomes the transition label.
pub fn build_nfa(grammar: &Grammar, vocabulary: &Vocabulary) -> Result<Dfa, FaError> {
    let start = grammar.start_symbol().ok_or(FaError::NoStartSymbol)?;

    let mut expander = Expander {
        grammar,
        vocabulary,
        nfa: EpsilonNfa::default(),
        memo: HashMap::new(),
        active: Vec::new(),
    };
    let initial = expander.nfa.add_state();
    let accept = expander.nfa.add_state();
    expander.nfa.graph.set_accepting(accept, true);
    let entry = expander.expand(start, accept)?;
    expander.nfa.add_epsilon(initial, entry);

    for category in vocabulary.categories() {
        if !expander.memo.keys().any(|(name, _)| *name == category.name) {
            tracing::warn!("category \"{}\" in vocabulary is not used by the grammar", category.name);
        }
    }
    for rule in grammar.rules() {
        if !expander.memo.keys().any(|(name, _)| *name == rule.head()) {
            tracing::warn!("rule head \"{}\" is not reachable from the start symbol", rule.head());
        }
    }

    Ok(expander.nfa.into_graph())
}

/// Build the minimal DFA for `grammar`.
pub fn build_dfa(grammar: &Grammar, vocabulary: &Vocabulary) -> Result<Dfa, FaError> {
    let nfa = build_nfa(grammar, vocabulary)?;
    let dfa = determinize(&nfa)?;
    minimize(&dfa)
}
