// Forward-language synthesis.
//
// The compiler builds its primary DFA for the reversed sentences. Turning
// every transition around yields an automaton for the sentences in reading
// order, once start and accepting roles are swapped:
//
// - the end states (sentinel-marked) are merged into the new start state 0;
// - the old start state 0 is renumbered to a fresh id M (one past the largest
//   id) and becomes the only accepting state, written first as `M -1 -1 1 0`;
// - every transition `from label to` is emitted as `to label from 0 0`.
//
// The result is generally nondeterministic and goes to `determinize` and
// then `minimize`.

use std::collections::BTreeSet;

use crate::FaError;
use crate::format::{DfaRecord, SENTINEL};
use crate::graph::{Dfa, StateId};

/// States carrying an end marker record (`s -1 -1 ...`).
pub fn end_states(records: &[DfaRecord]) -> BTreeSet<i32> {
    records
        .iter()
        .filter(|r| r.is_end_marker())
        .map(|r| r.from)
        .collect()
}

/// One past the largest state id mentioned by `records`.
pub fn next_free_state(records: &[DfaRecord]) -> Result<i32, FaError> {
    match records
        .iter()
        .flat_map(|r| {
            let to = if r.is_end_marker() { SENTINEL } else { r.to };
            [r.from, to]
        })
        .max()
    {
        Some(m) => m.checked_add(1).ok_or(FaError::StateIdOverflow(m)),
        None => Ok(0),
    }
}

/// Synthesize the forward-language NFA records from reverse DFA records.
///
/// Record order follows the input; the synthetic accepting state comes first.
/// End-marker records of the input are consumed, not copied.
pub fn synthesize_reverse_nfa(records: &[DfaRecord]) -> Result<Vec<DfaRecord>, FaError> {
    let ends = end_states(records);
    let m = next_free_state(records)?;

    let mut out = Vec::with_capacity(records.len() + 1);
    out.push(DfaRecord::end_marker(m));
    for r in records.iter().filter(|r| !r.is_end_marker()) {
        let mut from = r.from;
        let mut to = r.to;
        if from == 0 {
            from = m;
        }
        if to == 0 {
            to = m;
        }
        if from != m && ends.contains(&from) {
            from = 0;
        }
        if to != m && ends.contains(&to) {
            to = 0;
        }
        out.push(DfaRecord::arc(to, r.label, from, 0));
    }
    Ok(out)
}

/// Exact reversal of an arbitrary graph, without merging end states.
///
/// Old state `s` becomes `s + 1`; the new start 0 copies the reversed
/// transitions that entered any accepting state. Old state 0 becomes the
/// accepting state 1 (and 0 is accepting too if the empty input was).
pub fn reverse_language(dfa: &Dfa) -> Dfa {
    let mut out = Dfa::with_states(dfa.state_count() + 1);
    for (p, state) in dfa.states().iter().enumerate() {
        let p = p as StateId;
        for arc in &state.arcs {
            out.add_arc(arc.to + 1, arc.label, p + 1);
            if dfa.is_accepting(arc.to) {
                out.add_arc(0, arc.label, p + 1);
            }
        }
    }
    if dfa.state_count() > 0 {
        out.set_accepting(1, true);
        out.set_accepting(0, dfa.is_accepting(0));
    }
    out
}

/// Whether the merged-end-state synthesis is exact for `records`.
///
/// Merging is safe when no accepting state has outgoing transitions and the
/// start state is not accepting, which is the shape the builder and minimizer
/// produce for grammars without empty sentences.
pub fn end_states_are_terminal(records: &[DfaRecord]) -> Result<bool, FaError> {
    let dfa = Dfa::from_records(records)?;
    let ends = end_states(records);
    Ok(!dfa.is_accepting(0)
        && dfa
            .accepting_states()
            .all(|s| dfa.state(s).arcs.is_empty() && ends.contains(&(s as i32))))
}

/// Forward NFA records for a reverse DFA.
///
/// Uses [`synthesize_reverse_nfa`] when its merge is exact, otherwise the
/// general [`reverse_language`] construction.
pub fn forward_nfa_records(records: &[DfaRecord]) -> Result<Vec<DfaRecord>, FaError> {
    if records.is_empty() {
        return Err(FaError::EmptyAutomaton);
    }
    if end_states_are_terminal(records)? {
        return synthesize_reverse_nfa(records);
    }
    tracing::warn!(
        "reverse DFA has accepting states with outgoing transitions; using exact reversal"
    );
    Ok(reverse_language(&Dfa::from_records(records)?).to_records())
}
