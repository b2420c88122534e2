//! Property tests for the automaton primitives.
//!
//! Random small graphs are pushed through determinize, minimize and forward
//! synthesis; languages are compared by enumerating every word up to a fixed
//! length.

use gramdfa_fa::determinize::determinize;
use gramdfa_fa::format::{parse_records, render_records};
use gramdfa_fa::forward::forward_nfa_records;
use gramdfa_fa::minimize::minimize;
use gramdfa_fa::{Dfa, Label, StateId};
use proptest::prelude::*;

const LABELS: Label = 3;
const MAX_STATES: StateId = 6;
const MAX_WORD: usize = 4;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn words() -> Vec<Vec<Label>> {
    let mut all = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..MAX_WORD {
        let mut next = Vec::new();
        for word in &frontier {
            for label in 0..LABELS {
                let mut w: Vec<Label> = word.clone();
                w.push(label);
                next.push(w);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }
    all
}

fn graph(arcs: &[(StateId, Label, StateId)], accepting: &[StateId], deterministic: bool) -> Dfa {
    let mut dfa = Dfa::with_states(1);
    let mut seen = std::collections::HashSet::new();
    for &(from, label, to) in arcs {
        if deterministic && !seen.insert((from, label)) {
            continue;
        }
        dfa.add_arc(from, label, to);
    }
    for &s in accepting {
        dfa.set_accepting(s, true);
    }
    dfa
}

fn arb_arcs() -> impl Strategy<Value = Vec<(StateId, Label, StateId)>> {
    prop::collection::vec((0..MAX_STATES, 0..LABELS, 0..MAX_STATES), 0..14)
}

fn arb_accepting() -> impl Strategy<Value = Vec<StateId>> {
    prop::collection::vec(0..MAX_STATES, 0..3)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn determinize_preserves_language(arcs in arb_arcs(), accepting in arb_accepting()) {
        let nfa = graph(&arcs, &accepting, false);
        let dfa = determinize(&nfa).unwrap();
        prop_assert!(dfa.is_deterministic());
        for w in words() {
            prop_assert_eq!(nfa.accepts(&w), dfa.accepts(&w), "word {:?}", w);
        }
    }

    #[test]
    fn minimize_preserves_language_and_is_idempotent(
        arcs in arb_arcs(),
        accepting in arb_accepting(),
    ) {
        let dfa = graph(&arcs, &accepting, true);
        let min = minimize(&dfa).unwrap();
        prop_assert!(min.state_count() <= dfa.reachable().len());
        for w in words() {
            prop_assert_eq!(dfa.accepts(&w), min.accepts(&w), "word {:?}", w);
        }
        let again = minimize(&min).unwrap();
        prop_assert_eq!(again.state_count(), min.state_count());
    }

    #[test]
    fn forward_reads_reverse_backwards(arcs in arb_arcs(), accepting in arb_accepting()) {
        let reverse = minimize(&graph(&arcs, &accepting, true)).unwrap();
        let records = reverse.to_records();
        prop_assume!(!records.is_empty());
        let nfa = Dfa::from_records(&forward_nfa_records(&records).unwrap()).unwrap();
        let forward = minimize(&determinize(&nfa).unwrap()).unwrap();
        prop_assert!(forward.is_deterministic());
        for w in words() {
            let mut reversed = w.clone();
            reversed.reverse();
            prop_assert_eq!(forward.accepts(&w), reverse.accepts(&reversed), "word {:?}", w);
        }
    }

    #[test]
    fn records_survive_text_round_trip(arcs in arb_arcs(), accepting in arb_accepting()) {
        let dfa = graph(&arcs, &accepting, true);
        let text = render_records(&dfa.to_records());
        let back = Dfa::from_records(&parse_records(&text).unwrap()).unwrap();
        for w in words() {
            prop_assert_eq!(dfa.accepts(&w), back.accepts(&w));
        }
    }
}
