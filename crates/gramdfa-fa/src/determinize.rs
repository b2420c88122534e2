// Subset construction.
//
// Each output state stands for a set of input states. The start set is the
// singleton {0} and always receives id 0. A set is accepting if any member
// is. Sets are explored breadth-first and labels in ascending order, so the
// numbering is stable for a given input.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hashbrown::HashMap;

use crate::FaError;
use crate::graph::{Dfa, StateId};

/// Determinize `nfa` into an equivalent deterministic graph.
///
/// Only states reachable from state 0 appear in the result.
pub fn determinize(nfa: &Dfa) -> Result<Dfa, FaError> {
    if nfa.state_count() == 0 {
        return Err(FaError::EmptyAutomaton);
    }

    let mut ids: HashMap<Vec<StateId>, StateId> = HashMap::new();
    let mut sets: Vec<Vec<StateId>> = Vec::new();
    let mut queue: VecDeque<StateId> = VecDeque::new();
    let mut dfa = Dfa::new();

    let start = vec![0];
    ids.insert(start.clone(), dfa.add_state());
    sets.push(start);
    queue.push_back(0);

    while let Some(current) = queue.pop_front() {
        let members = &sets[current as usize];
        let accepting = members.iter().any(|&s| nfa.is_accepting(s));

        let mut by_label: BTreeMap<u32, BTreeSet<StateId>> = BTreeMap::new();
        for &member in members {
            for arc in &nfa.state(member).arcs {
                by_label.entry(arc.label).or_default().insert(arc.to);
            }
        }

        let mut arcs = Vec::with_capacity(by_label.len());
        for (label, targets) in by_label {
            let target: Vec<StateId> = targets.into_iter().collect();
            let id = match ids.get(&target) {
                Some(&id) => id,
                None => {
                    let id = dfa.add_state();
                    ids.insert(target.clone(), id);
                    sets.push(target);
                    queue.push_back(id);
                    id
                }
            };
            arcs.push((label, id));
        }

        dfa.set_accepting(current, accepting);
        for (label, to) in arcs {
            dfa.add_arc(current, label, to);
        }
    }

    tracing::debug!(
        nodes = dfa.state_count(),
        arcs = dfa.arc_count(),
        "determinized"
    );
    Ok(dfa)
}
