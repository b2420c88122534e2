// Partition-refinement minimization.
//
// Start from two groups, accepting and non-accepting, then split any group
// whose members disagree on the group reached by some label. Repeat until no
// group splits. Groups are numbered in breadth-first order of their first
// member, which puts the start state's group at 0.

use hashbrown::HashMap;

use crate::FaError;
use crate::graph::{Dfa, Label, StateId};

/// Minimize a deterministic graph.
///
/// States unreachable from state 0 are discarded first. Fails on a
/// nondeterministic input.
pub fn minimize(dfa: &Dfa) -> Result<Dfa, FaError> {
    if dfa.state_count() == 0 {
        return Err(FaError::EmptyAutomaton);
    }
    if let Some((state, label)) = dfa.find_nondeterminism() {
        return Err(FaError::Nondeterministic { state, label });
    }

    // Restrict to reachable states, renumbered densely in BFS order.
    let order = dfa.reachable();
    let mut dense = vec![usize::MAX; dfa.state_count()];
    for (i, &s) in order.iter().enumerate() {
        dense[s as usize] = i;
    }
    let transitions: Vec<Vec<(Label, usize)>> = order
        .iter()
        .map(|&s| {
            let mut arcs: Vec<(Label, usize)> = dfa
                .state(s)
                .arcs
                .iter()
                .map(|a| (a.label, dense[a.to as usize]))
                .collect();
            arcs.sort_unstable();
            arcs
        })
        .collect();
    let accepting: Vec<bool> = order.iter().map(|&s| dfa.is_accepting(s)).collect();

    let mut group: Vec<usize> = accepting.iter().map(|&a| usize::from(!a)).collect();
    let mut group_count = count_distinct(&group);

    loop {
        let mut signatures: HashMap<(usize, Vec<(Label, usize)>), usize> = HashMap::new();
        let mut next = Vec::with_capacity(group.len());
        for (s, arcs) in transitions.iter().enumerate() {
            let signature = (
                group[s],
                arcs.iter().map(|&(label, to)| (label, group[to])).collect(),
            );
            let fresh = signatures.len();
            next.push(*signatures.entry(signature).or_insert(fresh));
        }
        let next_count = signatures.len();
        group = next;
        if next_count == group_count {
            break;
        }
        group_count = next_count;
    }

    // Renumber groups by first appearance; state 0 comes first.
    let mut renumber = vec![usize::MAX; group_count];
    let mut representative = Vec::with_capacity(group_count);
    for (s, &g) in group.iter().enumerate() {
        if renumber[g] == usize::MAX {
            renumber[g] = representative.len();
            representative.push(s);
        }
    }

    let mut out = Dfa::with_states(representative.len());
    for (id, &s) in representative.iter().enumerate() {
        out.set_accepting(id as StateId, accepting[s]);
        for &(label, to) in &transitions[s] {
            out.add_arc(id as StateId, label, renumber[group[to]] as StateId);
        }
    }

    tracing::debug!(
        nodes = out.state_count(),
        arcs = out.arc_count(),
        "minimized"
    );
    Ok(out)
}

fn count_distinct(group: &[usize]) -> usize {
    let mut seen = [false; 2];
    for &g in group {
        seen[g] = true;
    }
    seen.iter().filter(|&&b| b).count()
}
