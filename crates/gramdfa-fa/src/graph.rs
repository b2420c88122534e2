// State graph shared by the reverse DFA, the intermediate NFA and the forward DFA.
//
// State 0 is the start state. Accepting is a typed flag here; the `.dfa`
// sentinel record that carries it on disk is handled by `format`.

use crate::FaError;
use crate::format::{ACCEPT_FLAG, DfaRecord, MAX_ID};

pub type StateId = u32;

/// A category id used as a transition label.
pub type Label = u32;

/// A labeled transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Arc {
    pub label: Label,
    pub to: StateId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub accepting: bool,
    pub arcs: Vec<Arc>,
}

/// A finite automaton over category labels.
///
/// The same type holds deterministic and nondeterministic graphs; use
/// [`Dfa::is_deterministic`] to tell them apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dfa {
    states: Vec<State>,
}

impl Dfa {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with `count` empty, non-accepting states.
    pub fn with_states(count: usize) -> Self {
        Self {
            states: vec![State::default(); count],
        }
    }

    /// Append a fresh state and return its id.
    pub fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        (self.states.len() - 1) as StateId
    }

    /// Grow the graph so that `id` is a valid state.
    pub fn ensure_state(&mut self, id: StateId) {
        let needed = id as usize + 1;
        if self.states.len() < needed {
            self.states.resize(needed, State::default());
        }
    }

    pub fn add_arc(&mut self, from: StateId, label: Label, to: StateId) {
        self.ensure_state(from.max(to));
        self.states[from as usize].arcs.push(Arc { label, to });
    }

    pub fn set_accepting(&mut self, id: StateId, accepting: bool) {
        self.ensure_state(id);
        self.states[id as usize].accepting = accepting;
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id as usize]
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.states
            .get(id as usize)
            .is_some_and(|s| s.accepting)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn arc_count(&self) -> usize {
        self.states.iter().map(|s| s.arcs.len()).sum()
    }

    /// One more than the largest label in use (0 for an arc-less graph).
    pub fn category_count(&self) -> usize {
        self.states
            .iter()
            .flat_map(|s| s.arcs.iter())
            .map(|a| a.label as usize + 1)
            .max()
            .unwrap_or(0)
    }

    /// Ids of accepting states in ascending order.
    pub fn accepting_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.accepting)
            .map(|(i, _)| i as StateId)
    }

    /// The first `(state, label)` pair with two or more outgoing transitions.
    pub fn find_nondeterminism(&self) -> Option<(StateId, Label)> {
        for (id, state) in self.states.iter().enumerate() {
            let mut labels: Vec<Label> = state.arcs.iter().map(|a| a.label).collect();
            labels.sort_unstable();
            if let Some(pair) = labels.windows(2).find(|w| w[0] == w[1]) {
                return Some((id as StateId, pair[0]));
            }
        }
        None
    }

    pub fn is_deterministic(&self) -> bool {
        self.find_nondeterminism().is_none()
    }

    /// Whether the automaton accepts `input`, read from state 0.
    ///
    /// Works for nondeterministic graphs too (all runs are tracked).
    pub fn accepts(&self, input: &[Label]) -> bool {
        if self.states.is_empty() {
            return false;
        }
        let mut current = vec![false; self.states.len()];
        current[0] = true;
        for &label in input {
            let mut next = vec![false; self.states.len()];
            let mut any = false;
            for (id, active) in current.iter().enumerate() {
                if !active {
                    continue;
                }
                for arc in self.states[id].arcs.iter().filter(|a| a.label == label) {
                    next[arc.to as usize] = true;
                    any = true;
                }
            }
            if !any {
                return false;
            }
            current = next;
        }
        current
            .iter()
            .zip(&self.states)
            .any(|(active, state)| *active && state.accepting)
    }

    /// Ids reachable from state 0, in breadth-first order.
    pub fn reachable(&self) -> Vec<StateId> {
        if self.states.is_empty() {
            return Vec::new();
        }
        let mut seen = vec![false; self.states.len()];
        let mut order = vec![0];
        seen[0] = true;
        let mut head = 0;
        while head < order.len() {
            let id = order[head];
            head += 1;
            for arc in &self.states[id as usize].arcs {
                if !seen[arc.to as usize] {
                    seen[arc.to as usize] = true;
                    order.push(arc.to);
                }
            }
        }
        order
    }

    /// Build a graph from `.dfa` records.
    ///
    /// A record marks its source state accepting if it is a sentinel record or
    /// carries the accept flag. Arcs keep record order.
    pub fn from_records(records: &[DfaRecord]) -> Result<Self, FaError> {
        let mut dfa = Dfa::new();
        for (idx, record) in records.iter().enumerate() {
            let from = record_state(record.from, idx)?;
            dfa.ensure_state(from);
            if record.is_accepting() || record.is_end_marker() {
                dfa.set_accepting(from, true);
            }
            if record.is_end_marker() {
                continue;
            }
            let label = record_state(record.label, idx)?;
            let to = record_state(record.to, idx)?;
            dfa.add_arc(from, label, to);
        }
        Ok(dfa)
    }

    /// Render as `.dfa` records.
    ///
    /// Per state, in id order: its arcs (the first flagged when accepting),
    /// then a sentinel record if the state is accepting and has no arcs.
    pub fn to_records(&self) -> Vec<DfaRecord> {
        let mut records = Vec::with_capacity(self.arc_count() + self.states.len());
        for (id, state) in self.states.iter().enumerate() {
            let from = id as i32;
            let mut flag = state.accepting;
            for arc in &state.arcs {
                records.push(DfaRecord::arc(
                    from,
                    arc.label as i32,
                    arc.to as i32,
                    if flag { ACCEPT_FLAG } else { 0 },
                ));
                flag = false;
            }
            if flag {
                records.push(DfaRecord::end_marker(from));
            }
        }
        records
    }
}

/// Convert a record field to an id, rejecting negative and oversized values.
fn record_state(value: i32, idx: usize) -> Result<StateId, FaError> {
    if value < 0 {
        return Err(FaError::Parse {
            line: idx + 1,
            reason: format!("negative field {value} outside an end marker"),
        });
    }
    if value > MAX_ID {
        return Err(FaError::Parse {
            line: idx + 1,
            reason: format!("id {value} exceeds the limit {MAX_ID}"),
        });
    }
    Ok(value as StateId)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 -0-> 1 -1-> 2(accepting)
    fn chain() -> Dfa {
        let mut dfa = Dfa::new();
        dfa.add_arc(0, 0, 1);
        dfa.add_arc(1, 1, 2);
        dfa.set_accepting(2, true);
        dfa
    }

    #[test]
    fn counts() {
        let dfa = chain();
        assert_eq!(dfa.state_count(), 3);
        assert_eq!(dfa.arc_count(), 2);
        assert_eq!(dfa.category_count(), 2);
        assert_eq!(dfa.accepting_states().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn accepts_only_the_chain() {
        let dfa = chain();
        assert!(dfa.accepts(&[0, 1]));
        assert!(!dfa.accepts(&[1, 0]));
        assert!(!dfa.accepts(&[0]));
        assert!(!dfa.accepts(&[]));
        assert!(!dfa.accepts(&[0, 1, 1]));
    }

    #[test]
    fn empty_graph_accepts_nothing() {
        assert!(!Dfa::new().accepts(&[]));
    }

    #[test]
    fn nondeterministic_accepts_tracks_all_runs() {
        let mut nfa = Dfa::new();
        nfa.add_arc(0, 0, 1);
        nfa.add_arc(0, 0, 2);
        nfa.add_arc(2, 1, 3);
        nfa.set_accepting(3, true);
        assert!(!nfa.is_deterministic());
        assert_eq!(nfa.find_nondeterminism(), Some((0, 0)));
        assert!(nfa.accepts(&[0, 1]));
    }

    #[test]
    fn reachable_is_breadth_first() {
        let mut dfa = chain();
        dfa.add_state();
        assert_eq!(dfa.reachable(), vec![0, 1, 2]);
    }

    #[test]
    fn records_round_trip_through_graph() {
        let dfa = chain();
        let records = dfa.to_records();
        assert_eq!(records.last(), Some(&DfaRecord::end_marker(2)));
        assert_eq!(Dfa::from_records(&records).unwrap(), dfa);
    }

    #[test]
    fn accepting_state_with_arcs_is_flagged_on_first_arc() {
        let mut dfa = Dfa::new();
        dfa.add_arc(0, 3, 0);
        dfa.add_arc(0, 4, 0);
        dfa.set_accepting(0, true);
        let records = dfa.to_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, ACCEPT_FLAG);
        assert_eq!(records[1].status, 0);
        assert!(Dfa::from_records(&records).unwrap().is_accepting(0));
    }

    #[test]
    fn from_records_rejects_half_sentinel() {
        let records = [DfaRecord::arc(0, -1, 3, 0)];
        assert!(matches!(
            Dfa::from_records(&records),
            Err(FaError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn from_records_rejects_oversized_ids() {
        let records = [DfaRecord::arc(i32::MAX, 0, 0, 0)];
        assert!(matches!(
            Dfa::from_records(&records),
            Err(FaError::Parse { line: 1, .. })
        ));
        let records = [DfaRecord::arc(0, 0, 1, 0), DfaRecord::end_marker(MAX_ID + 1)];
        assert!(matches!(
            Dfa::from_records(&records),
            Err(FaError::Parse { line: 2, .. })
        ));
    }
}
