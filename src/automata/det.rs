//! Determinization of nondeterministic finite automata.
//! An automaton is deterministic if it has a single initial state and for each state and each character in the alphabet there is at most one transition.

use std::{
    collections::{BTreeSet, VecDeque},
    fmt::Display,
};

use bit_set::BitSet;
use indexmap::{IndexMap, IndexSet};
use log::{debug, trace, warn};

use super::{Automaton, StateId, Symbol};

/// A set of states. Each set of states corresponds to a single state in the determinized automaton.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) struct StateSet(BitSet<StateId>);

impl StateSet {
    /// Creates a new empty state set.
    pub(super) fn new() -> Self {
        Self(BitSet::default())
    }

    /// Inserts a state into the set.
    pub(super) fn insert(&mut self, state: StateId) {
        self.0.insert(state);
    }

    /// Returns an iterator over the state IDs in the set.
    pub(super) fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.0.iter()
    }

    /// Returns true if the set is empty.
    pub(super) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the two sets share at least one state.
    pub(super) fn meets(&self, other: &StateSet) -> bool {
        !self.0.is_disjoint(&other.0)
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<T: IntoIterator<Item = StateId>>(iter: T) -> Self {
        let mut set = StateSet::new();
        for q in iter {
            set.insert(q);
        }
        set
    }
}

impl Display for StateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        write!(f, "{{")?;
        for state in self.iter() {
            if first {
                first = false;
            } else {
                write!(f, ", ")?;
            }
            write!(f, "{}", state)?;
        }
        write!(f, "}}")
    }
}

/// Dense indices `0..n` for the states an automaton mentions, in ascending order of their ids.
/// State sets are built over these indices, so their size does not depend on how large the ids are.
pub(super) struct DenseIds(IndexSet<StateId>);

impl DenseIds {
    /// Indexes every state that is declared, initial, final or an endpoint of a transition.
    pub(super) fn of(a: &Automaton) -> Self {
        let mut ids: BTreeSet<StateId> = a.states().clone();
        ids.extend(a.initial());
        ids.extend(a.finals());
        for (from, _, to) in a.transitions() {
            ids.insert(from);
            ids.insert(to);
        }
        Self(ids.into_iter().collect())
    }

    pub(super) fn len(&self) -> usize {
        self.0.len()
    }

    pub(super) fn index(&self, q: StateId) -> Option<usize> {
        self.0.get_index_of(&q)
    }

    pub(super) fn state(&self, i: usize) -> Option<StateId> {
        self.0.get_index(i).copied()
    }

    /// The set of indices of the given states. Unknown states are skipped.
    pub(super) fn set(&self, states: impl IntoIterator<Item = StateId>) -> StateSet {
        states.into_iter().filter_map(|q| self.index(q)).collect()
    }

    /// The states whose indices are in `set`.
    pub(super) fn states<'a>(&'a self, set: &'a StateSet) -> impl Iterator<Item = StateId> + 'a {
        set.iter().filter_map(|i| self.state(i))
    }
}

/// Determinizes an automaton without ε-transitions.
/// The result is a complete DFA over the same alphabet recognizing the same language.
///
/// The function uses the subset construction.
/// The set of initial states becomes state 0, every newly discovered subset gets the next free id in breadth-first order.
/// If some state lacks a transition on some character, a single non-final dead state is added that loops on every character.
/// If there are no initial states, state 0 is that dead state itself.
/// It keeps the input alphabet and therefore loops on every character, rather than having no outgoing transitions at all;
/// this deliberately deviates from an edgeless start state so that the Brzozowski result stays isomorphic to the minimal DFA.
///
/// ε-transitions of the input are ignored; use [`super::eliminate_epsilon`] first.
/// The number of states in the resulting automaton can be exponential in the number of states of the input.
pub fn determinize(nfa: &Automaton) -> Automaton {
    if nfa.has_epsilon() {
        warn!("determinizing an automaton with ε-transitions, they are ignored");
    }
    let mut det = Automaton::new();
    for &c in nfa.alphabet() {
        det.add_symbol(c);
    }

    // Maps a set of NFA states to a DFA state
    let mut state_map: IndexMap<StateSet, StateId> = IndexMap::new();
    // The queue of states to process
    let mut queue: VecDeque<StateSet> = VecDeque::new();

    let dense = DenseIds::of(nfa);
    let finals = dense.set(nfa.finals().iter().copied());

    let initial = dense.set(nfa.initial().iter().copied());
    let q0 = det.new_state();
    det.add_initial(q0);
    if initial.meets(&finals) {
        det.add_final(q0);
    }
    state_map.insert(initial.clone(), q0);
    queue.push_back(initial);

    // Pairs of DFA state and character without a non-empty successor subset
    let mut missing: Vec<(StateId, char)> = Vec::new();

    while let Some(subset) = queue.pop_front() {
        let from = state_map[&subset];
        for &c in nfa.alphabet() {
            let target = dense.set(
                dense
                    .states(&subset)
                    .flat_map(|q| nfa.targets(q, Symbol::Char(c))),
            );
            if target.is_empty() {
                missing.push((from, c));
                continue;
            }
            let to = match state_map.get(&target) {
                Some(&to) => to,
                None => {
                    let to = det.new_state();
                    if target.meets(&finals) {
                        det.add_final(to);
                    }
                    trace!("subset {} is state {}", target, to);
                    state_map.insert(target.clone(), to);
                    queue.push_back(target);
                    to
                }
            };
            det.add_transition(from, c, to);
        }
    }

    if !missing.is_empty() {
        // The empty start subset already is a dead state
        let dead = match state_map.get(&StateSet::new()) {
            Some(&q) => q,
            None => det.new_state(),
        };
        for (q, c) in missing {
            det.add_transition(q, c, dead);
        }
        for &c in nfa.alphabet() {
            det.add_transition(dead, c, dead);
        }
    }

    debug!(
        "determinized automaton with {} states into {} states",
        nfa.num_states(),
        det.num_states()
    );
    det
}
