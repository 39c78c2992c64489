//! Removal of ε-transitions.

use std::collections::VecDeque;

use indexmap::IndexMap;
use log::{debug, trace};

use super::{
    det::{DenseIds, StateSet},
    Automaton, StateId, Symbol,
};

/// Converts an automaton with ε-transitions into an equivalent automaton without them.
///
/// Each state of the result is the ε-closure of a set of input states.
/// State 0 is the closure of the initial states and the only initial state.
/// From a closure `S`, the transition on `c` leads to the closure of all `c`-successors of `S`; empty targets are omitted.
/// A state is final if its closure contains a final state of the input.
///
/// The result is deterministic but not necessarily complete, and its alphabet equals the input's alphabet.
pub fn eliminate_epsilon(enfa: &Automaton) -> Automaton {
    let mut nfa = Automaton::new();
    for &c in enfa.alphabet() {
        nfa.add_symbol(c);
    }

    let mut state_map: IndexMap<StateSet, StateId> = IndexMap::new();
    let mut queue: VecDeque<StateSet> = VecDeque::new();

    let dense = DenseIds::of(enfa);
    let finals = dense.set(enfa.finals().iter().copied());

    let start = dense.set(enfa.epsilon_closure_of(enfa.initial().iter().copied()));
    let q0 = nfa.new_state();
    nfa.add_initial(q0);
    if start.meets(&finals) {
        nfa.add_final(q0);
    }
    state_map.insert(start.clone(), q0);
    queue.push_back(start);

    while let Some(closure) = queue.pop_front() {
        let from = state_map[&closure];
        for &c in enfa.alphabet() {
            let moved = dense
                .states(&closure)
                .flat_map(|q| enfa.targets(q, Symbol::Char(c)))
                .collect::<Vec<_>>();
            if moved.is_empty() {
                continue;
            }
            let target = dense.set(enfa.epsilon_closure_of(moved));
            let to = match state_map.get(&target) {
                Some(&to) => to,
                None => {
                    let to = nfa.new_state();
                    if target.meets(&finals) {
                        nfa.add_final(to);
                    }
                    trace!("closure {} is state {}", target, to);
                    state_map.insert(target.clone(), to);
                    queue.push_back(target);
                    to
                }
            };
            nfa.add_transition(from, c, to);
        }
    }

    debug!(
        "removed ε-transitions from {} states, {} states remain",
        enfa.num_states(),
        nfa.num_states()
    );
    nfa
}
