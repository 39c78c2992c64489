//! Minimization of deterministic finite automata by partition refinement.

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};

use super::{Automaton, StateId};

/// Per-character block indices of a state's successors.
type Signature = Vec<Option<usize>>;

/// Minimizes a complete DFA.
///
/// Starts from the partition `{non-final, final}` (empty blocks omitted) and refines it until no block splits any further.
/// In every pass a state's signature is the block index of its successor on each character of the alphabet, computed against the partition of the previous pass.
/// A block splits into one block per distinct signature, ordered by signature.
/// The blocks of the final partition are the states of the result, numbered in partition order.
///
/// The alphabet of the result equals the alphabet of the input.
/// The result is only minimal if the input is deterministic and complete.
pub fn minimize(dfa: &Automaton) -> Automaton {
    let alphabet: Vec<char> = dfa.alphabet().iter().copied().collect();

    let (finals, non_finals): (Vec<StateId>, Vec<StateId>) =
        dfa.states().iter().partition(|q| dfa.is_final(**q));
    let mut partition: Vec<Vec<StateId>> = [non_finals, finals]
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect();

    loop {
        let block_of = block_index(&partition);
        let mut refined: Vec<Vec<StateId>> = Vec::with_capacity(partition.len());
        for block in &partition {
            let mut groups: BTreeMap<Signature, Vec<StateId>> = BTreeMap::new();
            for &q in block {
                let signature = alphabet
                    .iter()
                    .map(|&c| dfa.successor(q, c).and_then(|p| block_of.get(&p).copied()))
                    .collect();
                groups.entry(signature).or_default().push(q);
            }
            refined.extend(groups.into_values());
        }
        let changed = refined.len() != partition.len();
        partition = refined;
        trace!("partition after refinement: {:?}", partition);
        if !changed {
            break;
        }
    }

    let block_of = block_index(&partition);
    let mut min = Automaton::new();
    for &c in &alphabet {
        min.add_symbol(c);
    }
    for (b, block) in partition.iter().enumerate() {
        min.add_state(b);
        if block.iter().any(|q| dfa.is_final(*q)) {
            min.add_final(b);
        }
        if block.iter().any(|q| dfa.is_initial(*q)) {
            min.add_initial(b);
        }
    }
    for (from, symbol, to) in dfa.transitions() {
        if let (Some(&b1), Some(&b2)) = (block_of.get(&from), block_of.get(&to)) {
            min.add_transition(b1, symbol, b2);
        }
    }

    debug!(
        "minimized automaton with {} states into {} states",
        dfa.num_states(),
        min.num_states()
    );
    min
}

/// Maps every state to the index of its block.
fn block_index(partition: &[Vec<StateId>]) -> HashMap<StateId, usize> {
    partition
        .iter()
        .enumerate()
        .flat_map(|(b, block)| block.iter().map(move |&q| (q, b)))
        .collect()
}

#[cfg(test)]
mod tests {
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::automata::det::tests::{words, SmallNfa};
    use crate::automata::{determinize, is_isomorphic};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn minimize_merges_equivalent_states() {
        init();
        // Accepts words over {a} of length >= 1, with two redundant final states
        let mut dfa = Automaton::new();
        for q in 0..3 {
            dfa.add_state(q);
        }
        dfa.add_initial(0);
        dfa.add_final(1);
        dfa.add_final(2);
        dfa.add_transition(0, 'a', 1);
        dfa.add_transition(1, 'a', 2);
        dfa.add_transition(2, 'a', 1);

        let min = minimize(&dfa);
        assert_eq!(min.num_states(), 2);
        assert!(min.is_det());
        assert!(min.is_initial(0));
        assert!(min.is_final(1));
        assert!(!min.accepts(""));
        assert!(min.accepts("aaa"));
    }

    #[test]
    fn minimize_distinguishes_by_successors() {
        init();
        // (ab)*: states 0 (initial, final) and 1, plus dead state 2
        let mut dfa = Automaton::new();
        for q in 0..3 {
            dfa.add_state(q);
        }
        dfa.add_initial(0);
        dfa.add_final(0);
        dfa.add_transition(0, 'a', 1);
        dfa.add_transition(0, 'b', 2);
        dfa.add_transition(1, 'a', 2);
        dfa.add_transition(1, 'b', 0);
        dfa.add_transition(2, 'a', 2);
        dfa.add_transition(2, 'b', 2);

        let min = minimize(&dfa);
        assert_eq!(min.num_states(), 3);
        assert!(is_isomorphic(&min, &dfa));
    }

    #[test]
    fn minimize_all_final() {
        init();
        let mut dfa = Automaton::new();
        dfa.add_state(0);
        dfa.add_state(1);
        dfa.add_initial(0);
        dfa.add_final(0);
        dfa.add_final(1);
        dfa.add_transition(0, 'a', 1);
        dfa.add_transition(1, 'a', 0);

        let min = minimize(&dfa);
        assert_eq!(min.num_states(), 1);
        assert!(min.is_final(0));
        assert!(min.is_initial(0));
        assert_eq!(min.num_transitions(), 1);
    }

    #[test]
    fn minimize_empty_automaton() {
        let min = minimize(&Automaton::new());
        assert_eq!(min.num_states(), 0);
    }

    #[quickcheck]
    fn minimize_preserves_language(nfa: SmallNfa) -> TestResult {
        let dfa = determinize(&nfa.0);
        let min = minimize(&dfa);
        if min.num_states() > dfa.num_states() || !min.is_det() {
            return TestResult::failed();
        }
        for w in words(4) {
            if dfa.accepts(&w) != min.accepts(&w) {
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }

    #[quickcheck]
    fn minimize_is_idempotent(nfa: SmallNfa) -> bool {
        let min = minimize(&determinize(&nfa.0));
        is_isomorphic(&minimize(&min), &min)
    }
}
