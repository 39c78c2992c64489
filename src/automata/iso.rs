//! Structural isomorphism of deterministic automata.

use std::collections::{BTreeMap, VecDeque};

use log::debug;

use super::{Automaton, StateId};

/// Searches for an isomorphism between two deterministic automata.
///
/// Both automata must have exactly one initial state and the same alphabet, otherwise there is no isomorphism.
/// Starting from the pair of initial states, the automata are traversed in lockstep.
/// Paired states must agree on finality and, for every character, either both or neither must have a successor.
/// A character without a successor on both sides is accepted; the stricter rule that fails as soon as either side lacks a transition
/// would reject every automaton with a final sink such as `0 a 1`, even when compared with itself.
/// Successors are paired on first visit and must agree with the existing pairing afterwards.
///
/// The returned map sends every state of `a` to a state of `b`.
/// It is only returned if it is a bijection between the full state sets.
/// As the traversal starts at the initial states, automata with unreachable states are never isomorphic.
pub fn isomorphism(a: &Automaton, b: &Automaton) -> Option<BTreeMap<StateId, StateId>> {
    if a.alphabet() != b.alphabet() || a.initial().len() != 1 || b.initial().len() != 1 {
        debug!("isomorphism preconditions violated");
        return None;
    }
    let qa = *a.initial().first()?;
    let qb = *b.initial().first()?;

    let mut a_to_b: BTreeMap<StateId, StateId> = BTreeMap::new();
    let mut b_to_a: BTreeMap<StateId, StateId> = BTreeMap::new();
    let mut queue = VecDeque::new();
    a_to_b.insert(qa, qb);
    b_to_a.insert(qb, qa);
    queue.push_back((qa, qb));

    while let Some((p, q)) = queue.pop_front() {
        if a.is_final(p) != b.is_final(q) {
            return None;
        }
        for &c in a.alphabet() {
            match (a.successor(p, c), b.successor(q, c)) {
                (None, None) => {}
                (Some(p2), Some(q2)) => match (a_to_b.get(&p2), b_to_a.get(&q2)) {
                    (None, None) => {
                        a_to_b.insert(p2, q2);
                        b_to_a.insert(q2, p2);
                        queue.push_back((p2, q2));
                    }
                    (Some(&q3), Some(&p3)) if q3 == q2 && p3 == p2 => {}
                    _ => return None,
                },
                _ => return None,
            }
        }
    }

    if a_to_b.len() == a.num_states() && b_to_a.len() == b.num_states() {
        Some(a_to_b)
    } else {
        None
    }
}

/// Returns true if the two deterministic automata are isomorphic.
/// See [`isomorphism`] for the exact conditions.
pub fn is_isomorphic(a: &Automaton, b: &Automaton) -> bool {
    isomorphism(a, b).is_some()
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::automata::det::tests::SmallNfa;
    use crate::automata::{determinize, minimize, reverse};

    fn single_step() -> Automaton {
        let mut a = Automaton::new();
        a.add_state(0);
        a.add_state(1);
        a.add_symbol('a');
        a.add_transition(0, 'a', 1);
        a.add_initial(0);
        a.add_final(1);
        a
    }

    #[test]
    fn isomorphic_to_itself() {
        let a = single_step();
        let mapping = isomorphism(&a, &a).unwrap();
        assert_eq!(mapping, BTreeMap::from([(0, 0), (1, 1)]));
    }

    #[test]
    fn successor_on_one_side_only() {
        // state 1 lacks an `a` successor in both, which is fine
        let a = single_step();
        let mut b = single_step();
        assert!(is_isomorphic(&a, &b));
        b.add_transition(1, 'a', 1);
        assert!(!is_isomorphic(&a, &b));
        assert!(!is_isomorphic(&b, &a));
    }

    #[test]
    fn unreachable_final_state_breaks_isomorphism() {
        let a = single_step();
        let mut b = single_step();
        b.add_state(2);
        b.add_final(2);
        assert!(!is_isomorphic(&a, &b));
        assert!(!is_isomorphic(&b, &a));
    }

    #[test]
    fn renamed_states_are_isomorphic() {
        let a = single_step();
        let mut b = Automaton::new();
        b.add_state(5);
        b.add_state(3);
        b.add_transition(5, 'a', 3);
        b.add_initial(5);
        b.add_final(3);
        assert_eq!(isomorphism(&a, &b), Some(BTreeMap::from([(0, 5), (1, 3)])));
    }

    #[test]
    fn different_alphabets() {
        let a = single_step();
        let mut b = single_step();
        b.add_symbol('b');
        assert!(!is_isomorphic(&a, &b));
    }

    #[test]
    fn finality_mismatch() {
        let a = single_step();
        let mut b = single_step();
        b.add_final(0);
        assert!(!is_isomorphic(&a, &b));
    }

    #[test]
    fn pairing_must_be_injective() {
        // a: 0 -a-> 1 -a-> 2, b: 0 -a-> 1 -a-> 1
        let mut a = Automaton::new();
        let mut b = Automaton::new();
        for q in 0..3 {
            a.add_state(q);
        }
        b.add_state(0);
        b.add_state(1);
        a.add_initial(0);
        b.add_initial(0);
        a.add_transition(0, 'a', 1);
        a.add_transition(1, 'a', 2);
        a.add_transition(2, 'a', 2);
        b.add_transition(0, 'a', 1);
        b.add_transition(1, 'a', 1);
        assert!(!is_isomorphic(&a, &b));
        assert!(!is_isomorphic(&b, &a));
    }

    #[test]
    fn multiple_initial_states() {
        let mut a = single_step();
        a.add_initial(1);
        assert!(!is_isomorphic(&a, &a));
    }

    #[quickcheck]
    fn isomorphism_is_symmetric(x: SmallNfa, y: SmallNfa) -> bool {
        let a = minimize(&determinize(&x.0));
        let b = minimize(&determinize(&y.0));
        is_isomorphic(&a, &b) == is_isomorphic(&b, &a)
    }

    #[quickcheck]
    fn brzozowski_matches_minimization(nfa: SmallNfa) -> bool {
        let min = minimize(&determinize(&nfa.0));
        let brz = determinize(&reverse(&determinize(&reverse(&nfa.0))));
        is_isomorphic(&brz, &min)
    }
}
