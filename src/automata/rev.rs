//! Reversal of finite automata.

use super::Automaton;

/// Returns the reverse of the automaton.
///
/// Every transition `(p, a, q)` becomes `(q, a, p)`, and the initial and final states swap roles.
/// States and alphabet are copied unchanged, so reversing twice yields the original automaton.
/// The reversed automaton accepts exactly the reversals of the words accepted by the input.
pub fn reverse(a: &Automaton) -> Automaton {
    let mut rev = Automaton::new();
    for &q in a.states() {
        rev.add_state(q);
    }
    for &c in a.alphabet() {
        rev.add_symbol(c);
    }
    for &q in a.finals() {
        rev.add_initial(q);
    }
    for &q in a.initial() {
        rev.add_final(q);
    }
    for (from, symbol, to) in a.transitions() {
        rev.add_transition(to, symbol, from);
    }
    rev
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::automata::det::tests::{words, SmallNfa};

    #[test]
    fn reverse_swaps_roles() {
        let mut a = Automaton::new();
        a.add_state(0);
        a.add_state(1);
        a.add_initial(0);
        a.add_final(1);
        a.add_transition(0, 'a', 1);
        a.add_transition(1, '#', 1);

        let r = reverse(&a);
        assert!(r.is_initial(1));
        assert!(r.is_final(0));
        assert_eq!(r.successor(1, 'a'), Some(0));
        assert!(r.has_epsilon());
    }

    #[quickcheck]
    fn reverse_is_involution(nfa: SmallNfa) -> bool {
        reverse(&reverse(&nfa.0)) == nfa.0
    }

    #[quickcheck]
    fn reverse_accepts_reversed_words(nfa: SmallNfa) -> bool {
        let r = reverse(&nfa.0);
        words(4).iter().all(|w| {
            let rw: String = w.chars().rev().collect();
            nfa.0.accepts(w) == r.accepts(&rw)
        })
    }
}
