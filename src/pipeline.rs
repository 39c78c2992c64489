//! Compositions of the automata and regex operations.
//!
//! These are the operations exposed by the command line tool.
//! Each of them takes its input by reference and returns fresh results.

use log::{debug, info, warn};

use crate::automata::{
    automaton_to_regex, compile, determinize, eliminate_epsilon, minimize, regex_to_enfa, reverse,
    Automaton, CompileError,
};
use crate::re::{parse, prettify, ReBuilder};

/// Computes the minimal DFA of the automaton by subset construction followed by partition refinement.
pub fn minimal_dfa(a: &Automaton) -> Automaton {
    minimize(&determinize(a))
}

/// Computes the minimal DFA of the automaton with Brzozowski's algorithm.
///
/// The automaton is reversed and determinized twice.
/// The result is isomorphic to [`minimal_dfa`] of the same automaton.
pub fn brzozowski(a: &Automaton) -> Automaton {
    determinize(&reverse(&determinize(&reverse(a))))
}

/// Determinizes an automaton that is expected to already yield a minimal DFA.
///
/// If the automaton is co-deterministic, co-accessible and has exactly one final state,
/// the subset construction alone produces the minimal DFA.
/// The preconditions are checked and a warning is logged for each one that does not hold;
/// the automaton is determinized regardless.
pub fn determinize_co_deterministic(a: &Automaton) -> Automaton {
    if a.finals().len() != 1 {
        warn!(
            "automaton has {} final states, the result may not be minimal",
            a.finals().len()
        );
    } else if !reverse(a).is_det() {
        warn!("automaton is not co-deterministic, the result may not be minimal");
    }
    if !a.is_co_accessible() {
        warn!("automaton is not co-accessible, the result may not be minimal");
    }
    determinize(a)
}

/// Every automaton built while compiling a regular expression to its minimal DFA.
#[derive(Debug, Clone)]
pub struct RegexAutomata {
    /// The ε-NFA obtained by Thompson's construction.
    pub enfa: Automaton,
    /// The ε-NFA with ε-transitions removed.
    pub nfa: Automaton,
    /// The NFA determinized by subset construction.
    pub dfa: Automaton,
    /// The minimal DFA.
    pub min: Automaton,
}

/// Compiles the regular expression given as text to its minimal DFA, keeping every intermediate automaton.
pub fn regex_to_minimal_dfa(regex: &str) -> Result<RegexAutomata, CompileError> {
    let enfa = regex_to_enfa(regex)?;
    let nfa = eliminate_epsilon(&enfa);
    let dfa = determinize(&nfa);
    let min = minimize(&dfa);
    debug!(
        "'{}': ε-NFA {} states, NFA {} states, DFA {} states, minimal DFA {} states",
        regex,
        enfa.num_states(),
        nfa.num_states(),
        dfa.num_states(),
        min.num_states()
    );
    Ok(RegexAutomata {
        enfa,
        nfa,
        dfa,
        min,
    })
}

/// Rewrites the regular expression as the expression obtained from its minimal DFA.
///
/// Equivalent expressions yield isomorphic minimal DFAs.
pub fn standardize_regex(regex: &str) -> Result<String, CompileError> {
    let automata = regex_to_minimal_dfa(regex)?;
    Ok(automaton_to_regex(&automata.min))
}

/// Canonicalizes the regular expression through its minimal DFA.
///
/// The expression is parsed and prettified, compiled to an ε-NFA, and turned into a minimal DFA.
/// The DFA is converted back by state elimination and prettified once more.
/// Unlike [`standardize_regex`], malformed operators are skipped by the parser instead of causing an error.
/// Returns the empty string for the empty language and `#` for the language containing only the empty word.
pub fn minimize_regex(regex: &str) -> String {
    let mut builder = ReBuilder::default();
    let parsed = parse(regex, &mut builder);
    let pretty = prettify(&parsed, &mut builder);
    let enfa = compile(&pretty);
    let min = minimal_dfa(&eliminate_epsilon(&enfa));
    let minimized = automaton_to_regex(&min);
    info!("minimized '{}' to '{}'", regex, minimized);
    minimized
}

/// Describes the language of a regex produced by state elimination.
///
/// The empty string and `#` are spelled out, any other regex is returned as is.
pub fn describe_language(regex: &str) -> &str {
    match regex {
        "" => "the empty set (accepts no strings)",
        "#" => "{ε} (accepts only the empty string)",
        _ => regex,
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::automata::det::tests::{words, SmallNfa};
    use crate::automata::is_isomorphic;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn same_language(r1: &str, r2: &str) -> bool {
        match (regex_to_minimal_dfa(r1), regex_to_minimal_dfa(r2)) {
            (Ok(a1), Ok(a2)) => words(5).iter().all(|w| a1.min.accepts(w) == a2.min.accepts(w)),
            _ => false,
        }
    }

    #[test]
    fn minimize_duplicate_union() {
        init();
        assert_eq!(minimize_regex("a|a"), "a");
    }

    #[test]
    fn minimize_equivalent_regexes() {
        init();
        let m1 = minimize_regex("(a|b)*");
        let m2 = minimize_regex("a*(ba*)*");
        assert!(same_language(&m1, &m2), "{} vs {}", m1, m2);
        assert!(same_language(&m1, "(a|b)*"));
        let d1 = regex_to_minimal_dfa(&m1).unwrap().min;
        let d2 = regex_to_minimal_dfa(&m2).unwrap().min;
        assert!(is_isomorphic(&d1, &d2));
    }

    #[test]
    fn minimize_special_languages() {
        assert_eq!(minimize_regex(""), "");
        assert_eq!(minimize_regex("#"), "#");
        assert_eq!(minimize_regex("#*"), "#");
    }

    #[test]
    fn regex_to_minimal_dfa_stages() {
        init();
        let automata = regex_to_minimal_dfa("a(b|c)*").unwrap();
        assert!(automata.enfa.has_epsilon());
        assert!(!automata.nfa.has_epsilon());
        assert!(automata.dfa.is_det());
        assert!(automata.min.is_det());
        assert!(automata.min.num_states() <= automata.dfa.num_states());
        for w in ["a", "ab", "acbc"] {
            assert!(automata.min.accepts(w), "{}", w);
        }
        for w in ["", "b"] {
            assert!(!automata.min.accepts(w), "{}", w);
        }
    }

    #[test]
    fn regex_to_minimal_dfa_malformed() {
        assert!(regex_to_minimal_dfa("a|").is_err());
        assert!(standardize_regex("*").is_err());
    }

    #[test]
    fn standardize_equivalent_regexes() {
        let s1 = standardize_regex("a|ba|a").unwrap();
        let s2 = standardize_regex("(#|b)a").unwrap();
        assert!(same_language(&s1, &s2));
        assert!(same_language(&s1, "a|ba"));
    }

    #[test]
    fn standardize_reads_off_the_minimal_dfa() {
        init();
        for r in ["a|ba|a", "(a|b)*abb", "#", ""] {
            let Ok(automata) = regex_to_minimal_dfa(r) else {
                assert!(standardize_regex(r).is_err());
                continue;
            };
            assert_eq!(
                standardize_regex(r).unwrap(),
                automaton_to_regex(&automata.min),
                "{}",
                r
            );
        }
    }

    #[test]
    fn brzozowski_of_single_word() {
        let mut a = Automaton::new();
        for q in 0..3 {
            a.add_state(q);
        }
        a.add_initial(0);
        a.add_final(2);
        a.add_transition(0, 'a', 1);
        a.add_transition(0, 'a', 2);
        a.add_transition(1, 'b', 2);
        let b = brzozowski(&a);
        assert!(b.is_det());
        assert!(is_isomorphic(&b, &minimal_dfa(&a)));
    }

    #[test]
    fn co_deterministic_determinization() {
        init();
        // a single path is co-deterministic and co-accessible
        let mut a = Automaton::new();
        for q in 0..3 {
            a.add_state(q);
        }
        a.add_initial(0);
        a.add_final(2);
        a.add_transition(0, 'a', 1);
        a.add_transition(1, 'b', 2);
        let d = determinize_co_deterministic(&a);
        assert!(is_isomorphic(&d, &minimal_dfa(&a)));
    }

    #[test]
    fn describe_special_languages() {
        assert_eq!(describe_language(""), "the empty set (accepts no strings)");
        assert_eq!(describe_language("#"), "{ε} (accepts only the empty string)");
        assert_eq!(describe_language("a*"), "a*");
    }

    #[quickcheck]
    fn standardize_preserves_language(nfa: SmallNfa) -> TestResult {
        let regex = automaton_to_regex(&nfa.0);
        if regex.is_empty() {
            return TestResult::discard();
        }
        let Ok(standard) = standardize_regex(&regex) else {
            return TestResult::failed();
        };
        if standard.is_empty() {
            return TestResult::failed();
        }
        TestResult::from_bool(same_language(&regex, &standard))
    }
}
