//! Finite automata over single-character alphabets.
//!
//! An [`Automaton`] is the classical five-tuple of states, alphabet, transition relation, initial states and final states.
//! The same type represents ε-NFAs, NFAs and DFAs; the algorithms in the submodules state which shape they expect and which one they produce.
//! Every algorithm returns a fresh automaton with its own, densely numbered state ids and never mutates its input.

pub mod det;
mod dot;
pub mod elim;
pub mod eps;
pub mod io;
pub mod iso;
pub mod min;
pub mod rev;

mod compile;

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::Display,
};

use thiserror::Error;

extern crate dot as dotlib;

pub use compile::{compile, regex_to_enfa, CompileError};
pub use det::determinize;
pub use self::dot::isomorphism_dot;
pub use elim::{automaton_to_regex, eliminate_states};
pub use eps::eliminate_epsilon;
pub use io::FormatError;
pub use iso::{is_isomorphic, isomorphism};
pub use min::minimize;
pub use rev::reverse;

/// Every state in an automaton is identified by a non-negative integer.
pub type StateId = usize;

/// The character used to denote the empty word in every textual form.
pub const EPSILON: char = '#';

/// The label of a transition.
/// Either a character of the alphabet or the empty word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A transition that consumes the given character.
    Char(char),
    /// A transition that is taken without consuming any input.
    Epsilon,
}

impl Symbol {
    /// Returns true if the symbol is the empty word.
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }

    /// Returns the character consumed by the symbol, if any.
    pub fn as_char(&self) -> Option<char> {
        match self {
            Symbol::Char(c) => Some(*c),
            Symbol::Epsilon => None,
        }
    }
}

impl From<char> for Symbol {
    /// Converts a character into a symbol.
    /// The character [`EPSILON`] denotes the empty word.
    fn from(c: char) -> Self {
        if c == EPSILON {
            Symbol::Epsilon
        } else {
            Symbol::Char(c)
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Char(c) => write!(f, "{}", c),
            Symbol::Epsilon => write!(f, "{}", EPSILON),
        }
    }
}

/// Error returned when the automaton references a state that is not part of its state set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("State not found: {0}")]
pub struct StateNotFound(pub StateId);

/// A (possibly nondeterministic) finite automaton with ε-transitions.
///
/// The mutators do not check that referenced states exist.
/// Use [`Automaton::check_consistency`] to verify that an automaton built from untrusted input is well-formed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Automaton {
    states: BTreeSet<StateId>,
    alphabet: BTreeSet<char>,
    initial: BTreeSet<StateId>,
    finals: BTreeSet<StateId>,
    transitions: BTreeMap<(StateId, Symbol), BTreeSet<StateId>>,
}

impl Automaton {
    /// Creates a new automaton with no states and an empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given state to the automaton.
    pub fn add_state(&mut self, state: StateId) {
        self.states.insert(state);
    }

    /// Adds a new state and returns its id.
    /// The id is one larger than the largest id currently in use.
    pub fn new_state(&mut self) -> StateId {
        let id = self.states.last().map_or(0, |q| q + 1);
        self.states.insert(id);
        id
    }

    /// Marks the state as initial.
    pub fn add_initial(&mut self, state: StateId) {
        self.initial.insert(state);
    }

    /// Marks the state as final.
    pub fn add_final(&mut self, state: StateId) {
        self.finals.insert(state);
    }

    /// Adds a character to the alphabet.
    /// The epsilon character is never part of the alphabet and is ignored.
    pub fn add_symbol(&mut self, c: char) {
        if c != EPSILON {
            self.alphabet.insert(c);
        }
    }

    /// Adds a transition from `from` to `to` labeled with `symbol`.
    /// A character label is also added to the alphabet.
    pub fn add_transition(&mut self, from: StateId, symbol: impl Into<Symbol>, to: StateId) {
        let symbol = symbol.into();
        if let Symbol::Char(c) = symbol {
            self.alphabet.insert(c);
        }
        self.transitions.entry((from, symbol)).or_default().insert(to);
    }

    /// Returns the set of states.
    pub fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }

    /// Returns the alphabet.
    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    /// Returns the set of initial states.
    pub fn initial(&self) -> &BTreeSet<StateId> {
        &self.initial
    }

    /// Returns the set of final states.
    pub fn finals(&self) -> &BTreeSet<StateId> {
        &self.finals
    }

    pub fn is_initial(&self, state: StateId) -> bool {
        self.initial.contains(&state)
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains(&state)
    }

    /// Returns an iterator over all transitions as `(from, symbol, to)` triples.
    /// The triples are ordered by source, then symbol, then target.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, Symbol, StateId)> + '_ {
        self.transitions
            .iter()
            .flat_map(|(&(from, symbol), targets)| targets.iter().map(move |&to| (from, symbol, to)))
    }

    /// Returns the states reachable from `from` with a single transition labeled `symbol`.
    pub fn targets(&self, from: StateId, symbol: Symbol) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .get(&(from, symbol))
            .into_iter()
            .flat_map(|targets| targets.iter().copied())
    }

    /// Returns the successor of `from` on the character `c`.
    /// For nondeterministic automata, this is the smallest of the targets.
    pub fn successor(&self, from: StateId, c: char) -> Option<StateId> {
        self.targets(from, Symbol::Char(c)).next()
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.values().map(|ts| ts.len()).sum()
    }

    /// Returns true if the automaton has at least one ε-transition.
    pub fn has_epsilon(&self) -> bool {
        self.transitions
            .iter()
            .any(|((_, symbol), targets)| symbol.is_epsilon() && !targets.is_empty())
    }

    /// Returns true if the automaton is deterministic.
    /// That is, it has exactly one initial state, no ε-transitions, and at most one target for every state and character.
    pub fn is_det(&self) -> bool {
        self.initial.len() == 1
            && !self.has_epsilon()
            && self.transitions.values().all(|targets| targets.len() <= 1)
    }

    /// Returns true if every state has a transition on every character of the alphabet.
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(|&q| {
            self.alphabet
                .iter()
                .all(|&c| self.targets(q, Symbol::Char(c)).next().is_some())
        })
    }

    /// Returns true if a final state is reachable from every state.
    pub fn is_co_accessible(&self) -> bool {
        let mut preds: BTreeMap<StateId, Vec<StateId>> = BTreeMap::new();
        for (from, _, to) in self.transitions() {
            preds.entry(to).or_default().push(from);
        }
        let mut seen: BTreeSet<StateId> = self.finals.clone();
        let mut queue: VecDeque<StateId> = self.finals.iter().copied().collect();
        while let Some(q) = queue.pop_front() {
            for &p in preds.get(&q).into_iter().flatten() {
                if seen.insert(p) {
                    queue.push_back(p);
                }
            }
        }
        self.states.iter().all(|q| seen.contains(q))
    }

    /// Returns the set of states reachable from `state` using only ε-transitions, including `state` itself.
    pub fn epsilon_closure(&self, state: StateId) -> BTreeSet<StateId> {
        self.epsilon_closure_of(std::iter::once(state))
    }

    /// Returns the union of the ε-closures of the given states.
    pub fn epsilon_closure_of(&self, states: impl IntoIterator<Item = StateId>) -> BTreeSet<StateId> {
        let mut closure = BTreeSet::new();
        let mut queue = VecDeque::new();
        for q in states {
            if closure.insert(q) {
                queue.push_back(q);
            }
        }
        while let Some(q) = queue.pop_front() {
            for p in self.targets(q, Symbol::Epsilon) {
                if closure.insert(p) {
                    queue.push_back(p);
                }
            }
        }
        closure
    }

    /// Returns the set of states that can be reached from an initial state by consuming the given word.
    pub fn run(&self, word: &str) -> BTreeSet<StateId> {
        let mut current = self.epsilon_closure_of(self.initial.iter().copied());
        for c in word.chars() {
            let next = current
                .iter()
                .flat_map(|&q| self.targets(q, Symbol::Char(c)))
                .collect::<Vec<_>>();
            current = self.epsilon_closure_of(next);
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Returns if the automaton accepts the given word.
    pub fn accepts(&self, word: &str) -> bool {
        let reached = self.run(word);
        !reached.is_disjoint(&self.finals)
    }

    /// Checks that every state referenced by the initial set, the final set, or a transition is a state of the automaton.
    /// Returns the first dangling state otherwise.
    pub fn check_consistency(&self) -> Result<(), StateNotFound> {
        let referenced = self
            .initial
            .iter()
            .chain(self.finals.iter())
            .copied()
            .chain(self.transitions().flat_map(|(from, _, to)| [from, to]));
        for q in referenced {
            if !self.states.contains(&q) {
                return Err(StateNotFound(q));
            }
        }
        Ok(())
    }

    /// Returns the DOT representation of the automaton.
    /// The DOT representation can be used to visualize the automaton using Graphviz.
    pub fn dot(&self) -> std::io::Result<String> {
        let mut buf = Vec::new();
        dotlib::render(&self::dot::AutomatonGraph(self), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    /// Accepts `a(b|c)*` without ε-transitions.
    fn abc_star() -> Automaton {
        let mut a = Automaton::new();
        let q0 = a.new_state();
        let q1 = a.new_state();
        a.add_initial(q0);
        a.add_final(q1);
        a.add_transition(q0, 'a', q1);
        a.add_transition(q1, 'b', q1);
        a.add_transition(q1, 'c', q1);
        a
    }

    #[test]
    fn new_state_is_dense() {
        let mut a = Automaton::new();
        assert_eq!(a.new_state(), 0);
        assert_eq!(a.new_state(), 1);
        a.add_state(7);
        assert_eq!(a.new_state(), 8);
        assert_eq!(a.num_states(), 4);
    }

    #[test]
    fn epsilon_is_not_in_alphabet() {
        let mut a = Automaton::new();
        a.add_transition(0, '#', 1);
        a.add_transition(1, 'x', 2);
        a.add_symbol('#');
        assert_eq!(a.alphabet().iter().copied().collect::<Vec<_>>(), vec!['x']);
        assert!(a.has_epsilon());
    }

    #[test]
    fn symbol_display() {
        assert_eq!(Symbol::from('#'), Symbol::Epsilon);
        assert_eq!(Symbol::Epsilon.to_string(), "#");
        assert_eq!(Symbol::from('z').to_string(), "z");
        assert_eq!(Symbol::Char('z').as_char(), Some('z'));
    }

    #[test]
    fn accepts_words() {
        let a = abc_star();
        assert!(a.accepts("a"));
        assert!(a.accepts("ab"));
        assert!(a.accepts("acbc"));
        assert!(!a.accepts(""));
        assert!(!a.accepts("b"));
        assert!(!a.accepts("ad"));
    }

    #[test]
    fn run_follows_epsilon() {
        let mut a = Automaton::new();
        a.add_initial(0);
        a.add_final(2);
        a.add_transition(0, '#', 1);
        a.add_transition(1, 'a', 2);
        a.add_transition(2, '#', 0);
        assert_eq!(a.run(""), BTreeSet::from([0, 1]));
        assert!(a.accepts("a"));
        assert!(a.accepts("aaa"));
        assert!(!a.accepts(""));
    }

    #[test]
    fn epsilon_closure_transitive() {
        let mut a = Automaton::new();
        a.add_transition(0, '#', 1);
        a.add_transition(1, '#', 2);
        a.add_transition(2, 'a', 3);
        a.add_transition(2, '#', 0);
        assert_eq!(a.epsilon_closure(0), BTreeSet::from([0, 1, 2]));
        assert_eq!(a.epsilon_closure(3), BTreeSet::from([3]));
        assert_eq!(a.epsilon_closure_of([3, 1]), BTreeSet::from([0, 1, 2, 3]));
    }

    #[test]
    fn determinism() {
        let mut a = abc_star();
        assert!(a.is_det());
        assert!(!a.is_complete());
        a.add_transition(0, 'a', 0);
        assert!(!a.is_det());
    }

    #[test]
    fn co_accessibility() {
        let mut a = abc_star();
        assert!(a.is_co_accessible());
        a.add_transition(0, 'b', 2);
        a.add_state(2);
        assert!(!a.is_co_accessible());
    }

    #[test]
    fn consistency() {
        let mut a = abc_star();
        for q in 0..2 {
            a.add_state(q);
        }
        assert_eq!(a.check_consistency(), Ok(()));
        a.add_final(5);
        assert_eq!(a.check_consistency(), Err(StateNotFound(5)));
    }

    #[test]
    fn transitions_are_sorted() {
        let a = abc_star();
        let ts: Vec<_> = a.transitions().collect();
        assert_eq!(
            ts,
            vec![
                (0, Symbol::Char('a'), 1),
                (1, Symbol::Char('b'), 1),
                (1, Symbol::Char('c'), 1)
            ]
        );
        assert_eq!(a.num_transitions(), 3);
        assert_eq!(a.successor(0, 'a'), Some(1));
        assert_eq!(a.successor(0, 'b'), None);
    }

    #[test]
    fn dot_lists_states() {
        let a = abc_star();
        let dot = a.dot().unwrap();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("q0"));
        assert!(dot.contains("doublecircle"));
    }
}
