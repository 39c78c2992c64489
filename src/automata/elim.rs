//! Conversion of automata into regular expressions by state elimination.
//!
//! The automaton is turned into a generalized automaton whose edges carry regular expressions as text.
//! Its states are then removed one at a time, rerouting every path through the removed state over a single, more complex edge,
//! until only a fresh entry and a fresh exit state remain. The label between them denotes the language of the automaton.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

use super::{det::DenseIds, Automaton, EPSILON};
use crate::re::{parse, prettify, ReBuilder};

/// Returns a regular expression denoting the language of the automaton.
///
/// The expression is obtained by [`eliminate_states`], parsed, and simplified with [`prettify`].
/// The empty language yields the empty string and the language containing only the empty word yields `#`.
pub fn automaton_to_regex(a: &Automaton) -> String {
    let raw = eliminate_states(a);
    let mut builder = ReBuilder::default();
    let re = parse(&raw, &mut builder);
    prettify(&re, &mut builder).to_string()
}

/// Computes a regular expression for the automaton by state elimination, without simplifying it.
///
/// A fresh entry state is linked to every initial state, and every final state is linked to a fresh exit state,
/// both with `#`. Parallel transitions are merged into a union.
/// The remaining states are then eliminated in order of the fewest rerouted edges:
/// the state minimizing `in·out + in + out` is removed first, where `in` and `out` count the current edges into and out of it, excluding self-loops.
/// Ties go to the smallest state.
/// State ids may be arbitrary, including `usize::MAX`; only their order matters.
///
/// Returns the empty string if there is no path from an initial to a final state.
pub fn eliminate_states(a: &Automaton) -> String {
    // The generalized automaton works on dense indices, leaving `n` and `n + 1` free for entry and exit.
    let dense = DenseIds::of(a);
    let (entry, exit) = (dense.len(), dense.len() + 1);
    let mut remaining: BTreeSet<usize> = (0..dense.len()).collect();

    let mut gnfa = Gnfa::default();
    for (from, symbol, to) in a.transitions() {
        if let (Some(i), Some(j)) = (dense.index(from), dense.index(to)) {
            gnfa.add(i, j, symbol.to_string());
        }
    }
    for i in a.initial().iter().filter_map(|&q| dense.index(q)) {
        gnfa.add(entry, i, EPSILON.to_string());
    }
    for i in a.finals().iter().filter_map(|&q| dense.index(q)) {
        gnfa.add(i, exit, EPSILON.to_string());
    }

    loop {
        let Some(k) = remaining.iter().copied().min_by_key(|&k| (gnfa.weight(k), k)) else {
            break;
        };
        trace!(
            "eliminating state {:?} (weight {})",
            dense.state(k),
            gnfa.weight(k)
        );
        gnfa.eliminate(k);
        remaining.remove(&k);
    }

    let regex = gnfa.edges.remove(&(entry, exit)).unwrap_or_default();
    debug!("state elimination yields regex of length {}", regex.len());
    regex
}

/// A generalized automaton over dense state indices with at most one edge between any two states.
#[derive(Debug, Default)]
struct Gnfa {
    edges: BTreeMap<(usize, usize), String>,
}

impl Gnfa {
    /// Adds an edge, merging it with an existing edge between the same states.
    fn add(&mut self, from: usize, to: usize, label: String) {
        let merged = match self.edges.remove(&(from, to)) {
            Some(old) => union(&old, &label),
            None => label,
        };
        self.edges.insert((from, to), merged);
    }

    /// The number of new edges created by eliminating `k`, plus its degree.
    fn weight(&self, k: usize) -> usize {
        let incoming = self.incoming(k).count();
        let outgoing = self.outgoing(k).count();
        incoming * outgoing + incoming + outgoing
    }

    fn incoming(&self, k: usize) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.edges
            .iter()
            .filter(move |((i, j), _)| *j == k && *i != k)
            .map(|((i, _), label)| (*i, label.as_str()))
    }

    fn outgoing(&self, k: usize) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.edges
            .range((k, usize::MIN)..=(k, usize::MAX))
            .filter(move |((_, j), _)| *j != k)
            .map(|((_, j), label)| (*j, label.as_str()))
    }

    /// Removes `k`, replacing every path `i -> k -> j` by an edge `i -> j`.
    fn eliminate(&mut self, k: usize) {
        let loop_ = star(self.edges.get(&(k, k)).map(String::as_str));
        let incoming: Vec<(usize, String)> = self
            .incoming(k)
            .map(|(i, label)| (i, concat(label, &loop_)))
            .collect();
        let outgoing: Vec<(usize, String)> = self
            .outgoing(k)
            .map(|(j, label)| (j, label.to_string()))
            .collect();
        for (i, r_ik) in &incoming {
            for (j, r_kj) in &outgoing {
                self.add(*i, *j, concat(r_ik, r_kj));
            }
        }
        self.edges.retain(|&(i, j), _| i != k && j != k);
    }
}

/// `r1|r2` with the operands in lexicographic order; equal operands collapse.
fn union(r1: &str, r2: &str) -> String {
    if r1 == r2 {
        return r1.to_string();
    }
    let (r1, r2) = if r1 > r2 { (r2, r1) } else { (r1, r2) };
    format!("({}|{})", r1, r2)
}

/// `r1r2`, with `#` as the identity.
fn concat(r1: &str, r2: &str) -> String {
    let eps = EPSILON.to_string();
    if r1 == eps {
        return r2.to_string();
    }
    if r2 == eps {
        return r1.to_string();
    }
    format!("{}{}", guard(r1), guard(r2))
}

/// Parenthesizes an expression with a top-level union.
fn guard(r: &str) -> String {
    if r.contains('|') && !r.starts_with('(') {
        format!("({})", r)
    } else {
        r.to_string()
    }
}

/// `r*`; the star of a missing edge or of `#` is `#`.
fn star(r: Option<&str>) -> String {
    let eps = EPSILON.to_string();
    match r {
        None => eps,
        Some(r) if r == eps => eps,
        Some(r) if r.chars().count() == 1 || is_group(r) => format!("{}*", r),
        Some(r) if is_starred(r) => r.to_string(),
        Some(r) => format!("({})*", r),
    }
}

/// Whether `r` is a single character or a group followed by a star.
fn is_starred(r: &str) -> bool {
    match r.strip_suffix('*') {
        Some(inner) => inner.chars().count() == 1 || is_group(inner),
        None => false,
    }
}

/// Whether `r` is entirely enclosed by one pair of matching parentheses.
fn is_group(r: &str) -> bool {
    if !r.starts_with('(') || !r.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    for (i, c) in r.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == r.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}
