use super::*;
use std::collections::HashMap;

/// A builder for regular expressions that constructs unique regex instances.
/// It is the only way to create regex instances.
///
/// The builder does not simplify: every call creates exactly the requested node.
/// Structurally identical nodes are interned and shared.
#[derive(Debug)]
pub struct ReBuilder {
    registry: Registry,

    /* base expressions */
    re_empty: Regex,
    re_epsilon: Regex,
}

impl Default for ReBuilder {
    /// Creates a new `ReBuilder` with an empty internal registry.
    fn default() -> Self {
        let mut registry = Registry::new();
        let re_empty = registry.intern(ReOp::EmptySet);
        let re_epsilon = registry.intern(ReOp::Epsilon);

        Self {
            registry,
            re_empty,
            re_epsilon,
        }
    }
}

impl ReBuilder {
    fn intern(&mut self, regex: ReOp) -> Regex {
        self.registry.intern(regex)
    }

    /// Checks if the builder manages the given regex.
    /// Returns true if the regex was constructed by this builder.
    pub fn manages(&self, regex: &Regex) -> bool {
        // Ids are only unique per builder, so the stored node must be the same allocation
        match self.registry.registry.get(regex.op()) {
            Some(r) => Rc::ptr_eq(r, regex),
            None => false,
        }
    }

    /// Returns the regular expression denoting the empty language.
    pub fn empty_set(&self) -> Regex {
        self.re_empty.clone()
    }

    /// Returns the regular expression denoting the empty word.
    pub fn epsilon(&self) -> Regex {
        self.re_epsilon.clone()
    }

    /// Returns the regular expression matching the single character `c`.
    pub fn literal(&mut self, c: char) -> Regex {
        self.intern(ReOp::Literal(c))
    }

    /// Returns the concatenation of the given expressions, in order.
    pub fn concat(&mut self, rs: SmallVec<[Regex; 2]>) -> Regex {
        self.intern(ReOp::Concat(rs))
    }

    /// Returns the union of the given expressions.
    pub fn union(&mut self, rs: SmallVec<[Regex; 2]>) -> Regex {
        self.intern(ReOp::Union(rs))
    }

    /// Returns the Kleene star of the given expression.
    pub fn star(&mut self, r: Regex) -> Regex {
        self.intern(ReOp::Star(r))
    }
}

/// Interns regular expressions.
#[derive(Debug)]
struct Registry {
    /// Stores the unique instances of `Regex`.
    /// The key is the operation itself, and the value is a shared handle to the node.
    registry: HashMap<ReOp, Regex>,
    /// The id to assign to the next regex.
    next_id: usize,
}

impl Registry {
    fn new() -> Self {
        Registry {
            registry: HashMap::new(),
            next_id: 0,
        }
    }

    /// Interns an operation, returning the stored node if an identical one exists.
    fn intern(&mut self, op: ReOp) -> Regex {
        if let Some(existing) = self.registry.get(&op) {
            existing.clone()
        } else {
            let re = Rc::new(ReNode::new(self.next_id, op.clone()));
            self.next_id += 1;
            self.registry.insert(op, re.clone());
            re
        }
    }
}
