//! Regular Expressions
//!
//! The classical regular expression algebra over single characters: the empty set, the empty word, literals, union, concatenation and Kleene star.
//! Expressions are created with a [`ReBuilder`], parsed from text with [`parse`], and simplified with the functions in [`norm`].

mod build;
pub mod norm;
pub mod parse;

use smallvec::SmallVec;

use itertools::Itertools;

use std::cell::RefCell;

use std::hash::Hash;
use std::{fmt::Display, rc::Rc};

pub use build::ReBuilder;
pub use norm::{bounded_distribute, normalize, prettify};
pub use parse::{parse, tokenize, MissingOperand, Operator, Token};

pub type ReId = usize;

type LazyProp<T> = RefCell<Option<T>>;

/// A reference-counted regular expression.
///
/// Every `Regex` is a shared pointer to an immutable node.
/// Nodes are interned by the [`ReBuilder`] that created them, so structurally identical sub-expressions are stored once and compare equal in O(1).
/// To construct a new regex, use [`ReBuilder`].
pub type Regex = Rc<ReNode>;

/// A node in the abstract syntax tree of a regular expression.
///
/// Every `ReNode` has an identifier assigned by its [`ReBuilder`], which is used for equality and hashing.
/// The canonical key and the cost of a node are computed on first use and cached.
#[derive(Debug, Clone)]
pub struct ReNode {
    /// Unique identifier for the regular expression.
    id: ReId,
    /// The operation defining the regex structure.
    op: ReOp,

    /// The canonical structural key.
    key: LazyProp<Rc<str>>,
    /// The size measure minimized by simplification.
    cost: LazyProp<usize>,
}

impl PartialEq for ReNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for ReNode {}
impl Hash for ReNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}
impl PartialOrd for ReNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ReNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl ReNode {
    fn new(id: ReId, op: ReOp) -> Self {
        Self {
            id,
            op,
            key: RefCell::new(None),
            cost: RefCell::new(None),
        }
    }

    pub fn id(&self) -> ReId {
        self.id
    }

    pub fn op(&self) -> &ReOp {
        &self.op
    }

    /// Returns the canonical key of the expression.
    ///
    /// The key is `<kind>:` followed by a payload, where kind is the index of the operation
    /// (empty set 0, empty word 1, literal 2, union 3, concatenation 4, star 5).
    /// The payload is `φ` for the empty set, `#` for the empty word, the character for a literal,
    /// the key of every child followed by `,` for union and concatenation, and the key of the child for star.
    /// Two expressions have the same key if and only if they have the same structure.
    pub fn key(&self) -> Rc<str> {
        self.key
            .borrow_mut()
            .get_or_insert_with(|| self.op.key().into())
            .clone()
    }

    /// Returns the cost of the expression.
    ///
    /// Atoms cost 1, a star costs one more than its child, a concatenation costs the sum of its children
    /// plus one per adjacent pair, and a union costs the sum of its children plus 3.
    pub fn cost(&self) -> usize {
        *self
            .cost
            .borrow_mut()
            .get_or_insert_with(|| self.op.cost())
    }

    /// Returns true if the expression is a literal or the empty word.
    pub fn is_atomic(&self) -> bool {
        matches!(self.op, ReOp::Literal(_) | ReOp::Epsilon)
    }
}

impl Display for ReNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.op)
    }
}

/// The operations that define a regular expression.
///
/// Children are shared [`Regex`] pointers, so identical sub-expressions are stored once.
/// Union and concatenation are n-ary; the builder does not flatten or simplify them, see [`norm::normalize`] for that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReOp {
    /// The empty language.
    EmptySet,
    /// The language containing only the empty word.
    Epsilon,
    /// A single character.
    Literal(char),
    /// The union of the children.
    Union(SmallVec<[Regex; 2]>),
    /// The concatenation of the children, in order.
    Concat(SmallVec<[Regex; 2]>),
    /// The Kleene star of the child.
    Star(Regex),
}

impl ReOp {
    /// The index of the operation kind as used in keys.
    fn kind(&self) -> u8 {
        match self {
            ReOp::EmptySet => 0,
            ReOp::Epsilon => 1,
            ReOp::Literal(_) => 2,
            ReOp::Union(_) => 3,
            ReOp::Concat(_) => 4,
            ReOp::Star(_) => 5,
        }
    }

    fn key(&self) -> String {
        let payload = match self {
            ReOp::EmptySet => "φ".to_string(),
            ReOp::Epsilon => "#".to_string(),
            ReOp::Literal(c) => c.to_string(),
            ReOp::Union(rs) | ReOp::Concat(rs) => rs.iter().map(|r| format!("{},", r.key())).join(""),
            ReOp::Star(r) => r.key().to_string(),
        };
        format!("{}:{}", self.kind(), payload)
    }

    fn cost(&self) -> usize {
        match self {
            ReOp::EmptySet | ReOp::Epsilon | ReOp::Literal(_) => 1,
            ReOp::Star(r) => 1 + r.cost(),
            ReOp::Concat(rs) => {
                rs.iter().map(|r| r.cost()).sum::<usize>() + rs.len().saturating_sub(1)
            }
            ReOp::Union(rs) => rs.iter().map(|r| r.cost()).sum::<usize>() + 3,
        }
    }
}

/// Renders the expression in the syntax accepted by [`parse`].
///
/// The empty set renders as the empty string and the empty word as `#`.
/// Unions inside concatenations are parenthesized, and a star is written `r*` for atomic `r` and `(r)*` otherwise.
impl Display for ReOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReOp::EmptySet => Ok(()),
            ReOp::Epsilon => write!(f, "#"),
            ReOp::Literal(c) => write!(f, "{}", c),
            ReOp::Union(rs) => write!(f, "{}", rs.iter().join("|")),
            ReOp::Concat(rs) => {
                for r in rs {
                    if matches!(r.op(), ReOp::Union(_)) {
                        write!(f, "({})", r)?;
                    } else {
                        write!(f, "{}", r)?;
                    }
                }
                Ok(())
            }
            ReOp::Star(r) => {
                if r.is_atomic() {
                    write!(f, "{}*", r)
                } else {
                    write!(f, "({})*", r)
                }
            }
        }
    }
}
