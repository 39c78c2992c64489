use log::{debug, warn};
use thiserror::Error;

use crate::re::parse::{shunt, tokenize, Reducer};
use crate::re::{MissingOperand, Operator, ReOp, Regex, Token};

use super::{Automaton, StateId, Symbol};

/// Error returned when a regular expression cannot be compiled.
/// Both variants carry the automaton built up to the point of failure.
#[derive(Debug, Error)]
pub enum CompileError {
    /// An operator lacked operands.
    #[error("{source}")]
    Malformed {
        source: MissingOperand,
        partial: Box<Automaton>,
    },
    /// The expression contains no operand.
    #[error("regex contains no operand")]
    Empty { partial: Box<Automaton> },
}

impl CompileError {
    /// Returns the automaton built before the error occurred.
    pub fn partial(&self) -> &Automaton {
        match self {
            CompileError::Malformed { partial, .. } | CompileError::Empty { partial } => partial.as_ref(),
        }
    }
}

/// Compiles the regular expression given as text into an ε-NFA.
///
/// The text is tokenized and evaluated with the same operator precedence as [`crate::re::parse`],
/// but every operand and operator directly builds a piece of the automaton following Thompson's construction.
/// The result has a single initial and a single final state, and epsilon transitions labeled `#`.
/// States are numbered from 0 in creation order.
///
/// Unlike the parser, compilation stops at the first operator that lacks operands.
pub fn regex_to_enfa(input: &str) -> Result<Automaton, CompileError> {
    let tokens = tokenize(input);
    let mut thompson = Thompson::default();
    let fragments = match shunt(&tokens, &mut thompson) {
        Ok(fragments) => fragments,
        Err(source) => {
            warn!("{}", source);
            return Err(CompileError::Malformed {
                source,
                partial: Box::new(thompson.nfa),
            });
        }
    };
    match fragments.last() {
        Some(&fragment) => Ok(thompson.finish(fragment)),
        None => Err(CompileError::Empty {
            partial: Box::new(thompson.nfa),
        }),
    }
}

/// Compiles the regex into an ε-NFA using Thompson's construction.
/// The ε-NFA accepts exactly the language of the regex.
///
/// Unions and concatenations with more than two children are compiled as a single n-ary fragment.
/// The empty set compiles to an initial and a final state without a path between them.
pub fn compile(re: &Regex) -> Automaton {
    let mut thompson = Thompson::default();
    let fragment = thompson.regex(re);
    thompson.finish(fragment)
}

/// A partial automaton with a single entry and a single exit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fragment {
    start: StateId,
    end: StateId,
}

/// Builds a single ε-NFA, one fragment at a time.
/// State ids are assigned consecutively, starting at 0.
#[derive(Debug, Default)]
struct Thompson {
    nfa: Automaton,
}

impl Thompson {
    /// `s1 --symbol--> s2`
    fn basic(&mut self, symbol: Symbol) -> Fragment {
        let start = self.nfa.new_state();
        let end = self.nfa.new_state();
        self.nfa.add_transition(start, symbol, end);
        Fragment { start, end }
    }

    /// Two states without a path between them.
    fn empty(&mut self) -> Fragment {
        let start = self.nfa.new_state();
        let end = self.nfa.new_state();
        Fragment { start, end }
    }

    fn concat(&mut self, f1: Fragment, f2: Fragment) -> Fragment {
        self.nfa.add_transition(f1.end, Symbol::Epsilon, f2.start);
        Fragment {
            start: f1.start,
            end: f2.end,
        }
    }

    fn union(&mut self, fs: &[Fragment]) -> Fragment {
        let start = self.nfa.new_state();
        let end = self.nfa.new_state();
        for f in fs {
            self.nfa.add_transition(start, Symbol::Epsilon, f.start);
        }
        for f in fs {
            self.nfa.add_transition(f.end, Symbol::Epsilon, end);
        }
        Fragment { start, end }
    }

    fn star(&mut self, f: Fragment) -> Fragment {
        let start = self.nfa.new_state();
        let end = self.nfa.new_state();
        self.nfa.add_transition(start, Symbol::Epsilon, f.start);
        self.nfa.add_transition(f.end, Symbol::Epsilon, end);
        self.nfa.add_transition(start, Symbol::Epsilon, end);
        self.nfa.add_transition(f.end, Symbol::Epsilon, f.start);
        Fragment { start, end }
    }

    fn regex(&mut self, re: &Regex) -> Fragment {
        match re.op() {
            ReOp::EmptySet => self.empty(),
            ReOp::Epsilon => self.basic(Symbol::Epsilon),
            ReOp::Literal(c) => self.basic(Symbol::Char(*c)),
            ReOp::Concat(rs) => {
                let mut fragments = rs.iter().map(|r| self.regex(r)).collect::<Vec<_>>().into_iter();
                match fragments.next() {
                    Some(first) => fragments.fold(first, |acc, f| self.concat(acc, f)),
                    None => self.basic(Symbol::Epsilon),
                }
            }
            ReOp::Union(rs) => {
                let fragments = rs.iter().map(|r| self.regex(r)).collect::<Vec<_>>();
                self.union(&fragments)
            }
            ReOp::Star(r) => {
                let f = self.regex(r);
                self.star(f)
            }
        }
    }

    /// Makes the fragment's entry and exit the initial and final state.
    fn finish(mut self, fragment: Fragment) -> Automaton {
        self.nfa.add_initial(fragment.start);
        self.nfa.add_final(fragment.end);
        debug!(
            "compiled ε-NFA with {} states and {} transitions",
            self.nfa.num_states(),
            self.nfa.num_transitions()
        );
        self.nfa
    }
}

impl Reducer for Thompson {
    type Value = Fragment;
    type Error = MissingOperand;

    fn operand(&mut self, token: Token) -> Fragment {
        match token {
            Token::Literal(c) => self.basic(Symbol::Char(c)),
            _ => self.basic(Symbol::Epsilon),
        }
    }

    fn apply(&mut self, op: Operator, values: &mut Vec<Fragment>) -> Result<(), MissingOperand> {
        let missing = MissingOperand {
            op,
            found: values.len(),
        };
        let fragment = match op {
            Operator::Star => {
                let f = values.pop().ok_or(missing)?;
                self.star(f)
            }
            Operator::Concat | Operator::Union => {
                if values.len() < 2 {
                    return Err(missing);
                }
                let (Some(f2), Some(f1)) = (values.pop(), values.pop()) else {
                    return Err(missing);
                };
                if op == Operator::Concat {
                    self.concat(f1, f2)
                } else {
                    self.union(&[f1, f2])
                }
            }
        };
        values.push(fragment);
        Ok(())
    }
}
