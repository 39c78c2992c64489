//! Parsing of regular expressions from text.
//!
//! The syntax consists of alphanumeric ASCII literals, `#` for the empty word, `(` and `)` for grouping,
//! postfix `*`, infix `|`, and optional explicit concatenation `.`. Concatenation is implied between adjacent operands.
//! Any other character is ignored.
//!
//! Operators are resolved by a shunting-yard driver ([`shunt`]) that is generic over a [`Reducer`],
//! so the same precedence handling builds regex ASTs here and ε-NFAs in the automata module.

use std::fmt::Display;

use log::warn;
use smallvec::{smallvec, SmallVec};
use thiserror::Error;

use super::{ReBuilder, ReOp, Regex};

/// A regular expression operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Postfix Kleene star.
    Star,
    /// Infix concatenation.
    Concat,
    /// Infix union.
    Union,
}

impl Operator {
    /// The binding strength of the operator. Higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Star => 3,
            Operator::Concat => 2,
            Operator::Union => 1,
        }
    }

    /// The number of operands the operator consumes.
    pub fn arity(&self) -> usize {
        match self {
            Operator::Star => 1,
            Operator::Concat | Operator::Union => 2,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Star => write!(f, "*"),
            Operator::Concat => write!(f, "."),
            Operator::Union => write!(f, "|"),
        }
    }
}

/// A lexical token of a regular expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// A single character.
    Literal(char),
    /// The empty word, written `#`.
    Epsilon,
    Open,
    Close,
    Op(Operator),
}

impl Token {
    /// Whether a concatenation is implied if this token is followed by an operand or group.
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            Token::Literal(_) | Token::Epsilon | Token::Close | Token::Op(Operator::Star)
        )
    }

    /// Whether a concatenation is implied if this token follows an operand.
    fn starts_operand(&self) -> bool {
        matches!(self, Token::Literal(_) | Token::Epsilon | Token::Open)
    }
}

/// Splits the input into tokens and makes implicit concatenations explicit.
///
/// Characters that are not part of the syntax are skipped before concatenations are inserted,
/// so `a b` is read as `ab`.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::with_capacity(input.len() * 2);
    for c in input.chars() {
        let token = match c {
            '#' => Token::Epsilon,
            '(' => Token::Open,
            ')' => Token::Close,
            '*' => Token::Op(Operator::Star),
            '|' => Token::Op(Operator::Union),
            '.' => Token::Op(Operator::Concat),
            c if c.is_ascii_alphanumeric() => Token::Literal(c),
            _ => continue,
        };
        if let Some(prev) = tokens.last() {
            if prev.ends_operand() && token.starts_operand() {
                tokens.push(Token::Op(Operator::Concat));
            }
        }
        tokens.push(token);
    }
    tokens
}

/// Error raised when an operator is applied without enough operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("malformed regex: operator '{op}' needs {} operand(s), found {found}", .op.arity())]
pub struct MissingOperand {
    pub op: Operator,
    pub found: usize,
}

/// Consumer of the operands and operators produced by [`shunt`].
pub trait Reducer {
    /// The values on the operand stack.
    type Value;
    /// The error returned when an operator cannot be applied.
    type Error;

    /// Turns a literal or epsilon token into a value.
    fn operand(&mut self, token: Token) -> Self::Value;

    /// Applies `op` to the topmost values of the stack, replacing them with the result.
    fn apply(&mut self, op: Operator, values: &mut Vec<Self::Value>) -> Result<(), Self::Error>;
}

/// Evaluates the token stream with the shunting-yard algorithm.
///
/// Operators are left-associative and bind by [`Operator::precedence`].
/// Unbalanced parentheses are tolerated: a `)` without `(` closes nothing, and unclosed `(` are dropped at the end.
/// Returns the value stack after all operators have been applied.
pub fn shunt<R: Reducer>(tokens: &[Token], reducer: &mut R) -> Result<Vec<R::Value>, R::Error> {
    // `None` marks an open parenthesis
    let mut ops: Vec<Option<Operator>> = Vec::new();
    let mut values: Vec<R::Value> = Vec::new();

    for &token in tokens {
        match token {
            Token::Literal(_) | Token::Epsilon => values.push(reducer.operand(token)),
            Token::Open => ops.push(None),
            Token::Close => {
                while let Some(Some(op)) = ops.last().copied() {
                    ops.pop();
                    reducer.apply(op, &mut values)?;
                }
                // The open parenthesis, if any
                ops.pop();
            }
            Token::Op(op) => {
                while let Some(Some(top)) = ops.last().copied() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    ops.pop();
                    reducer.apply(top, &mut values)?;
                }
                ops.push(Some(op));
            }
        }
    }

    while let Some(op) = ops.pop() {
        if let Some(op) = op {
            reducer.apply(op, &mut values)?;
        }
    }
    Ok(values)
}

/// Builds regex ASTs, skipping operators that lack operands.
struct AstReducer<'a> {
    builder: &'a mut ReBuilder,
}

impl AstReducer<'_> {
    /// Returns the children of `r` if it is an operation of the same kind as `op`, otherwise `r` itself.
    fn flatten(op: Operator, r: Regex) -> SmallVec<[Regex; 2]> {
        match (op, r.op()) {
            (Operator::Union, ReOp::Union(rs)) | (Operator::Concat, ReOp::Concat(rs)) => rs.clone(),
            _ => smallvec![r],
        }
    }
}

impl Reducer for AstReducer<'_> {
    type Value = Regex;
    type Error = std::convert::Infallible;

    fn operand(&mut self, token: Token) -> Regex {
        match token {
            Token::Literal(c) => self.builder.literal(c),
            _ => self.builder.epsilon(),
        }
    }

    fn apply(&mut self, op: Operator, values: &mut Vec<Regex>) -> Result<(), Self::Error> {
        if values.len() < op.arity() {
            warn!(
                "{}",
                MissingOperand {
                    op,
                    found: values.len()
                }
            );
            return Ok(());
        }
        let re = match op {
            Operator::Star => {
                let Some(r) = values.pop() else {
                    return Ok(());
                };
                self.builder.star(r)
            }
            Operator::Concat | Operator::Union => {
                let (Some(r2), Some(r1)) = (values.pop(), values.pop()) else {
                    return Ok(());
                };
                let mut rs = Self::flatten(op, r1);
                rs.extend(Self::flatten(op, r2));
                if op == Operator::Union {
                    self.builder.union(rs)
                } else {
                    self.builder.concat(rs)
                }
            }
        };
        values.push(re);
        Ok(())
    }
}

/// Parses a regular expression.
///
/// The result mirrors the input structure: nested unions and concatenations are flattened as they are built,
/// but nothing else is simplified. Operators without enough operands are skipped with a warning.
/// An input without operands denotes the empty set.
pub fn parse(input: &str, builder: &mut ReBuilder) -> Regex {
    let tokens = tokenize(input);
    let mut reducer = AstReducer { builder };
    let values = match shunt(&tokens, &mut reducer) {
        Ok(values) => values,
        Err(never) => match never {},
    };
    match values.last() {
        Some(r) => r.clone(),
        None => reducer.builder.empty_set(),
    }
}
