//! Finite automata and regular expressions over single-character alphabets.
//!
//! The [`automata`] module provides the automaton model with determinization, minimization, reversal, isomorphism checking,
//! ε-elimination, Thompson's construction and conversion back to regular expressions by state elimination.
//! The [`re`] module provides interned regular expression ASTs, a parser and structural simplification.
//! The [`pipeline`] module composes both into end-to-end operations such as canonicalizing a regular expression.
//!
//! # Example
//! ```
//! use fsa_toolkit::pipeline::minimize_regex;
//! assert_eq!(minimize_regex("a|a"), "a");
//! ```

#[cfg(feature = "automata")]
pub mod automata;
#[cfg(feature = "automata")]
pub mod pipeline;

#[cfg(feature = "regex")]
pub mod re;
