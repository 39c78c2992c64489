//! Textual exchange format of automata.
//!
//! An automaton is written as five labeled sections, each followed by its data lines and terminated by a blank line:
//!
//! ```text
//! STATES:
//! 0 1 2
//!
//! ALPHABET:
//! a b
//!
//! TRANSITIONS:
//! 0 a 1
//! 1 # 2
//!
//! INITIAL_STATES:
//! 0
//!
//! FINAL_STATES:
//! 2
//! ```
//!
//! Transitions are given as `<from> <symbol> <to>`, where the symbol `#` denotes an ε-transition.

use std::{fmt::Display, str::FromStr};

use log::trace;
use thiserror::Error;

use super::{Automaton, StateId, Symbol};

/// Error returned when parsing an automaton from text fails.
/// Line numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("line {line}: unknown section '{label}'")]
    UnknownSection { line: usize, label: String },
    #[error("line {line}: data before the first section label")]
    MissingSection { line: usize },
    #[error("line {line}: '{token}' is not a state")]
    InvalidState { line: usize, token: String },
    #[error("line {line}: transitions are written as '<from> <symbol> <to>'")]
    InvalidTransition { line: usize },
    #[error("line {line}: symbol '{token}' is not a single character")]
    InvalidSymbol { line: usize, token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    States,
    Alphabet,
    Transitions,
    Initial,
    Final,
}

impl Section {
    const ALL: [Section; 5] = [
        Section::States,
        Section::Alphabet,
        Section::Transitions,
        Section::Initial,
        Section::Final,
    ];

    fn label(&self) -> &'static str {
        match self {
            Section::States => "STATES:",
            Section::Alphabet => "ALPHABET:",
            Section::Transitions => "TRANSITIONS:",
            Section::Initial => "INITIAL_STATES:",
            Section::Final => "FINAL_STATES:",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

fn parse_state(token: &str, line: usize) -> Result<StateId, FormatError> {
    token.parse().map_err(|_| FormatError::InvalidState {
        line,
        token: token.to_string(),
    })
}

fn parse_symbol(token: &str, line: usize) -> Result<Symbol, FormatError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Symbol::from(c)),
        _ => Err(FormatError::InvalidSymbol {
            line,
            token: token.to_string(),
        }),
    }
}

impl FromStr for Automaton {
    type Err = FormatError;

    /// Parses an automaton from the section format.
    ///
    /// Blank lines are skipped. A line whose first token ends with a colon starts a new section.
    /// Sections may appear in any order and more than once.
    /// Referenced states are not required to be listed in the `STATES:` section.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut a = Automaton::new();
        let mut section: Option<Section> = None;

        for (i, line) in s.lines().enumerate() {
            let line_no = i + 1;
            let mut tokens = line.split_whitespace().peekable();
            let Some(&first) = tokens.peek() else {
                continue;
            };
            if first.ends_with(':') {
                section = Some(Section::from_label(first).ok_or_else(|| {
                    FormatError::UnknownSection {
                        line: line_no,
                        label: first.to_string(),
                    }
                })?);
                trace!("line {}: section {}", line_no, first);
                tokens.next();
                if tokens.peek().is_none() {
                    continue;
                }
            }
            let Some(current) = section else {
                return Err(FormatError::MissingSection { line: line_no });
            };
            match current {
                Section::States => {
                    for t in tokens {
                        a.add_state(parse_state(t, line_no)?);
                    }
                }
                Section::Initial => {
                    for t in tokens {
                        a.add_initial(parse_state(t, line_no)?);
                    }
                }
                Section::Final => {
                    for t in tokens {
                        a.add_final(parse_state(t, line_no)?);
                    }
                }
                Section::Alphabet => {
                    for c in tokens.flat_map(str::chars) {
                        a.add_symbol(c);
                    }
                }
                Section::Transitions => {
                    let parts: Vec<&str> = tokens.collect();
                    let [from, symbol, to] = parts[..] else {
                        return Err(FormatError::InvalidTransition { line: line_no });
                    };
                    let from = parse_state(from, line_no)?;
                    let symbol = parse_symbol(symbol, line_no)?;
                    let to = parse_state(to, line_no)?;
                    a.add_transition(from, symbol, to);
                }
            }
        }
        Ok(a)
    }
}

impl Display for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", Section::States.label())?;
        for q in self.states() {
            write!(f, "{} ", q)?;
        }
        writeln!(f)?;
        writeln!(f)?;

        writeln!(f, "{}", Section::Alphabet.label())?;
        for c in self.alphabet() {
            write!(f, "{} ", c)?;
        }
        writeln!(f)?;
        writeln!(f)?;

        writeln!(f, "{}", Section::Transitions.label())?;
        for (from, symbol, to) in self.transitions() {
            writeln!(f, "{} {} {}", from, symbol, to)?;
        }
        writeln!(f)?;

        writeln!(f, "{}", Section::Initial.label())?;
        for q in self.initial() {
            write!(f, "{} ", q)?;
        }
        writeln!(f)?;
        writeln!(f)?;

        writeln!(f, "{}", Section::Final.label())?;
        for q in self.finals() {
            write!(f, "{} ", q)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::automata::det::tests::SmallNfa;
    use crate::automata::EPSILON;

    const SCENARIO: &str = "STATES:
0 1 2

ALPHABET:
a b

TRANSITIONS:
0 a 1
0 a 2
1 b 2
2 # 0

INITIAL_STATES:
0

FINAL_STATES:
2
";

    #[test]
    fn parse_sections() {
        let a: Automaton = SCENARIO.parse().unwrap();
        assert_eq!(a.num_states(), 3);
        assert_eq!(a.alphabet().iter().collect::<String>(), "ab");
        assert_eq!(a.num_transitions(), 4);
        assert_eq!(a.targets(0, Symbol::Char('a')).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(a.targets(2, Symbol::Epsilon).collect::<Vec<_>>(), vec![0]);
        assert!(a.is_initial(0));
        assert!(a.is_final(2));
        assert!(!a.alphabet().contains(&EPSILON));
        assert!(a.check_consistency().is_ok());
    }

    #[test]
    fn display_layout() {
        let a: Automaton = SCENARIO.parse().unwrap();
        let text = a.to_string();
        assert!(text.starts_with("STATES:\n0 1 2 \n\nALPHABET:\na b \n\nTRANSITIONS:\n0 a 1\n"));
        assert!(text.ends_with("INITIAL_STATES:\n0 \n\nFINAL_STATES:\n2 \n"));
    }

    #[test]
    fn parse_display_roundtrip() {
        let a: Automaton = SCENARIO.parse().unwrap();
        assert_eq!(a.to_string().parse::<Automaton>().unwrap(), a);
    }

    #[test]
    fn empty_input() {
        let a: Automaton = "".parse().unwrap();
        assert_eq!(a, Automaton::new());
    }

    #[test]
    fn data_on_label_line() {
        let a: Automaton = "STATES: 0 1\nFINAL_STATES: 1".parse().unwrap();
        assert_eq!(a.num_states(), 2);
        assert!(a.is_final(1));
    }

    #[test]
    fn errors_carry_line_numbers() {
        assert_eq!(
            "0 1".parse::<Automaton>(),
            Err(FormatError::MissingSection { line: 1 })
        );
        assert_eq!(
            "STATES:\n0\n\nSTART:\n0".parse::<Automaton>(),
            Err(FormatError::UnknownSection {
                line: 4,
                label: "START:".to_string()
            })
        );
        assert_eq!(
            "STATES:\n0 x".parse::<Automaton>(),
            Err(FormatError::InvalidState {
                line: 2,
                token: "x".to_string()
            })
        );
        assert_eq!(
            "TRANSITIONS:\n0 a".parse::<Automaton>(),
            Err(FormatError::InvalidTransition { line: 2 })
        );
        assert_eq!(
            "TRANSITIONS:\n0 ab 1".parse::<Automaton>(),
            Err(FormatError::InvalidSymbol {
                line: 2,
                token: "ab".to_string()
            })
        );
    }

    #[quickcheck]
    fn display_parses_back(nfa: SmallNfa) -> bool {
        nfa.0.to_string().parse::<Automaton>() == Ok(nfa.0)
    }
}
