//! Structural simplification of regular expressions.
//!
//! [`normalize`] rewrites an expression into a canonical form without changing its language,
//! [`bounded_distribute`] tries a single cost-reducing distribution of concatenation over a small union,
//! and [`prettify`] combines both to pick the cheaper of the two forms.
use std::collections::HashMap;

use itertools::Itertools;
use smallvec::{smallvec, SmallVec};

use super::{ReBuilder, ReOp, Regex};

/// Normalizes expressions, caching the result for every node it has seen.
#[derive(Debug, Clone, Default)]
pub(crate) struct Normalizer {
    cache: HashMap<Regex, Regex>,
}

impl Normalizer {
    pub fn normalize(&mut self, r: &Regex, builder: &mut ReBuilder) -> Regex {
        if let Some(n) = self.cache.get(r) {
            return n.clone();
        }
        let n = match r.op() {
            ReOp::EmptySet | ReOp::Epsilon | ReOp::Literal(_) => r.clone(),
            ReOp::Star(child) => {
                let inner = self.normalize(child, builder);
                match inner.op() {
                    // (r*)* = r*
                    ReOp::Star(_) => inner,
                    ReOp::Epsilon => builder.epsilon(),
                    _ => builder.star(inner),
                }
            }
            ReOp::Concat(rs) => {
                let mut items: SmallVec<[Regex; 2]> = SmallVec::with_capacity(rs.len());
                let mut empty = false;
                for child in rs {
                    let n = self.normalize(child, builder);
                    match n.op() {
                        ReOp::EmptySet => {
                            empty = true;
                            break;
                        }
                        ReOp::Epsilon => {}
                        ReOp::Concat(gs) => items.extend(gs.iter().cloned()),
                        _ => items.push(n),
                    }
                }
                if empty {
                    builder.empty_set()
                } else {
                    match items.len() {
                        0 => builder.epsilon(),
                        1 => items.remove(0),
                        _ => builder.concat(items),
                    }
                }
            }
            ReOp::Union(rs) => {
                let mut items: Vec<Regex> = Vec::with_capacity(rs.len());
                for child in rs {
                    let n = self.normalize(child, builder);
                    match n.op() {
                        ReOp::EmptySet => {}
                        ReOp::Union(gs) => items.extend(gs.iter().cloned()),
                        _ => items.push(n),
                    }
                }
                let items: SmallVec<[Regex; 2]> = items
                    .into_iter()
                    .sorted_by_key(|r| r.key())
                    .dedup_by(|a, b| a.key() == b.key())
                    .collect();
                match items.len() {
                    0 => builder.empty_set(),
                    1 => items[0].clone(),
                    _ => builder.union(items),
                }
            }
        };
        self.cache.insert(r.clone(), n.clone());
        n
    }
}

/// Rewrites the expression into its normal form.
///
/// The normal form has no nested unions or concatenations, no union or concatenation with fewer than two children,
/// no star directly under a star, and no star of the empty word.
/// Empty words are dropped from concatenations, an empty set turns a concatenation into the empty set and is dropped from unions.
/// The children of a union are sorted by key with duplicates removed.
///
/// Normalizing is idempotent.
/// It is a precondition that the given regex is managed by the given builder.
pub fn normalize(r: &Regex, builder: &mut ReBuilder) -> Regex {
    Normalizer::default().normalize(r, builder)
}

/// Tries to distribute a concatenation over one of its union factors.
///
/// For a concatenation `x (u|v) y`, the positions are scanned from left to right.
/// At the first union factor with at most two alternatives whose distributed form `xuy | xvy` (normalized) costs strictly less than the concatenation, that form is returned.
/// Only the first such improving rewrite is applied.
/// Any other expression, or a concatenation without an improving rewrite, is returned unchanged.
pub fn bounded_distribute(r: &Regex, builder: &mut ReBuilder) -> Regex {
    let ReOp::Concat(rs) = r.op() else {
        return r.clone();
    };
    let mut normalizer = Normalizer::default();
    for (i, factor) in rs.iter().enumerate() {
        let ReOp::Union(alternatives) = factor.op() else {
            continue;
        };
        if alternatives.len() > 2 {
            continue;
        }
        let mut distributed: SmallVec<[Regex; 2]> = smallvec![];
        for alt in alternatives {
            let mut items = rs.clone();
            items[i] = alt.clone();
            let concat = builder.concat(items);
            distributed.push(normalizer.normalize(&concat, builder));
        }
        if distributed.is_empty() {
            continue;
        }
        let union = builder.union(distributed);
        let candidate = normalizer.normalize(&union, builder);
        if candidate.cost() < r.cost() {
            return candidate;
        }
    }
    r.clone()
}

/// Returns a readable equivalent of the expression.
///
/// The expression is normalized, then distributed with [`bounded_distribute`] and normalized again.
/// The distributed form is returned only if it differs structurally and is strictly cheaper.
pub fn prettify(r: &Regex, builder: &mut ReBuilder) -> Regex {
    let mut normalizer = Normalizer::default();
    let n = normalizer.normalize(r, builder);
    let d = bounded_distribute(&n, builder);
    let d = normalizer.normalize(&d, builder);
    if d.key() == n.key() {
        n
    } else if d.cost() < n.cost() {
        d
    } else {
        n
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::re::parse;

    fn norm(input: &str) -> String {
        let mut b = ReBuilder::default();
        let r = parse(input, &mut b);
        normalize(&r, &mut b).to_string()
    }

    fn pretty(input: &str) -> String {
        let mut b = ReBuilder::default();
        let r = parse(input, &mut b);
        prettify(&r, &mut b).to_string()
    }

    /// Random regex source text over {a, b}.
    #[derive(Clone, Debug)]
    pub(crate) struct RegexText(pub(crate) String);

    impl RegexText {
        fn generate(g: &mut Gen, depth: usize) -> String {
            let choice = if depth == 0 {
                u8::arbitrary(g) % 3
            } else {
                u8::arbitrary(g) % 6
            };
            match choice {
                0 => "a".to_string(),
                1 => "b".to_string(),
                2 => "#".to_string(),
                3 => format!("({})*", Self::generate(g, depth - 1)),
                4 => format!("({})({})", Self::generate(g, depth - 1), Self::generate(g, depth - 1)),
                _ => format!("({}|{})", Self::generate(g, depth - 1), Self::generate(g, depth - 1)),
            }
        }
    }

    impl Arbitrary for RegexText {
        fn arbitrary(g: &mut Gen) -> Self {
            let depth = usize::arbitrary(g) % 4;
            RegexText(Self::generate(g, depth))
        }
    }

    #[test]
    fn normalize_union() {
        assert_eq!(norm("a|a"), "a");
        assert_eq!(norm("b|a"), "a|b");
        assert_eq!(norm("(b|a)|(c|a)"), "a|b|c");
    }

    #[test]
    fn normalize_concat() {
        assert_eq!(norm("#a#"), "a");
        assert_eq!(norm("##"), "#");
        assert_eq!(norm("a(bc)"), "abc");
    }

    #[test]
    fn normalize_star() {
        assert_eq!(norm("a**"), "a*");
        assert_eq!(norm("#*"), "#");
        assert_eq!(norm("(#|#)*"), "#");
    }

    #[test]
    fn normalize_empty_set() {
        let mut b = ReBuilder::default();
        let a = b.literal('a');
        let e = b.empty_set();
        let c = b.concat(smallvec![a.clone(), e.clone()]);
        assert_eq!(*normalize(&c, &mut b).op(), ReOp::EmptySet);
        let u = b.union(smallvec![e.clone(), a.clone()]);
        assert_eq!(normalize(&u, &mut b), a);
        let u = b.union(smallvec![e.clone(), e]);
        assert_eq!(*normalize(&u, &mut b).op(), ReOp::EmptySet);
    }

    #[test]
    fn normalize_sorts_by_key() {
        // Literals (kind 2) sort before unions, concatenations and stars
        assert_eq!(norm("b*|ab|a"), "a|ab|b*");
        assert_eq!(norm("a|#"), "#|a");
    }

    #[test]
    fn distribute_first_improving_rewrite() {
        let mut b = ReBuilder::default();
        // a(b|c): cost 1 + 5 + 1 = 7, ab|ac: 3 + 3 + 3 = 9
        let r = parse("a(b|c)", &mut b);
        assert_eq!(bounded_distribute(&r, &mut b), r);
        // (#|a)a: cost 5 + 1 + 1 = 7, a|aa: 1 + 3 + 3 = 7, not strictly lower
        let r = parse("(#|a)a", &mut b);
        assert_eq!(bounded_distribute(&r, &mut b), r);
        // (#|#a)b: cost 7 + 1 + 1 = 9, b|ab: 1 + 3 + 3 = 7
        let r = parse("(#|#a)b", &mut b);
        assert_eq!(bounded_distribute(&r, &mut b).to_string(), "b|ab");
    }

    #[test]
    fn distribute_ignores_non_concat() {
        let mut b = ReBuilder::default();
        let r = parse("(a|b)*", &mut b);
        assert_eq!(bounded_distribute(&r, &mut b), r);
        let r = parse("a|b", &mut b);
        assert_eq!(bounded_distribute(&r, &mut b), r);
    }

    #[test]
    fn prettify_keeps_normal_form() {
        assert_eq!(pretty("a|a"), "a");
        assert_eq!(pretty("a(b|c)"), "a(b|c)");
        assert_eq!(pretty("(a|b)*"), "(a|b)*");
        assert_eq!(pretty(""), "");
    }

    #[quickcheck]
    fn normalize_is_idempotent(re: RegexText) -> bool {
        let mut b = ReBuilder::default();
        let r = parse(&re.0, &mut b);
        let n = normalize(&r, &mut b);
        normalize(&n, &mut b) == n
    }

    #[quickcheck]
    fn prettify_never_increases_cost(re: RegexText) -> bool {
        let mut b = ReBuilder::default();
        let r = parse(&re.0, &mut b);
        let n = normalize(&r, &mut b);
        prettify(&r, &mut b).cost() <= n.cost()
    }
}
