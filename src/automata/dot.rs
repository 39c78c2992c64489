//! Facilities to generate a DOT representation of automata.

use std::{borrow::Cow, collections::BTreeMap};

use super::{Automaton, StateId, Symbol};

/// Which automaton a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Side {
    Only,
    Left,
    Right,
}

impl Side {
    fn prefix(&self) -> &'static str {
        match self {
            Side::Only => "q",
            Side::Left => "A",
            Side::Right => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Node {
    /// The invisible point an initial state is entered from.
    Entry(Side, StateId),
    State(Side, StateId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Edge {
    Entry(Side, StateId),
    Step(Side, StateId, Symbol, StateId),
    /// Pairs a state of the left automaton with a state of the right one.
    Mapping(StateId, StateId),
}

impl Edge {
    fn source(&self) -> Node {
        match *self {
            Edge::Entry(side, q) => Node::Entry(side, q),
            Edge::Step(side, q, _, _) => Node::State(side, q),
            Edge::Mapping(q, _) => Node::State(Side::Left, q),
        }
    }

    fn target(&self) -> Node {
        match *self {
            Edge::Entry(side, q) => Node::State(side, q),
            Edge::Step(side, _, _, q) => Node::State(side, q),
            Edge::Mapping(_, q) => Node::State(Side::Right, q),
        }
    }
}

fn node_id<'a>(n: &Node) -> dot::Id<'a> {
    let name = match n {
        Node::Entry(side, q) => format!("init{}{}", side.prefix(), q),
        Node::State(side, q) => format!("{}{}", side.prefix(), q),
    };
    // Names consist of a letter prefix followed by digits
    dot::Id::new(name).unwrap()
}

fn nodes_of(a: &Automaton, side: Side) -> impl Iterator<Item = Node> + '_ {
    a.initial()
        .iter()
        .map(move |&q| Node::Entry(side, q))
        .chain(a.states().iter().map(move |&q| Node::State(side, q)))
}

fn edges_of(a: &Automaton, side: Side) -> impl Iterator<Item = Edge> + '_ {
    a.initial()
        .iter()
        .map(move |&q| Edge::Entry(side, q))
        .chain(
            a.transitions()
                .map(move |(from, symbol, to)| Edge::Step(side, from, symbol, to)),
        )
}

/// A single automaton, rendered with double circles for final states.
pub(super) struct AutomatonGraph<'a>(pub(super) &'a Automaton);

impl<'a> dot::Labeller<'a, Node, Edge> for AutomatonGraph<'a> {
    fn graph_id(&'a self) -> dot::Id<'a> {
        dot::Id::new("automaton").unwrap()
    }

    fn node_id(&'a self, n: &Node) -> dot::Id<'a> {
        node_id(n)
    }

    fn node_shape(&'a self, node: &Node) -> Option<dot::LabelText<'a>> {
        match node {
            Node::Entry(..) => Some(dot::LabelText::LabelStr("point".into())),
            Node::State(_, q) if self.0.is_final(*q) => {
                Some(dot::LabelText::LabelStr("doublecircle".into()))
            }
            Node::State(..) => Some(dot::LabelText::LabelStr("circle".into())),
        }
    }

    fn node_label(&'a self, n: &Node) -> dot::LabelText<'a> {
        match n {
            Node::Entry(..) => dot::LabelText::LabelStr("".into()),
            Node::State(..) => dot::LabelText::LabelStr(node_id(n).name()),
        }
    }

    fn edge_label(&'a self, e: &Edge) -> dot::LabelText<'a> {
        match e {
            Edge::Step(_, _, symbol, _) => dot::LabelText::LabelStr(symbol.to_string().into()),
            _ => dot::LabelText::LabelStr("".into()),
        }
    }

    fn kind(&self) -> dot::Kind {
        dot::Kind::Digraph
    }
}

impl<'a> dot::GraphWalk<'a, Node, Edge> for AutomatonGraph<'a> {
    fn nodes(&'a self) -> dot::Nodes<'a, Node> {
        Cow::Owned(nodes_of(self.0, Side::Only).collect())
    }

    fn edges(&'a self) -> dot::Edges<'a, Edge> {
        Cow::Owned(edges_of(self.0, Side::Only).collect())
    }

    fn source(&'a self, edge: &Edge) -> Node {
        edge.source()
    }

    fn target(&'a self, edge: &Edge) -> Node {
        edge.target()
    }
}

/// Two automata side by side, with a dashed edge for every pair of a state bijection.
struct IsomorphismGraph<'a> {
    left: &'a Automaton,
    right: &'a Automaton,
    mapping: &'a BTreeMap<StateId, StateId>,
}

impl IsomorphismGraph<'_> {
    fn automaton(&self, side: Side) -> &Automaton {
        match side {
            Side::Right => self.right,
            Side::Left | Side::Only => self.left,
        }
    }
}

impl<'a> dot::Labeller<'a, Node, Edge> for IsomorphismGraph<'a> {
    fn graph_id(&'a self) -> dot::Id<'a> {
        dot::Id::new("isomorphism").unwrap()
    }

    fn node_id(&'a self, n: &Node) -> dot::Id<'a> {
        node_id(n)
    }

    fn node_shape(&'a self, node: &Node) -> Option<dot::LabelText<'a>> {
        match node {
            Node::Entry(..) => Some(dot::LabelText::LabelStr("point".into())),
            Node::State(..) => Some(dot::LabelText::LabelStr("circle".into())),
        }
    }

    fn node_label(&'a self, n: &Node) -> dot::LabelText<'a> {
        match n {
            Node::Entry(..) => dot::LabelText::LabelStr("".into()),
            Node::State(..) => dot::LabelText::LabelStr(node_id(n).name()),
        }
    }

    fn node_style(&'a self, n: &Node) -> dot::Style {
        match n {
            Node::Entry(..) => dot::Style::Invisible,
            Node::State(..) => dot::Style::Filled,
        }
    }

    fn node_color(&'a self, node: &Node) -> Option<dot::LabelText<'a>> {
        match node {
            Node::State(side, q) if self.automaton(*side).is_final(*q) => {
                Some(dot::LabelText::LabelStr("palegreen".into()))
            }
            Node::State(..) => Some(dot::LabelText::LabelStr("white".into())),
            Node::Entry(..) => None,
        }
    }

    fn edge_label(&'a self, e: &Edge) -> dot::LabelText<'a> {
        match e {
            Edge::Step(_, _, symbol, _) => dot::LabelText::LabelStr(symbol.to_string().into()),
            Edge::Mapping(..) => dot::LabelText::LabelStr("≈".into()),
            Edge::Entry(..) => dot::LabelText::LabelStr("".into()),
        }
    }

    fn edge_style(&'a self, e: &Edge) -> dot::Style {
        match e {
            Edge::Mapping(..) => dot::Style::Dashed,
            _ => dot::Style::None,
        }
    }

    fn edge_color(&'a self, e: &Edge) -> Option<dot::LabelText<'a>> {
        match e {
            Edge::Mapping(..) => Some(dot::LabelText::LabelStr("blue".into())),
            _ => None,
        }
    }

    fn kind(&self) -> dot::Kind {
        dot::Kind::Digraph
    }
}

impl<'a> dot::GraphWalk<'a, Node, Edge> for IsomorphismGraph<'a> {
    fn nodes(&'a self) -> dot::Nodes<'a, Node> {
        Cow::Owned(
            nodes_of(self.left, Side::Left)
                .chain(nodes_of(self.right, Side::Right))
                .collect(),
        )
    }

    fn edges(&'a self) -> dot::Edges<'a, Edge> {
        Cow::Owned(
            edges_of(self.left, Side::Left)
                .chain(edges_of(self.right, Side::Right))
                .chain(self.mapping.iter().map(|(&p, &q)| Edge::Mapping(p, q)))
                .collect(),
        )
    }

    fn source(&'a self, edge: &Edge) -> Node {
        edge.source()
    }

    fn target(&'a self, edge: &Edge) -> Node {
        edge.target()
    }
}

/// Returns the DOT representation of two automata and a bijection between their states.
///
/// States of `left` are named `A<id>`, states of `right` are named `B<id>`.
/// Final states are filled pale green, and every pair of the mapping is drawn as a dashed blue edge labeled `≈`.
pub fn isomorphism_dot(
    left: &Automaton,
    right: &Automaton,
    mapping: &BTreeMap<StateId, StateId>,
) -> std::io::Result<String> {
    let graph = IsomorphismGraph {
        left,
        right,
        mapping,
    };
    let mut buf = Vec::new();
    dot::render(&graph, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::isomorphism;

    fn automaton() -> Automaton {
        let mut a = Automaton::new();
        a.add_state(0);
        a.add_state(1);
        a.add_initial(0);
        a.add_final(1);
        a.add_transition(0, 'a', 1);
        a.add_transition(1, '#', 0);
        a
    }

    #[test]
    fn automaton_dot() {
        let dot = automaton().dot().unwrap();
        assert!(dot.contains("initq0 -> q0"));
        assert!(dot.contains("q0 -> q1"));
        assert!(dot.contains("q1 -> q0"));
        assert!(dot.contains("point"));
        assert!(dot.contains("doublecircle"));
        assert!(dot.contains('#'));
    }

    #[test]
    fn isomorphism_dot_pairs_states() {
        let a = automaton();
        let mapping = isomorphism(&a, &a).unwrap_or_default();
        let dot = isomorphism_dot(&a, &a, &mapping).unwrap();
        assert!(dot.starts_with("digraph isomorphism"));
        assert!(dot.contains("A0 -> B0"));
        assert!(dot.contains("A1 -> B1"));
        assert!(dot.contains("palegreen"));
        assert!(dot.contains("dashed"));
        assert!(dot.contains("initB0 -> B0"));
    }
}
