//! Elimination of unit productions (UNIT).

use crate::{
    grammar::{Grammar, Rhs, Symbol},
    types::{Map, Set},
};

/// Remove every alternative of the form `A := B` with `B` a nonterminal, by
/// replacing each left-hand side with the closure of the non-unit
/// alternatives reachable from it over the unit graph.
///
/// Each closure traversal visits a node at most once, so unit cycles such as
/// `A := B`, `B := A` terminate.
#[tracing::instrument(skip_all)]
pub(crate) fn eliminate_units(grammar: &mut Grammar) {
    let mut unit_graph: Map<Symbol, Vec<Symbol>> = Map::default();
    for (left, alternatives) in &grammar.productions {
        for rhs in alternatives {
            if is_unit(grammar, rhs) {
                unit_graph
                    .entry(left.clone())
                    .or_default()
                    .push(rhs[0].clone());
            }
        }
    }
    tracing::trace!("unit graph = {:?}", unit_graph);

    let mut closures: Map<Symbol, Vec<Rhs>> = Map::default();
    for left in grammar.productions.keys() {
        let mut visited: Set<Symbol> = Set::default();
        let mut collected: Vec<Rhs> = vec![];
        let mut stack = vec![left.clone()];
        while let Some(node) = stack.pop() {
            if !visited.insert(node.clone()) {
                continue;
            }
            if let Some(alternatives) = grammar.productions.get(&node) {
                for rhs in alternatives {
                    if !is_unit(grammar, rhs) {
                        collected.push(rhs.clone());
                    }
                }
            }
            if let Some(successors) = unit_graph.get(&node) {
                stack.extend(successors.iter().cloned());
            }
        }
        closures.insert(left.clone(), collected);
    }

    grammar.productions = closures;
}

fn is_unit(grammar: &Grammar, rhs: &Rhs) -> bool {
    matches!(&rhs[..], [symbol] if grammar.is_nonterminal(symbol))
}
