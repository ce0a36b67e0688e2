//! Removal of unreachable and unproductive symbols.

use crate::{
    grammar::{Grammar, Symbol},
    types::{Map, Set},
};

/// Discard every nonterminal that cannot be reached from the start symbol by
/// following right-hand sides, together with its productions. The
/// nonterminal set is replaced by exactly the visited set; terminals are
/// never pruned.
#[tracing::instrument(skip_all)]
pub(crate) fn remove_unreachable(grammar: &mut Grammar) {
    let mut visited: Set<Symbol> = Set::default();
    let mut stack = vec![grammar.start_symbol.clone()];
    while let Some(node) = stack.pop() {
        if !grammar.is_nonterminal(&node) {
            continue;
        }
        if !visited.insert(node.clone()) {
            continue;
        }
        if let Some(alternatives) = grammar.productions.get(&node) {
            for rhs in alternatives {
                stack.extend(rhs.iter().cloned());
            }
        }
    }

    grammar.productions.retain(|left, _| visited.contains(left));
    grammar.nonterminals = visited;
}

/// Discard every nonterminal that cannot derive any terminal string.
///
/// Productivity is the same worklist/decrement fixed point as nullability:
/// an alternative whose nonterminal positions are all settled proves its
/// left-hand side productive (terminals and the empty alternative count for
/// free). Afterwards, unproductive left-hand sides and every alternative
/// referencing an unproductive symbol are dropped, and the nonterminal set
/// becomes exactly the productive set.
#[tracing::instrument(skip_all)]
pub(crate) fn remove_unproductive(grammar: &mut Grammar) {
    let mut need: Map<(Symbol, usize), usize> = Map::default();
    let mut uses: Map<Symbol, Vec<(Symbol, usize)>> = Map::default();
    let mut productive: Set<Symbol> = Set::default();
    let mut pending: Vec<Symbol> = vec![];

    for (left, alternatives) in &grammar.productions {
        for (i, rhs) in alternatives.iter().enumerate() {
            let mut count = 0;
            for symbol in rhs {
                if grammar.is_nonterminal(symbol) {
                    uses.entry(symbol.clone())
                        .or_default()
                        .push((left.clone(), i));
                    count += 1;
                }
            }
            if count == 0 {
                if productive.insert(left.clone()) {
                    pending.push(left.clone());
                }
            } else {
                need.insert((left.clone(), i), count);
            }
        }
    }

    while let Some(symbol) = pending.pop() {
        let Some(dependents) = uses.get(&symbol) else {
            continue;
        };
        for (left, i) in dependents {
            let Some(count) = need.get_mut(&(left.clone(), *i)) else {
                continue;
            };
            *count -= 1;
            if *count == 0 && productive.insert(left.clone()) {
                pending.push(left.clone());
            }
        }
    }
    tracing::debug!("productive symbols = {:?}", productive);

    let dead: Set<Symbol> = grammar
        .nonterminals
        .iter()
        .filter(|symbol| !productive.contains(*symbol))
        .cloned()
        .collect();

    grammar.productions.retain(|left, _| !dead.contains(left));
    for alternatives in grammar.productions.values_mut() {
        alternatives.retain(|rhs| !rhs.iter().any(|symbol| dead.contains(symbol)));
    }
    grammar.nonterminals = productive;
}
