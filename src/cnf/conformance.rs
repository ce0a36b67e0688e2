//! Chomsky normal form conformance checking.

use crate::grammar::Grammar;

/// Check whether the grammar is in Chomsky normal form.
///
/// Every alternative must be either two nonterminals, a single terminal, or
/// (only for the start symbol) ε, and the start symbol must not occur on any
/// right-hand side.
pub fn is_cnf(grammar: &Grammar) -> bool {
    if !grammar.is_nonterminal(&grammar.start_symbol) {
        return false;
    }

    if start_appears_on_rhs(grammar) {
        return false;
    }

    for (left, alternatives) in &grammar.productions {
        if !grammar.is_nonterminal(left) {
            return false;
        }

        for rhs in alternatives {
            let ok = match &rhs[..] {
                [] => *left == grammar.start_symbol,
                [symbol] => grammar.is_terminal(symbol),
                [first, second] => grammar.is_nonterminal(first) && grammar.is_nonterminal(second),
                _ => false,
            };
            if !ok {
                return false;
            }
        }
    }

    true
}

fn start_appears_on_rhs(grammar: &Grammar) -> bool {
    grammar
        .productions
        .values()
        .flatten()
        .flatten()
        .any(|symbol| *symbol == grammar.start_symbol)
}
