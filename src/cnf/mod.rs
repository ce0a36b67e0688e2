//! Conversion of context-free grammars into Chomsky normal form.
//!
//! The pipeline runs START, TERM, BIN, DEL and UNIT in that order, followed
//! by the productivity and reachability cleanups. The orderings
//! START,TERM,BIN,DEL,UNIT and START,BIN,DEL,UNIT,TERM lead to the least
//! (i.e. quadratic) blow-up of the intermediate grammar.

mod alloc;
mod cleanup;
mod del;
mod unit;

pub mod conformance;

pub use self::conformance::is_cnf;

use self::alloc::SymbolAllocator;
use crate::{
    grammar::{Grammar, Rhs, Symbol},
    types::Map,
};
use std::mem;

/// Normalize `grammar` into Chomsky normal form.
pub fn normalize(grammar: Grammar) -> Grammar {
    let mut normalizer = Normalizer::new(grammar);
    normalizer.normalize();
    normalizer.into_grammar()
}

/// Rewrites a grammar into Chomsky normal form.
///
/// The grammar is owned by the normalizer for the duration of the run and
/// mutated in place by the pipeline stages. The input is assumed to satisfy
/// the structural invariants documented on [`Grammar`]; the normalizer does
/// not re-validate them. `normalize` is meant to be called once per value;
/// fresh-symbol state is not reset between calls.
#[derive(Debug)]
pub struct Normalizer {
    grammar: Grammar,
    symbols: SymbolAllocator,
}

impl Normalizer {
    pub fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            symbols: SymbolAllocator::default(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn normalize(&mut self) {
        self.isolate_start();
        self.isolate_terminals();
        self.binarize();
        del::eliminate_empty(&mut self.grammar);
        self.dedup_alternatives();
        unit::eliminate_units(&mut self.grammar);
        self.dedup_alternatives();

        // Productivity first: stripping alternatives that reference
        // unproductive symbols can orphan nonterminals, which the
        // reachability sweep then removes.
        cleanup::remove_unproductive(&mut self.grammar);
        cleanup::remove_unreachable(&mut self.grammar);
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn into_grammar(self) -> Grammar {
        self.grammar
    }

    /// START: wrap the start symbol so that it never occurs on a right-hand
    /// side.
    #[tracing::instrument(skip_all)]
    fn isolate_start(&mut self) {
        let new_start = self.symbols.fresh(&mut self.grammar, "S0");
        let old_start = mem::replace(&mut self.grammar.start_symbol, new_start.clone());
        self.grammar
            .productions
            .insert(new_start, vec![vec![old_start]]);
    }

    /// TERM: in every right-hand side of length ≥ 2, replace each terminal
    /// with a proxy nonterminal dedicated to it. A lone terminal is already
    /// legal in CNF and stays put.
    #[tracing::instrument(skip_all)]
    fn isolate_terminals(&mut self) {
        let mut proxies: Map<Symbol, Symbol> = Map::default();
        let mut productions = mem::take(&mut self.grammar.productions);

        for alternatives in productions.values_mut() {
            for rhs in alternatives.iter_mut() {
                if rhs.len() <= 1 {
                    continue;
                }
                for symbol in rhs.iter_mut() {
                    if !self.grammar.is_terminal(symbol) {
                        continue;
                    }
                    let proxy = proxies.entry(symbol.clone()).or_insert_with(|| {
                        self.symbols
                            .fresh(&mut self.grammar, &format!("N{}", symbol))
                    });
                    *symbol = proxy.clone();
                }
            }
        }

        for (terminal, proxy) in &proxies {
            productions
                .entry(proxy.clone())
                .or_default()
                .push(vec![terminal.clone()]);
        }
        self.grammar.productions = productions;
    }

    /// BIN: rewrite every right-hand side `X1 X2 … Xk` with `k > 2` into a
    /// chain of fresh nonterminals, each owning exactly one binary
    /// alternative.
    #[tracing::instrument(skip_all)]
    fn binarize(&mut self) {
        let mut productions = mem::take(&mut self.grammar.productions);
        let mut chains: Vec<(Symbol, Rhs)> = vec![];

        for alternatives in productions.values_mut() {
            for rhs in alternatives.iter_mut() {
                if rhs.len() <= 2 {
                    continue;
                }

                let mut head = self.symbols.fresh(&mut self.grammar, "A");
                let new_rhs = vec![rhs[0].clone(), head.clone()];
                for symbol in &rhs[1..rhs.len() - 2] {
                    let next = self.symbols.fresh(&mut self.grammar, "A");
                    chains.push((head, vec![symbol.clone(), next.clone()]));
                    head = next;
                }
                chains.push((head, vec![rhs[rhs.len() - 2].clone(), rhs[rhs.len() - 1].clone()]));

                *rhs = new_rhs;
            }
        }

        for (left, right) in chains {
            productions.entry(left).or_default().push(right);
        }
        self.grammar.productions = productions;
    }

    /// Sort each left-hand side's alternatives and drop duplicates; DEL and
    /// UNIT can both introduce them.
    #[tracing::instrument(skip_all)]
    fn dedup_alternatives(&mut self) {
        for alternatives in self.grammar.productions.values_mut() {
            alternatives.sort();
            alternatives.dedup();
        }
    }
}
