//! Fresh nonterminal symbols.

use crate::{
    grammar::{Grammar, Symbol},
    types::Map,
};

/// Mints nonterminal symbols that collide with nothing already declared in
/// the grammar.
///
/// Every returned symbol is inserted into the nonterminal set before it is
/// handed out, so two calls can never produce the same name and no minted
/// name can shadow a user-chosen terminal (e.g. a terminal literally called
/// `A0`).
#[derive(Debug, Default)]
pub(crate) struct SymbolAllocator {
    next_suffix: Map<String, u64>,
}

impl SymbolAllocator {
    /// Return `prefix` itself if it is unused, otherwise `prefix` followed by
    /// the smallest unused non-negative integer.
    pub(crate) fn fresh(&mut self, grammar: &mut Grammar, prefix: &str) -> Symbol {
        if !grammar.is_terminal(prefix) && !grammar.is_nonterminal(prefix) {
            let symbol = prefix.to_owned();
            grammar.nonterminals.insert(symbol.clone());
            return symbol;
        }

        // Suffixes below the cached one were either minted (and therefore
        // inserted into the nonterminal set) or rejected against a set that
        // only grows during a run, so resuming from the cache still yields
        // the smallest unused suffix.
        let suffix = self.next_suffix.entry(prefix.to_owned()).or_insert(0);
        loop {
            let candidate = format!("{}{}", prefix, suffix);
            *suffix += 1;
            if !grammar.is_terminal(&candidate) && !grammar.is_nonterminal(&candidate) {
                grammar.nonterminals.insert(candidate.clone());
                return candidate;
            }
        }
    }
}
