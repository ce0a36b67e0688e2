//! Elimination of empty productions (DEL).

use crate::{
    grammar::{Grammar, Rhs, Symbol},
    types::{Map, Set},
};

/// Remove every ε-alternative from the grammar, except at the start symbol
/// when the start symbol itself is nullable.
///
/// Every alternative containing nullable symbols is expanded into all 2^m
/// keep/drop variants first, so the language (minus ε at non-start symbols)
/// is preserved.
#[tracing::instrument(skip_all)]
pub(crate) fn eliminate_empty(grammar: &mut Grammar) {
    let nullable = nullable_set(grammar);
    tracing::debug!("nullable symbols = {:?}", nullable);

    let start = grammar.start_symbol.clone();
    for (left, alternatives) in grammar.productions.iter_mut() {
        let original_count = alternatives.len();
        for i in 0..original_count {
            if alternatives[i].is_empty() {
                continue;
            }
            if !alternatives[i].iter().any(|s| nullable.contains(s)) {
                continue;
            }
            // The first variant is the unmodified alternative, which is
            // already in place.
            let variants = expand_alternative(&alternatives[i], &nullable);
            for variant in variants.into_iter().skip(1) {
                if variant.is_empty() && *left != start {
                    continue;
                }
                alternatives.push(variant);
            }
        }
    }

    for (left, alternatives) in grammar.productions.iter_mut() {
        if *left == start {
            continue;
        }
        alternatives.retain(|rhs| !rhs.is_empty());
    }
}

/// Compute the set of nullable nonterminals.
///
/// A nonterminal is nullable if it owns a literally-empty alternative or an
/// alternative made up entirely of nullable nonterminals. The closure is a
/// worklist over a reverse-dependency index with per-alternative counters of
/// unresolved nonterminal positions, so the total work is linear in the size
/// of the grammar.
pub(crate) fn nullable_set(grammar: &Grammar) -> Set<Symbol> {
    let mut need: Map<(Symbol, usize), usize> = Map::default();
    let mut uses: Map<Symbol, Vec<(Symbol, usize)>> = Map::default();
    let mut nullable: Set<Symbol> = Set::default();
    let mut pending: Vec<Symbol> = vec![];

    for (left, alternatives) in &grammar.productions {
        for (i, rhs) in alternatives.iter().enumerate() {
            // An alternative containing a terminal can never derive ε.
            if rhs.iter().any(|s| grammar.is_terminal(s)) {
                continue;
            }
            if rhs.is_empty() {
                if nullable.insert(left.clone()) {
                    pending.push(left.clone());
                }
                continue;
            }
            need.insert((left.clone(), i), rhs.len());
            for symbol in rhs {
                uses.entry(symbol.clone())
                    .or_default()
                    .push((left.clone(), i));
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
            if *count == 0 && nullable.insert(left.clone()) {
                pending.push(left.clone());
            }
        }
    }

    nullable
}

/// Generate every keep/drop variant of `rhs` over its nullable symbols,
/// preserving the relative order of the kept symbols. The variant that keeps
/// everything (i.e. `rhs` itself) comes first.
fn expand_alternative(rhs: &Rhs, nullable: &Set<Symbol>) -> Vec<Rhs> {
    let mut variants: Vec<Rhs> = vec![vec![]];
    for symbol in rhs {
        if nullable.contains(symbol) {
            let dropped = variants.clone();
            for variant in &mut variants {
                variant.push(symbol.clone());
            }
            variants.extend(dropped);
        } else {
            for variant in &mut variants {
                variant.push(symbol.clone());
            }
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar(source: &str) -> Grammar {
        Grammar::from_str(source).unwrap()
    }

    // Expand the leftmost nonterminal of every sentential form, discarding
    // forms that contain a terminal or grow beyond `cap`. A nonterminal
    // derives ε iff the search starting from it reaches the empty form.
    fn derives_empty(grammar: &Grammar, symbol: &str) -> bool {
        let cap = 8;
        let mut visited: Set<Vec<Symbol>> = Set::default();
        let mut stack = vec![vec![symbol.to_owned()]];
        while let Some(form) = stack.pop() {
            if form.is_empty() {
                return true;
            }
            if form.len() > cap || !visited.insert(form.clone()) {
                continue;
            }
            let head = &form[0];
            let Some(alternatives) = grammar.productions.get(head) else {
                continue;
            };
            for rhs in alternatives {
                if rhs.iter().any(|s| grammar.is_terminal(s)) {
                    continue;
                }
                let mut next: Vec<Symbol> = rhs.clone();
                next.extend(form[1..].iter().cloned());
                stack.push(next);
            }
        }
        false
    }

    #[test]
    fn nullable_set_matches_brute_force() {
        let grammar = grammar(
            "\
@terminal a, b;
@nonterminal S, A, B, D;
@start S;
@rule S := a B | A;
@rule A := B | A S | b B A B | b;
@rule B := b | b S | a D | @empty;
@rule D := A A;
",
        );
        let nullable = nullable_set(&grammar);
        for symbol in &grammar.nonterminals {
            assert_eq!(
                nullable.contains(symbol),
                derives_empty(&grammar, symbol),
                "disagreement on `{}'",
                symbol
            );
        }
        // B := ε, A := B, D := A A, and S := A, so all four are nullable.
        assert!(nullable.contains("B"));
        assert!(nullable.contains("A"));
        assert!(nullable.contains("D"));
        assert!(nullable.contains("S"));
    }

    #[test]
    fn terminal_bearing_alternative_is_not_a_nullability_witness() {
        let grammar = grammar(
            "\
@terminal a;
@nonterminal S, B;
@start S;
@rule S := a B;
@rule B := @empty;
",
        );
        let nullable = nullable_set(&grammar);
        assert!(nullable.contains("B"));
        assert!(!nullable.contains("S"));
    }

    #[test]
    fn expansion_generates_all_variants() {
        let nullable: Set<Symbol> = ["A".to_owned(), "B".to_owned()].into_iter().collect();
        let rhs: Rhs = vec!["A".to_owned(), "x".to_owned(), "B".to_owned()];
        let variants = expand_alternative(&rhs, &nullable);
        assert_eq!(variants.len(), 4);
        assert_eq!(variants[0], rhs);
        for variant in &variants {
            assert!(variant.contains(&"x".to_owned()));
        }
    }

    #[test]
    fn empty_variant_survives_only_at_start() {
        let mut grammar = grammar(
            "\
@terminal a;
@nonterminal S, A;
@start S;
@rule S := A;
@rule A := a A | @empty;
",
        );
        eliminate_empty(&mut grammar);

        // A keeps `a A` and gains `a`; its ε-alternative is stripped.
        let a = &grammar.productions["A"];
        assert!(!a.iter().any(|rhs| rhs.is_empty()));
        assert!(a.contains(&vec!["a".to_owned()]));

        // S := A is all-nullable, so the start symbol keeps ε.
        let s = &grammar.productions["S"];
        assert!(s.iter().any(|rhs| rhs.is_empty()));
    }
}
