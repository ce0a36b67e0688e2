use cnform::{
    cnf::{is_cnf, normalize},
    grammar::{Grammar, Symbol},
    types::Set,
};

fn grammar(source: &str) -> Grammar {
    Grammar::from_str(source).unwrap()
}

/// Brute-force derivation check for grammars in CNF.
///
/// Expands the leftmost nonterminal of each sentential form; since no
/// alternative shrinks a form (ε is confined to the start symbol), forms
/// longer than the target can be pruned.
fn derives(grammar: &Grammar, target: &[&str]) -> bool {
    let target: Vec<Symbol> = target.iter().map(|s| s.to_string()).collect();
    if target.is_empty() {
        return grammar
            .productions
            .get(&grammar.start_symbol)
            .map_or(false, |alternatives| alternatives.contains(&vec![]));
    }

    let mut visited: Set<Vec<Symbol>> = Set::default();
    let mut stack = vec![vec![grammar.start_symbol.clone()]];
    while let Some(form) = stack.pop() {
        if form == target {
            return true;
        }
        if form.len() > target.len() || !visited.insert(form.clone()) {
            continue;
        }
        let Some(pos) = form.iter().position(|s| grammar.is_nonterminal(s)) else {
            continue;
        };
        if form[..pos] != target[..pos] {
            continue;
        }
        for rhs in grammar.productions.get(&form[pos]).into_iter().flatten() {
            if rhs.is_empty() {
                continue;
            }
            let mut next = form[..pos].to_vec();
            next.extend(rhs.iter().cloned());
            next.extend(form[pos + 1..].iter().cloned());
            stack.push(next);
        }
    }
    false
}

fn reachable_nonterminals(grammar: &Grammar) -> Set<Symbol> {
    let mut visited: Set<Symbol> = Set::default();
    let mut stack = vec![grammar.start_symbol.clone()];
    while let Some(node) = stack.pop() {
        if !grammar.is_nonterminal(&node) || !visited.insert(node.clone()) {
            continue;
        }
        for rhs in grammar.productions.get(&node).into_iter().flatten() {
            stack.extend(rhs.iter().cloned());
        }
    }
    visited
}

fn productive_nonterminals(grammar: &Grammar) -> Set<Symbol> {
    let mut productive: Set<Symbol> = Set::default();
    loop {
        let mut changed = false;
        for (left, alternatives) in &grammar.productions {
            if productive.contains(left) {
                continue;
            }
            let witnessed = alternatives.iter().any(|rhs| {
                rhs.iter()
                    .all(|s| grammar.is_terminal(s) || productive.contains(s))
            });
            if witnessed {
                productive.insert(left.clone());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    productive
}

fn assert_normalized_invariants(normalized: &Grammar) {
    assert!(is_cnf(normalized), "result is not in CNF:\n{}", normalized);
    assert_eq!(
        reachable_nonterminals(normalized),
        normalized.nonterminals,
        "unreachable nonterminal survived"
    );
    assert_eq!(
        productive_nonterminals(normalized),
        normalized.nonterminals,
        "unproductive nonterminal survived"
    );
    for nonterminal in &normalized.nonterminals {
        assert!(
            !normalized.terminals.contains(nonterminal),
            "`{}' is both terminal and nonterminal",
            nonterminal
        );
    }
}

#[test]
fn course_grammar() {
    let input = grammar(
        "\
@terminal a, b;
@nonterminal S, A, B, C, D;
@start S;
@rule S := a B | A;
@rule A := B | A S | b B A B | b;
@rule B := b | b S | a D | @empty;
@rule D := A A;
@rule C := B a;
",
    );
    let normalized = normalize(input);
    assert_normalized_invariants(&normalized);

    // C is unreachable from the start symbol and must be gone.
    assert!(!normalized.is_nonterminal("C"));
    assert!(!normalized.productions.contains_key("C"));

    // "b" stays derivable, and so does ε: S ⇒ A ⇒ B ⇒ ε, so the wrapped
    // start symbol keeps its empty alternative.
    assert!(derives(&normalized, &["b"]));
    assert!(derives(&normalized, &[]));

    // a few longer spot checks: S ⇒ aB ⇒ ab, and S ⇒ A ⇒ AS ⇒ bS ⇒ baB ⇒ bab
    assert!(derives(&normalized, &["a", "b"]));
    assert!(derives(&normalized, &["b", "a", "b"]));
}

#[test]
fn unit_cycle_grammar() {
    let normalized = normalize(grammar(
        "\
@terminal a;
@nonterminal A, B;
@start A;
@rule A := B | a;
@rule B := A;
",
    ));
    assert_normalized_invariants(&normalized);
    assert!(derives(&normalized, &["a"]));
}

#[test]
fn unreachable_nonterminal_is_dropped() {
    let normalized = normalize(grammar(
        "\
@terminal a, z;
@nonterminal S, Z;
@start S;
@rule S := a S | a;
@rule Z := z;
",
    ));
    assert_normalized_invariants(&normalized);
    assert!(!normalized.is_nonterminal("Z"));
    assert!(!normalized.productions.contains_key("Z"));
}

#[test]
fn unproductive_nonterminal_is_dropped() {
    let normalized = normalize(grammar(
        "\
@terminal a;
@nonterminal S, Y;
@start S;
@rule S := a | a Y;
@rule Y := Y;
",
    ));
    assert_normalized_invariants(&normalized);
    assert!(!normalized.is_nonterminal("Y"));
    assert!(derives(&normalized, &["a"]));
}

#[test]
fn nullable_start_keeps_epsilon() {
    let normalized = normalize(grammar(
        "\
@terminal a;
@nonterminal S;
@start S;
@rule S := a S a | @empty;
",
    ));
    assert_normalized_invariants(&normalized);
    assert!(derives(&normalized, &[]));
    assert!(derives(&normalized, &["a", "a"]));
    assert!(!derives(&normalized, &["a"]));
}

#[test]
fn minted_symbols_avoid_user_chosen_names() {
    // `A0` is a user terminal and `A` a user nonterminal; binarization must
    // route around both when minting its chain symbols.
    let normalized = normalize(grammar(
        "\
@terminal a, A0;
@nonterminal S, A;
@start S;
@rule S := a A a A0;
@rule A := a;
",
    ));
    assert_normalized_invariants(&normalized);
    assert!(normalized.is_terminal("A0"));
    assert!(!normalized.is_nonterminal("A0"));
    assert!(derives(&normalized, &["a", "a", "a", "A0"]));
}

#[test]
fn cnf_input_stays_cnf() {
    let normalized = normalize(grammar(
        "\
@terminal a, b;
@nonterminal S, A, B;
@start S;
@rule S := A B | a;
@rule A := a;
@rule B := b;
",
    ));
    assert_normalized_invariants(&normalized);
    assert!(derives(&normalized, &["a"]));
    assert!(derives(&normalized, &["a", "b"]));
}
