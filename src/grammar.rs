//! Grammar types.

use crate::{
    syntax as s,
    types::{Map, Set},
};
use std::{fmt, fs, io, path::Path};

/// A grammar symbol, terminal or non-terminal.
pub type Symbol = String;

/// The right-hand side of a single production alternative.
///
/// An empty sequence represents ε.
pub type Rhs = Vec<Symbol>;

/// A context-free grammar over string symbols.
///
/// Invariants expected from a well-formed value: `start_symbol` is a declared
/// non-terminal, the terminal and non-terminal sets are disjoint, and every
/// symbol appearing on a right-hand side is declared in one of the two sets.
/// The [`GrammarDef`] builder enforces all of them.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub start_symbol: Symbol,
    pub nonterminals: Set<Symbol>,
    pub terminals: Set<Symbol>,
    /// Alternatives keyed by their left-hand side.
    pub productions: Map<Symbol, Vec<Rhs>>,
}

impl Grammar {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Grammar, GrammarDefError> {
        let source = fs::read_to_string(path).map_err(GrammarDefError::IO)?;
        Self::from_str(&source)
    }

    pub fn from_str(source: &str) -> Result<Grammar, GrammarDefError> {
        let stmts = s::parse(source).map_err(GrammarDefError::Syntax)?;
        Grammar::define(|g| define_grammar_from_syntax(g, &stmts))
    }

    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef::default();
        f(&mut def)?;
        def.end()
    }

    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminals.contains(symbol)
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.nonterminals.contains(symbol)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in &self.terminals {
            writeln!(f, "{}", terminal)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in &self.nonterminals {
            write!(f, "{}", nonterminal)?;
            if *nonterminal == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## productions:")?;
        let mut lefts: Vec<&Symbol> = self.productions.keys().collect();
        lefts.sort();
        for left in lefts {
            for rhs in &self.productions[left] {
                write!(f, "{} :=", left)?;
                if rhs.is_empty() {
                    write!(f, " ε")?;
                } else {
                    for symbol in rhs {
                        write!(f, " {}", symbol)?;
                    }
                }
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

fn define_grammar_from_syntax(
    g: &mut GrammarDef,
    stmts: &[s::Stmt],
) -> Result<(), GrammarDefError> {
    // Declarations are processed before any rule, regardless of their
    // position in the source file.
    for stmt in stmts {
        match stmt {
            s::Stmt::Terminals(names) => {
                for name in names {
                    g.terminal(name)?;
                }
            }
            s::Stmt::Nonterminals(names) => {
                for name in names {
                    g.nonterminal(name)?;
                }
            }
            _ => (),
        }
    }

    for stmt in stmts {
        match stmt {
            s::Stmt::Start(name) => {
                g.start_symbol(name)?;
            }
            s::Stmt::Rule { left, alternatives } => {
                // 未登場の記号は非終端記号と解釈する
                if !g.is_declared(left) {
                    g.nonterminal(left)?;
                }
                for alternative in alternatives {
                    for symbol in alternative {
                        if !g.is_declared(symbol) {
                            g.nonterminal(symbol)?;
                        }
                    }
                    g.rule(left, alternative.iter().cloned())?;
                }
            }
            _ => (),
        }
    }

    Ok(())
}

/// The contextural values for building a `Grammar`.
#[derive(Debug, Default)]
pub struct GrammarDef {
    terminals: Set<Symbol>,
    nonterminals: Set<Symbol>,
    productions: Map<Symbol, Vec<Rhs>>,
    start: Option<Symbol>,
}

impl GrammarDef {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(&mut self, name: &str) -> Result<Symbol, GrammarDefError> {
        if !verify_ident(name) {
            return Err(format!("incorrect terminal name: `{}'", name).into());
        }
        if self.nonterminals.contains(name) {
            return Err(format!("`{}' is already declared as a nonterminal", name).into());
        }
        if !self.terminals.insert(name.to_owned()) {
            return Err(format!("the terminal `{}' has already been declared", name).into());
        }
        Ok(name.to_owned())
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<Symbol, GrammarDefError> {
        if !verify_ident(name) {
            return Err(format!("incorrect symbol name: `{}'", name).into());
        }
        if self.terminals.contains(name) {
            return Err(format!("`{}' is already declared as a terminal", name).into());
        }
        if !self.nonterminals.insert(name.to_owned()) {
            return Err(format!("the nonterminal `{}' has already been declared", name).into());
        }
        Ok(name.to_owned())
    }

    /// Specify a production rule into this grammar.
    pub fn rule<I>(&mut self, left: &str, right: I) -> Result<(), GrammarDefError>
    where
        I: IntoIterator<Item = Symbol>,
    {
        if !self.nonterminals.contains(left) {
            return Err(format!(
                "the left-hand side `{}' is not a declared nonterminal",
                left
            )
            .into());
        }

        let right: Rhs = right.into_iter().collect();
        for symbol in &right {
            if !self.terminals.contains(symbol) && !self.nonterminals.contains(symbol) {
                return Err(format!("undeclared symbol `{}' on a right-hand side", symbol).into());
            }
        }

        let alternatives = self.productions.entry(left.to_owned()).or_default();
        if alternatives.contains(&right) {
            return Err("Duplicate production rule detected".into());
        }
        alternatives.push(right);

        Ok(())
    }

    /// Specify the start symbol for this grammar.
    pub fn start_symbol(&mut self, symbol: &str) -> Result<(), GrammarDefError> {
        if !self.nonterminals.contains(symbol) {
            return Err(format!("unknown start symbol: `{}'", symbol).into());
        }
        self.start.replace(symbol.to_owned());
        Ok(())
    }

    pub(crate) fn is_declared(&self, name: &str) -> bool {
        self.terminals.contains(name) || self.nonterminals.contains(name)
    }

    fn end(mut self) -> Result<Grammar, GrammarDefError> {
        // 指定されていない場合は最初に登録されたnonterminal symbolを用いる
        let start = match self.start.take() {
            Some(start) => start,
            None => self
                .nonterminals
                .first()
                .cloned()
                .ok_or_else(|| GrammarDefError::Other {
                    msg: "empty nonterminal symbols".into(),
                })?,
        };

        Ok(Grammar {
            start_symbol: start,
            nonterminals: self.nonterminals,
            terminals: self.terminals,
            productions: self.productions,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("IO error: {}", _0)]
    IO(io::Error),

    #[error("Syntax error: {}", _0)]
    Syntax(anyhow::Error),

    #[error("Other error: {}", msg)]
    Other { msg: String },
}
impl From<&str> for GrammarDefError {
    fn from(msg: &str) -> Self {
        Self::Other { msg: msg.into() }
    }
}
impl From<String> for GrammarDefError {
    fn from(msg: String) -> Self {
        Self::Other { msg }
    }
}

fn verify_ident(s: &str) -> bool {
    if s.is_empty() {
        // The identifier must not be empty.
        return false;
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        // The number must not be identifer.
        return false;
    }

    let mut chars = s.chars();
    let first = chars.next().unwrap();
    if !is_ident_start(first) {
        // The identifier must be started with XID-Start.
        return false;
    }
    if chars.any(|ch| !is_ident_continue(ch)) {
        // The idenfier must be continued with XID-Continue.
        return false;
    }

    true
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || unicode_ident::is_xid_start(ch)
}

fn is_ident_continue(ch: char) -> bool {
    unicode_ident::is_xid_continue(ch)
}
