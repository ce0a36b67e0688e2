//! Syntax support for the grammar definition format.
//!
//! ```text
//! @terminal a, b;
//! @nonterminal S, A, B;
//! @start S;
//! @rule S := a B | A | @empty;
//! ```

use anyhow::{anyhow, bail, ensure};

#[derive(Debug, PartialEq)]
pub enum Stmt {
    Terminals(Vec<String>),
    Nonterminals(Vec<String>),
    Start(String),
    Rule {
        left: String,
        alternatives: Vec<Vec<String>>,
    },
}

pub fn parse(source: &str) -> anyhow::Result<Vec<Stmt>> {
    let span = tracing::trace_span!("parse");
    let _entered = span.enter();

    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let mut stmts = vec![];
    while !parser.at_eoi() {
        stmts.push(parser.stmt()?);
    }
    tracing::trace!(" --> {:?}", stmts);
    Ok(stmts)
}

#[derive(Debug, PartialEq)]
enum Token {
    Terminal,
    Nonterminal,
    Start,
    Rule,
    Empty,
    Ident(String),
    Comma,
    Semicolon,
    ColonEq,
    VertBar,
}

fn tokenize(source: &str) -> anyhow::Result<Vec<Token>> {
    let mut tokens = vec![];
    let mut chars = source.char_indices().peekable();
    while let Some((pos, ch)) = chars.next() {
        match ch {
            _ if ch.is_whitespace() => (),
            ',' => tokens.push(Token::Comma),
            ';' => tokens.push(Token::Semicolon),
            '|' => tokens.push(Token::VertBar),
            ':' => match chars.next() {
                Some((_, '=')) => tokens.push(Token::ColonEq),
                _ => bail!("expecting `=' after `:' at offset {}", pos),
            },
            '/' => {
                // line comment
                ensure!(
                    matches!(chars.peek(), Some((_, '/'))),
                    "unexpected character `/' at offset {}",
                    pos
                );
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '@' => {
                let keyword = take_word(&mut chars, String::new());
                tokens.push(match &*keyword {
                    "terminal" => Token::Terminal,
                    "nonterminal" => Token::Nonterminal,
                    "start" => Token::Start,
                    "rule" => Token::Rule,
                    "empty" => Token::Empty,
                    _ => bail!("unknown keyword `@{}' at offset {}", keyword, pos),
                });
            }
            _ if is_word_char(ch) => {
                let ident = take_word(&mut chars, String::from(ch));
                tokens.push(Token::Ident(ident));
            }
            _ => bail!("unexpected character `{}' at offset {}", ch, pos),
        }
    }
    Ok(tokens)
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || unicode_ident::is_xid_continue(ch)
}

fn take_word(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    mut word: String,
) -> String {
    while let Some(&(_, ch)) = chars.peek() {
        if !is_word_char(ch) {
            break;
        }
        word.push(ch);
        chars.next();
    }
    word
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn at_eoi(&self) -> bool {
        self.pos == self.tokens.len()
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> anyhow::Result<&'t Token> {
        let token = self
            .tokens
            .get(self.pos)
            .ok_or_else(|| anyhow!("unexpected end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> anyhow::Result<()> {
        let token = self.bump()?;
        ensure!(token == expected, "expecting {:?}, found {:?}", expected, token);
        Ok(())
    }

    fn ident(&mut self) -> anyhow::Result<String> {
        match self.bump()? {
            Token::Ident(name) => Ok(name.clone()),
            token => bail!("expecting an identifier, found {:?}", token),
        }
    }

    fn idents(&mut self) -> anyhow::Result<Vec<String>> {
        let mut names = vec![self.ident()?];
        while matches!(self.peek(), Some(Token::Comma)) {
            self.pos += 1;
            // a trailing comma is allowed
            if !matches!(self.peek(), Some(Token::Ident(..))) {
                break;
            }
            names.push(self.ident()?);
        }
        Ok(names)
    }

    fn stmt(&mut self) -> anyhow::Result<Stmt> {
        let stmt = match self.bump()? {
            Token::Terminal => Stmt::Terminals(self.idents()?),
            Token::Nonterminal => Stmt::Nonterminals(self.idents()?),
            Token::Start => Stmt::Start(self.ident()?),
            Token::Rule => {
                let left = self.ident()?;
                self.expect(&Token::ColonEq)?;
                // a leading vertical bar is allowed
                if matches!(self.peek(), Some(Token::VertBar)) {
                    self.pos += 1;
                }
                let mut alternatives = vec![self.alternative()?];
                while matches!(self.peek(), Some(Token::VertBar)) {
                    self.pos += 1;
                    alternatives.push(self.alternative()?);
                }
                Stmt::Rule { left, alternatives }
            }
            token => bail!("expecting a statement, found {:?}", token),
        };
        self.expect(&Token::Semicolon)?;
        Ok(stmt)
    }

    fn alternative(&mut self) -> anyhow::Result<Vec<String>> {
        if matches!(self.peek(), Some(Token::Empty)) {
            self.pos += 1;
            return Ok(vec![]);
        }
        let mut elems = vec![self.ident()?];
        while matches!(self.peek(), Some(Token::Ident(..))) {
            elems.push(self.ident()?);
        }
        Ok(elems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoketest() {
        let input = "\
// comment
@terminal a, b;
@nonterminal S, A;
@start S;
@rule S := a A b | A;
@rule A :=
      @empty
    | a S
    ;
";
        let stmts = parse(input).unwrap();
        assert_eq!(stmts.len(), 5);
        assert_eq!(
            stmts[0],
            Stmt::Terminals(vec!["a".to_owned(), "b".to_owned()])
        );
        assert_eq!(
            stmts[4],
            Stmt::Rule {
                left: "A".to_owned(),
                alternatives: vec![vec![], vec!["a".to_owned(), "S".to_owned()]],
            }
        );
    }

    #[test]
    fn rejects_unknown_keyword() {
        assert!(parse("@token a;").is_err());
    }

    #[test]
    fn rejects_missing_semicolon() {
        assert!(parse("@start S").is_err());
    }
}
