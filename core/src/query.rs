//! Boolean query syntax and evaluation.
//!
//! Syntax: `-` is prefix NOT, `&` is AND, `|` is OR and parentheses group.
//! NOT binds tightest, then AND, then OR; both binary operators are left
//! associative. Two operands written side by side are joined by AND, so
//! `fox -dog` reads as `fox & -dog`.

use crate::error::QueryError;
use crate::DocSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Term(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn term(t: impl Into<String>) -> Self {
        Expr::Term(t.into())
    }

    pub fn not(e: Expr) -> Self {
        Expr::Not(Box::new(e))
    }

    pub fn and(l: Expr, r: Expr) -> Self {
        Expr::And(Box::new(l), Box::new(r))
    }

    pub fn or(l: Expr, r: Expr) -> Self {
        Expr::Or(Box::new(l), Box::new(r))
    }

    /// Leaf terms in left-to-right order.
    pub fn terms(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_terms(&mut out);
        out
    }

    fn collect_terms<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Term(t) => out.push(t),
            Expr::Not(e) => e.collect_terms(out),
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_terms(out);
                r.collect_terms(out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Term(t) => write!(f, "{t}"),
            Expr::Not(e) => write!(f, "-{e}"),
            Expr::And(l, r) => write!(f, "({l} & {r})"),
            Expr::Or(l, r) => write!(f, "({l} | {r})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "term {s:?}"),
            Token::Not => f.write_str("'-'"),
            Token::And => f.write_str("'&'"),
            Token::Or => f.write_str("'|'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

fn lex(input: &str) -> Result<Vec<(Token, usize)>, QueryError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(pos, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '-' => Token::Not,
            '&' => Token::And,
            '|' => Token::Or,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_alphabetic() => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphabetic() || c == '\'' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Ident(word), pos));
                continue;
            }
            found => return Err(QueryError::UnexpectedChar { found, position: pos }),
        };
        chars.next();
        tokens.push((token, pos));
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn or_expr(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.next();
            let right = self.and_expr()?;
            left = Expr::or(left, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::And) => {
                    self.next();
                }
                Some(Token::Ident(_) | Token::Not | Token::LParen) => {}
                _ => return Ok(left),
            }
            let right = self.unary()?;
            left = Expr::and(left, right);
        }
    }

    fn unary(&mut self) -> Result<Expr, QueryError> {
        if self.peek() == Some(&Token::Not) {
            self.next();
            return Ok(Expr::not(self.unary()?));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, QueryError> {
        match self.next() {
            Some((Token::Ident(word), _)) => Ok(Expr::Term(word)),
            Some((Token::LParen, open)) => {
                let inner = self.or_expr()?;
                match self.next() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((found, position)) => {
                        Err(QueryError::UnexpectedToken { found: found.to_string(), position })
                    }
                    None => Err(QueryError::UnbalancedParen { position: open }),
                }
            }
            Some((Token::RParen, position)) => Err(QueryError::UnbalancedParen { position }),
            Some((found, position)) => {
                Err(QueryError::UnexpectedToken { found: found.to_string(), position })
            }
            None => Err(QueryError::UnexpectedEnd),
        }
    }
}

/// Parses a query into an expression tree.
pub fn parse(input: &str) -> Result<Expr, QueryError> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return Err(QueryError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or_expr()?;
    match parser.next() {
        None => Ok(expr),
        Some((Token::RParen, position)) => Err(QueryError::UnbalancedParen { position }),
        Some((found, position)) => {
            Err(QueryError::UnexpectedToken { found: found.to_string(), position })
        }
    }
}

/// Value of a sub-expression. `Ignored` comes from leaves that must not
/// influence the result (stopwords under filtering) and is neutral for every
/// operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Docs(DocSet),
    Ignored,
}

impl Operand {
    pub fn into_docs(self) -> DocSet {
        match self {
            Operand::Docs(docs) => docs,
            Operand::Ignored => DocSet::new(),
        }
    }
}

fn combine(left: Operand, right: Operand, op: impl FnOnce(DocSet, DocSet) -> DocSet) -> Operand {
    match (left, right) {
        (Operand::Docs(l), Operand::Docs(r)) => Operand::Docs(op(l, r)),
        (Operand::Ignored, other) | (other, Operand::Ignored) => other,
    }
}

/// Post-order evaluation of `expr` over `universe`, resolving leaves through `lookup`.
pub fn evaluate<F, E>(expr: &Expr, universe: &DocSet, lookup: &mut F) -> Result<Operand, E>
where
    F: FnMut(&str) -> Result<Operand, E>,
{
    match expr {
        Expr::Term(term) => lookup(term),
        Expr::Not(inner) => Ok(match evaluate(inner, universe, lookup)? {
            Operand::Docs(docs) => Operand::Docs(universe.difference(&docs).copied().collect()),
            Operand::Ignored => Operand::Ignored,
        }),
        Expr::And(l, r) => {
            let l = evaluate(l, universe, lookup)?;
            let r = evaluate(r, universe, lookup)?;
            Ok(combine(l, r, |a, b| a.intersection(&b).copied().collect()))
        }
        Expr::Or(l, r) => {
            let l = evaluate(l, universe, lookup)?;
            let r = evaluate(r, universe, lookup)?;
            Ok(combine(l, r, |mut a, mut b| {
                a.append(&mut b);
                a
            }))
        }
    }
}
