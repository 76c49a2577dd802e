//! Boolean retrieval over lemma posting lists.
//!
//! A query string goes through three total stages: [`tokenize`] into
//! `(token, offset)` pairs, [`to_postfix`] via shunting-yard, and [`evaluate`]
//! as set algebra against the index. Offsets count chars from the start of the
//! query and are carried into every error.

use crate::error::QueryError;
use crate::{DocId, InvertedIndex};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    And,
    Or,
    Not,
    Open,
    Close,
    Term(String),
}

impl Token {
    fn precedence(&self) -> Option<u8> {
        match self {
            Token::Not => Some(3),
            Token::And => Some(2),
            Token::Or => Some(1),
            _ => None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::And => "AND",
            Token::Or => "OR",
            Token::Not => "NOT",
            Token::Open => "(",
            Token::Close => ")",
            Token::Term(_) => "term",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Term(t) => f.write_str(t),
            op => f.write_str(op.symbol()),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Scan a query left to right. Connective words are recognized only as whole
/// words, in any case; `&&`, `||` and `!` are accepted as their symbolic forms.
pub fn tokenize(query: &str) -> Result<Vec<(Token, usize)>, QueryError> {
    let chars: Vec<char> = query.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push((Token::Open, i));
                i += 1;
            }
            ')' => {
                tokens.push((Token::Close, i));
                i += 1;
            }
            '!' => {
                tokens.push((Token::Not, i));
                i += 1;
            }
            '&' | '|' if chars.get(i + 1) == Some(&c) => {
                let op = if c == '&' { Token::And } else { Token::Or };
                tokens.push((op, i));
                i += 2;
            }
            c if is_word_char(c) => {
                let start = i;
                while i < chars.len() && is_word_char(chars[i]) {
                    i += 1;
                }
                let word = chars[start..i].iter().collect::<String>().to_lowercase();
                let token = match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Term(word),
                };
                tokens.push((token, start));
            }
            ch => return Err(QueryError::UnexpectedCharacter { ch, offset: i }),
        }
    }
    Ok(tokens)
}

/// Shunting-yard compile. NOT binds tightest, then AND, then OR. Binary
/// operators are left-associative; NOT is a prefix operator, so a NOT never
/// pops a pending NOT and `NOT NOT a` stays well formed.
///
/// Positions are checked while compiling: a term, NOT or `(` may only start an
/// operand, and AND, OR or `)` may only follow a complete one.
pub fn to_postfix(tokens: Vec<(Token, usize)>) -> Result<Vec<(Token, usize)>, QueryError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut ops: Vec<(Token, usize)> = Vec::new();
    let mut expect_operand = true;
    // Symbol and offset of the previous token.
    let mut last: Option<(&'static str, usize)> = None;
    for (token, offset) in tokens {
        let symbol = token.symbol();
        match token {
            Token::Term(_) | Token::Not | Token::Open if !expect_operand => {
                return Err(QueryError::DanglingOperand { offset });
            }
            Token::And | Token::Or | Token::Close if expect_operand => {
                return Err(match (&token, last) {
                    (Token::Close, Some(("(", open))) => QueryError::EmptyGroup { offset: open },
                    (Token::Close, Some((operator, at))) => {
                        QueryError::MissingOperand { operator, offset: at }
                    }
                    (Token::Close, None) => QueryError::UnmatchedClose { offset },
                    _ => QueryError::MissingOperand { operator: symbol, offset },
                });
            }
            Token::Open => ops.push((token, offset)),
            Token::Close => loop {
                match ops.pop() {
                    Some((Token::Open, _)) => break,
                    Some(op) => output.push(op),
                    None => return Err(QueryError::UnmatchedClose { offset }),
                }
            },
            Token::Term(_) => {
                output.push((token, offset));
                expect_operand = false;
            }
            op => {
                let prec = op.precedence().unwrap_or_default();
                if op != Token::Not {
                    while let Some(top) = ops.last().and_then(|(t, _)| t.precedence()) {
                        if top < prec {
                            break;
                        }
                        output.extend(ops.pop());
                    }
                }
                ops.push((op, offset));
                expect_operand = true;
            }
        }
        last = Some((symbol, offset));
    }
    if expect_operand {
        match last {
            Some(("(", offset)) => return Err(QueryError::UnclosedOpen { offset }),
            Some((operator, offset)) => {
                return Err(QueryError::MissingOperand { operator, offset });
            }
            None => {}
        }
    }
    while let Some((op, offset)) = ops.pop() {
        if op == Token::Open {
            return Err(QueryError::UnclosedOpen { offset });
        }
        output.push((op, offset));
    }
    Ok(output)
}

/// One interpretation of a postfix program.
trait Fold {
    type Value;
    fn term(&mut self, lemma: &str) -> Self::Value;
    fn not(&mut self, operand: Self::Value) -> Self::Value;
    fn and(&mut self, left: Self::Value, right: Self::Value) -> Self::Value;
    fn or(&mut self, left: Self::Value, right: Self::Value) -> Self::Value;
}

fn fold<F: Fold>(postfix: &[(Token, usize)], f: &mut F) -> Result<Option<F::Value>, QueryError> {
    let mut stack: Vec<(F::Value, usize)> = Vec::new();
    for (token, offset) in postfix {
        let offset = *offset;
        let missing = || QueryError::MissingOperand { operator: token.symbol(), offset };
        let value = match token {
            Token::Term(lemma) => f.term(lemma),
            Token::Not => {
                let (operand, _) = stack.pop().ok_or_else(missing)?;
                f.not(operand)
            }
            Token::And | Token::Or => {
                let (right, _) = stack.pop().ok_or_else(missing)?;
                let (left, _) = stack.pop().ok_or_else(missing)?;
                if *token == Token::And { f.and(left, right) } else { f.or(left, right) }
            }
            Token::Open => return Err(QueryError::UnclosedOpen { offset }),
            Token::Close => return Err(QueryError::UnmatchedClose { offset }),
        };
        stack.push((value, offset));
    }
    if let Some((_, offset)) = stack.get(1) {
        return Err(QueryError::DanglingOperand { offset: *offset });
    }
    Ok(stack.pop().map(|(value, _)| value))
}

struct SetAlgebra<'a> {
    index: &'a InvertedIndex,
    universe: Option<BTreeSet<DocId>>,
}

impl Fold for SetAlgebra<'_> {
    type Value = BTreeSet<DocId>;

    fn term(&mut self, lemma: &str) -> Self::Value {
        self.index.postings(lemma).cloned().unwrap_or_default()
    }

    fn not(&mut self, operand: Self::Value) -> Self::Value {
        let index = self.index;
        let universe = self.universe.get_or_insert_with(|| index.universe());
        universe.difference(&operand).copied().collect()
    }

    fn and(&mut self, left: Self::Value, right: Self::Value) -> Self::Value {
        left.intersection(&right).copied().collect()
    }

    fn or(&mut self, mut left: Self::Value, right: Self::Value) -> Self::Value {
        left.extend(right);
        left
    }
}

/// Evaluate a postfix program against `index`. Unknown lemmas match nothing;
/// negation is taken against the registered document universe. An empty
/// program yields an empty result.
pub fn evaluate(
    postfix: &[(Token, usize)],
    index: &InvertedIndex,
) -> Result<Vec<DocId>, QueryError> {
    let mut algebra = SetAlgebra { index, universe: None };
    let result = fold(postfix, &mut algebra)?.unwrap_or_default();
    Ok(result.into_iter().collect())
}

/// Expression tree form of a compiled query, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Term(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Term(t) => write!(f, "{t}"),
            Expr::Not(inner) => write!(f, "NOT {inner}"),
            Expr::And(l, r) => write!(f, "({l} AND {r})"),
            Expr::Or(l, r) => write!(f, "({l} OR {r})"),
        }
    }
}

struct TreeBuilder;

impl Fold for TreeBuilder {
    type Value = Expr;
    fn term(&mut self, lemma: &str) -> Expr { Expr::Term(lemma.to_string()) }
    fn not(&mut self, operand: Expr) -> Expr { Expr::Not(Box::new(operand)) }
    fn and(&mut self, l: Expr, r: Expr) -> Expr { Expr::And(Box::new(l), Box::new(r)) }
    fn or(&mut self, l: Expr, r: Expr) -> Expr { Expr::Or(Box::new(l), Box::new(r)) }
}

/// A compiled query, held in postfix form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    postfix: Vec<(Token, usize)>,
}

impl Query {
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let postfix = to_postfix(tokenize(input)?)?;
        Ok(Self { postfix })
    }

    pub fn postfix(&self) -> &[(Token, usize)] {
        &self.postfix
    }

    /// Rebuild the expression tree. `None` for an empty query.
    pub fn expr(&self) -> Result<Option<Expr>, QueryError> {
        fold(&self.postfix, &mut TreeBuilder)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (token, _)) in self.postfix.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub source_name: String,
}

/// Read-only query front end over a loaded index. Each query is compiled and
/// evaluated independently; a failing query leaves the engine usable.
pub struct QueryEngine<'a> {
    index: &'a InvertedIndex,
}

impl<'a> QueryEngine<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self { index }
    }

    pub fn evaluate(&self, query: &Query) -> Result<Vec<DocId>, QueryError> {
        evaluate(query.postfix(), self.index)
    }

    /// Evaluate a compiled query and attach registered source names.
    pub fn hits(&self, query: &Query) -> Result<Vec<SearchHit>, QueryError> {
        let ids = self.evaluate(query)?;
        tracing::debug!(postfix = %query, hits = ids.len(), "evaluated query");
        Ok(ids
            .into_iter()
            .map(|doc_id| SearchHit {
                doc_id,
                source_name: self.index.source_name(doc_id).unwrap_or_default().to_string(),
            })
            .collect())
    }

    pub fn search(&self, input: &str) -> Result<Vec<SearchHit>, QueryError> {
        self.hits(&Query::parse(input)?)
    }
}
