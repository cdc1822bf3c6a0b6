//! Boolean expressions over pattern labels.
//!
//! Grammar (standard precedence, `&` binds tighter than `|`):
//!
//! ```text
//! expr   := term ('|' term)*
//! term   := factor ('&' factor)*
//! factor := '!'? (IDENT | '(' expr ')')
//! IDENT  := 'P' [0-9]+
//! ```
//!
//! Expressions are parsed into a tagged tree and interpreted directly
//! against a catalog mapping labels to glob patterns. Evaluation is pure
//! and short-circuiting. Parse errors report the byte offset of the
//! offending token.

use std::collections::BTreeMap;
use std::fmt;

use crate::matcher::matches;

/// Parsed boolean expression tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Leaf(String),
}

/// Parse failure with the byte offset of the offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExprParseError {
    /// A character that fits no production.
    UnexpectedChar { position: usize, found: char },
    /// Input ended where a factor or identifier was required.
    UnexpectedEnd { position: usize },
    /// An opening parenthesis was never closed.
    MissingCloseParen { position: usize },
    /// A complete expression was parsed but input remained.
    TrailingInput { position: usize },
    /// `P` was not followed by digits.
    MalformedLabel { position: usize },
}

impl ExprParseError {
    /// Byte offset the error points at.
    pub fn position(&self) -> usize {
        match self {
            Self::UnexpectedChar { position, .. }
            | Self::UnexpectedEnd { position }
            | Self::MissingCloseParen { position }
            | Self::TrailingInput { position }
            | Self::MalformedLabel { position } => *position,
        }
    }
}

impl fmt::Display for ExprParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedChar { position, found } => {
                write!(f, "unexpected character {found:?} at offset {position}")
            }
            Self::UnexpectedEnd { position } => {
                write!(f, "unexpected end of expression at offset {position}")
            }
            Self::MissingCloseParen { position } => {
                write!(f, "missing closing parenthesis at offset {position}")
            }
            Self::TrailingInput { position } => {
                write!(f, "unexpected trailing input at offset {position}")
            }
            Self::MalformedLabel { position } => {
                write!(f, "expected digits after 'P' at offset {position}")
            }
        }
    }
}

impl std::error::Error for ExprParseError {}

/// Evaluation failure: the expression references a label the catalog
/// doesn't define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    pub label: String,
}

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pattern label {:?}", self.label)
    }
}

impl std::error::Error for UnknownLabel {}

/// Parses an expression like `P1 | !P2 & (P3 | P4)`.
pub fn parse(input: &str) -> Result<Expr, ExprParseError> {
    let mut parser = Parser {
        bytes: input.as_bytes(),
        pos: 0,
    };
    let expr = parser.expr()?;
    parser.skip_spaces();
    if parser.pos != parser.bytes.len() {
        return Err(ExprParseError::TrailingInput { position: parser.pos });
    }
    Ok(expr)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_spaces(&mut self) {
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<Expr, ExprParseError> {
        let mut node = self.term()?;
        loop {
            self.skip_spaces();
            if self.peek() == Some(b'|') {
                self.pos += 1;
                let rhs = self.term()?;
                node = Expr::Or(Box::new(node), Box::new(rhs));
            } else {
                return Ok(node);
            }
        }
    }

    fn term(&mut self) -> Result<Expr, ExprParseError> {
        let mut node = self.factor()?;
        loop {
            self.skip_spaces();
            if self.peek() == Some(b'&') {
                self.pos += 1;
                let rhs = self.factor()?;
                node = Expr::And(Box::new(node), Box::new(rhs));
            } else {
                return Ok(node);
            }
        }
    }

    fn factor(&mut self) -> Result<Expr, ExprParseError> {
        self.skip_spaces();
        match self.peek() {
            Some(b'!') => {
                self.pos += 1;
                Ok(Expr::Not(Box::new(self.factor()?)))
            }
            Some(b'(') => {
                self.pos += 1;
                let node = self.expr()?;
                self.skip_spaces();
                if self.peek() != Some(b')') {
                    return Err(ExprParseError::MissingCloseParen { position: self.pos });
                }
                self.pos += 1;
                Ok(node)
            }
            Some(b'P') => self.label(),
            Some(other) => Err(ExprParseError::UnexpectedChar {
                position: self.pos,
                found: other as char,
            }),
            None => Err(ExprParseError::UnexpectedEnd { position: self.pos }),
        }
    }

    fn label(&mut self) -> Result<Expr, ExprParseError> {
        let start = self.pos;
        self.pos += 1; // consume 'P'
        let digits_start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(ExprParseError::MalformedLabel { position: self.pos });
        }
        let label = std::str::from_utf8(&self.bytes[start..self.pos])
            .expect("ASCII label")
            .to_string();
        Ok(Expr::Leaf(label))
    }
}

/// Evaluates `expr` against one string using the label catalog.
///
/// The text is normalized to lower case, matching the solver's ingest
/// canonicalization. Boolean operators short-circuit.
pub fn evaluate(
    expr: &Expr,
    catalog: &BTreeMap<String, String>,
    text: &str,
) -> Result<bool, UnknownLabel> {
    let normalized = text.to_lowercase();
    eval_node(expr, catalog, &normalized)
}

fn eval_node(
    expr: &Expr,
    catalog: &BTreeMap<String, String>,
    text: &str,
) -> Result<bool, UnknownLabel> {
    match expr {
        Expr::Leaf(label) => match catalog.get(label) {
            Some(pattern) => Ok(matches(pattern, text)),
            None => Err(UnknownLabel {
                label: label.clone(),
            }),
        },
        Expr::Not(inner) => Ok(!eval_node(inner, catalog, text)?),
        Expr::And(lhs, rhs) => Ok(eval_node(lhs, catalog, text)? && eval_node(rhs, catalog, text)?),
        Expr::Or(lhs, rhs) => Ok(eval_node(lhs, catalog, text)? || eval_node(rhs, catalog, text)?),
    }
}

/// Coverage metrics of an expression over a labelled dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExprMetrics {
    pub covered: usize,
    pub total_positive: usize,
    pub fp: usize,
    pub fn_: usize,
}

/// Errors from [`evaluate_metrics`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ExprError {
    Parse(ExprParseError),
    UnknownLabel(UnknownLabel),
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::UnknownLabel(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExprError {}

impl From<ExprParseError> for ExprError {
    fn from(err: ExprParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<UnknownLabel> for ExprError {
    fn from(err: UnknownLabel) -> Self {
        Self::UnknownLabel(err)
    }
}

/// Parses `input` and evaluates it over include/exclude datasets.
///
/// This is the verification entry point external tooling uses to check a
/// hypothesis expression against the same data the solver saw.
pub fn evaluate_metrics(
    input: &str,
    catalog: &BTreeMap<String, String>,
    include: &[String],
    exclude: &[String],
) -> Result<ExprMetrics, ExprError> {
    let expr = parse(input)?;
    let mut covered = 0usize;
    for item in include {
        if evaluate(&expr, catalog, item)? {
            covered += 1;
        }
    }
    let mut fp = 0usize;
    for item in exclude {
        if evaluate(&expr, catalog, item)? {
            fp += 1;
        }
    }
    Ok(ExprMetrics {
        covered,
        total_positive: include.len(),
        fp,
        fn_: include.len() - covered,
    })
}
