use std::borrow::Cow;

use ast::Diagnostic;
use pest::{
    error::{Error, ErrorVariant, InputLocation, LineColLocation},
    Span,
};

use crate::Rule;

/// The input did not match the grammar.
///
/// Points at the furthest position the parser reached before giving up.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("{0}")]
pub struct SyntaxError(Box<Error<Rule>>);

impl From<Error<Rule>> for SyntaxError {
    fn from(error: Error<Rule>) -> Self {
        Self(Box::new(error.renamed_rules(describe_rule)))
    }
}

impl SyntaxError {
    pub(crate) fn custom<M: ToString>(span: Span<'_>, message: M) -> Self {
        Error::new_from_span(
            ErrorVariant::CustomError {
                message: message.to_string(),
            },
            span,
        )
        .into()
    }

    /// Byte offset into the source.
    pub fn offset(&self) -> usize {
        match self.0.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        }
    }

    /// One-based line and column.
    pub fn line_col(&self) -> (usize, usize) {
        match self.0.line_col {
            LineColLocation::Pos(line_col) => line_col,
            LineColLocation::Span(start, _) => start,
        }
    }

    /// The source line the error points into.
    pub fn fragment(&self) -> &str {
        self.0.line()
    }

    pub fn message(&self) -> Cow<'_, str> {
        self.0.variant.message()
    }

    pub fn diagnostic(&self, source: &str) -> Diagnostic {
        let (start, end) = match self.0.location {
            InputLocation::Pos(pos) => (pos, pos),
            InputLocation::Span(span) => span,
        };
        let chars = |offset: usize| {
            source
                .get(..offset)
                .map_or(offset, |prefix| prefix.chars().count())
        };
        Diagnostic::syntax(chars(start)..chars(end), self.message())
    }
}

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::EOI => "end of input",
        Rule::Stmt | Rule::StmtInput => "statement",
        Rule::Expr | Rule::ExprInput | Rule::Arith => "expression",
        Rule::Block => "block",
        Rule::Assign => "assignment",
        Rule::Print => "print statement",
        Rule::If => "if statement",
        Rule::While => "while statement",
        Rule::Le | Rule::Ge | Rule::Eq | Rule::Lt | Rule::Gt => "comparison operator",
        Rule::Add | Rule::Sub | Rule::Mul | Rule::Div | Rule::Rem => "arithmetic operator",
        Rule::Not => "`!`",
        Rule::Int => "integer",
        Rule::Str => "string",
        Rule::True | Rule::False => "boolean",
        Rule::Ident => "identifier",
        Rule::Keyword | Rule::PrintKw => "keyword",
        Rule::Program => "program",
        other => return format!("{other:?}"),
    }
    .to_string()
}
