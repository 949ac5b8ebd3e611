use std::io;

use ast::Diagnostic;
use parser::SyntaxError;

use crate::ValueKind;

#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    #[error("undefined variable `{name}`")]
    UndefinedVariable { name: String },

    #[error("type mismatch: `{context}` cannot be applied to {}", describe(.found))]
    TypeMismatch {
        context: &'static str,
        found: Vec<ValueKind>,
    },

    #[error("division by zero in `{operator}`")]
    DivisionByZero { operator: &'static str },

    #[error("integer overflow in `{operator}`")]
    IntegerOverflow { operator: &'static str },

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl RuntimeError {
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::runtime(self)
    }
}

fn describe(found: &[ValueKind]) -> String {
    match found {
        [kind] => kind.to_string(),
        [lhs, rhs] => format!("{lhs} and {rhs}"),
        kinds => kinds
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Failure of one of the entry points that take source text.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn diagnostic(&self, source: &str) -> Diagnostic {
        match self {
            Error::Syntax(e) => e.diagnostic(source),
            Error::Runtime(e) => e.diagnostic(),
        }
    }
}
