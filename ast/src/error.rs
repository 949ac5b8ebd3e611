use std::{
    fmt::{self, Display, Formatter},
    io,
    ops::Range,
};

use ariadne::{Config, Label, Report, ReportKind, Source};
use yansi::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    Syntax,
    Runtime,
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Syntax => write!(f, "Syntax Error"),
            DiagnosticKind::Runtime => write!(f, "Runtime Error"),
        }
    }
}

/// A user facing error, detached from the crate that produced it.
///
/// Syntax errors always point into the source. Runtime errors carry no
/// position since the tree does not keep spans.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    range: Option<Range<usize>>,
    message: String,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, range: Option<Range<usize>>, message: String) -> Self {
        Self {
            kind,
            range,
            message,
        }
    }

    /// `range` counts characters, not bytes.
    pub fn syntax<M: ToString>(range: Range<usize>, message: M) -> Self {
        Self::new(DiagnosticKind::Syntax, Some(range), message.to_string())
    }

    pub fn runtime<M: ToString>(message: M) -> Self {
        Self::new(DiagnosticKind::Runtime, None, message.to_string())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> Option<Range<usize>> {
        self.range.clone()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn build_report(&self, source_len: usize, color: bool) -> Report<'_> {
        let config = Config::default().with_color(color);
        match &self.range {
            // ariadne wants a non-empty label that lies inside the source.
            Some(range) if source_len > 0 => {
                let start = range.start.min(source_len - 1);
                let end = range.end.min(source_len).max(start + 1);
                Report::build(ReportKind::Error, (), start)
                    .with_config(config)
                    .with_message(self.kind.to_string())
                    .with_label(
                        Label::new(start..end)
                            .with_message(&self.message)
                            .with_color(Color::Red),
                    )
                    .finish()
            }
            _ => Report::build(ReportKind::Error, (), 0)
                .with_config(config)
                .with_message(self.to_string())
                .finish(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

pub struct DiagnosticPrinter {
    source: Source,
    source_len: usize,
    color: bool,
}

impl DiagnosticPrinter {
    pub fn new(input: &str) -> Self {
        Self {
            source: Source::from(input),
            source_len: input.chars().count(),
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn eprint(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        diagnostic
            .build_report(self.source_len, self.color)
            .eprint(&mut self.source)
    }

    pub fn format(&mut self, diagnostic: &Diagnostic) -> io::Result<String> {
        let mut buffer = Vec::new();
        diagnostic
            .build_report(self.source_len, self.color)
            .write(&mut self.source, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
