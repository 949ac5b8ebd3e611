use std::{fs, io, path::PathBuf, process::ExitCode};

use ast::{Diagnostic, DiagnosticPrinter};
use clap::Parser;
use interpreter::Interpreter;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Runs programs written in a small PL/0 style language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Treat SOURCE as program text instead of a file path.
    #[arg(short, long)]
    inline: bool,

    /// Evaluate SOURCE as a single expression and print its value.
    #[arg(short, long)]
    expr: bool,

    /// Parse only and print the syntax tree.
    #[arg(long)]
    ast: bool,

    /// Print every variable after the program finished.
    #[arg(long, conflicts_with_all = ["expr", "ast"])]
    dump_vars: bool,

    /// Log more. Repeat for even more. RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    source: String,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn report(source: &str, diagnostic: &Diagnostic) {
    if let Err(e) = DiagnosticPrinter::new(source).eprint(diagnostic) {
        error!(error = %e, "failed to render diagnostic");
        eprintln!("{diagnostic}");
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let source = if args.inline {
        args.source.clone()
    } else {
        let path = PathBuf::from(&args.source);
        debug!(path = %path.display(), "reading program");
        match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Failed to read '{}': {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
    };

    if args.ast {
        let parsed = if args.expr {
            parser::parse_expression(&source).map(|e| format!("{e:#?}"))
        } else {
            parser::parse_program(&source).map(|p| format!("{p:#?}"))
        };
        return match parsed {
            Ok(tree) => {
                println!("{tree}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                report(&source, &e.diagnostic(&source));
                ExitCode::FAILURE
            }
        };
    }

    let mut interpreter = Interpreter::new();

    let result = if args.expr {
        interpreter
            .interpret_expression(&source)
            .map(|value| println!("{value}"))
    } else {
        interpreter.interpret(&source)
    };

    if let Err(e) = result {
        report(&source, &e.diagnostic(&source));
        return ExitCode::FAILURE;
    }

    if args.dump_vars {
        for (name, value) in interpreter.variables().snapshot() {
            println!("{name} = {value}");
        }
    }

    ExitCode::SUCCESS
}
