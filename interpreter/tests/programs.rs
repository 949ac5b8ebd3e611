use std::io::{self, Write};

use insta::assert_snapshot;
use interpreter::{Error, Interpreter, RuntimeError, Value};

fn run_and_collect_output(source: &str) -> String {
    let mut interpreter = Interpreter::with_output(Vec::new());

    if let Err(e) = interpreter.interpret(source) {
        let out = String::from_utf8_lossy(interpreter.output());
        panic!("Script output: {out}\nInterpret error: {e}");
    }

    let out = String::from_utf8(interpreter.into_output()).unwrap();
    out.trim_end().to_string()
}

#[test]
fn print_statement() {
    assert_snapshot!(run_and_collect_output("p 17*2"), @"34");
}

#[test]
fn if_statement() {
    let output = run_and_collect_output(
        r#"
        if (3 < 8) {
          p "hello"
        } else {
          p "bye"
        }
        "#,
    );

    assert_snapshot!(output, @"hello");
}

#[test]
fn else_branch() {
    let output = run_and_collect_output(r#"if (!(3 < 8)) { p "hello" } else { p "bye" }"#);

    assert_snapshot!(output, @"bye");
}

#[test]
fn reassignment_does_not_touch_copies() {
    let output = run_and_collect_output(
        r#"
        a = 3
        foo = a
        a = 99
        p foo
        p a
        "#,
    );

    assert_snapshot!(output, @r###"
    3
    99
    "###);
}

#[test]
fn arithmetic_program() {
    let output = run_and_collect_output(
        r#"
        foo = 2
        bar = 34
        baz = foo + bar / 2
        p baz + 4
        "#,
    );

    assert_snapshot!(output, @"23");
}

#[test]
fn parenthesised_program() {
    let output = run_and_collect_output(
        r#"
        foo = 2
        bar = 34
        baz = (foo + bar) / 2
        p baz + 4
        "#,
    );

    assert_snapshot!(output, @"22");
}

#[test]
fn countdown() {
    let output = run_and_collect_output(
        r#"
        i = 10

        while (i > 0) {
            p i
            i = i - 1
        }
        "#,
    );

    assert_snapshot!(output, @r###"
    10
    9
    8
    7
    6
    5
    4
    3
    2
    1
    "###);
}

#[test]
fn nested_control_flow() {
    let output = run_and_collect_output(
        r#"
        i = 1
        while (i <= 20)
        {
            if (i % 3 == 0)
            {
                p "Foo"
            } else {}

            if (i % 5 == 0)
            {
                p "Bar"
            } else {}

            i = i + 1
        }
        "#,
    );

    assert_snapshot!(output, @r###"
    Foo
    Bar
    Foo
    Foo
    Bar
    Foo
    Foo
    Bar
    Foo
    Bar
    "###);
}

#[test]
fn values_render_without_quotes() {
    let output = run_and_collect_output(
        r#"
        p "hello world"
        p 1 < 2
        p 0 - 5
        "#,
    );

    assert_snapshot!(output, @r###"
    hello world
    true
    -5
    "###);
}

#[test]
fn empty_program_prints_nothing() {
    let mut interpreter = Interpreter::with_output(Vec::new());

    interpreter.interpret("").unwrap();

    assert!(interpreter.output().is_empty());
    assert!(interpreter.variables().is_empty());
}

#[test]
fn runs_are_deterministic() {
    let source = r#"
        n = 1
        while (n < 50) { p n n = n * 3 }
        p "done"
    "#;

    assert_eq!(run_and_collect_output(source), run_and_collect_output(source));
}

#[test]
fn body_assignments_outlive_the_body() {
    let mut interpreter = Interpreter::with_output(Vec::new());

    interpreter
        .interpret(
            r#"
            if (true) { inner = 1 } else { }
            i = 0
            while (i < 3) { last = i i = i + 1 }
            "#,
        )
        .unwrap();

    let vars = interpreter.variables();
    assert_eq!(vars.get("inner"), Some(&Value::Integer(1)));
    assert_eq!(vars.get("last"), Some(&Value::Integer(2)));
    assert_eq!(vars.get("i"), Some(&Value::Integer(3)));
}

#[test]
fn empty_loop_body_still_terminates() {
    let mut interpreter = Interpreter::with_output(Vec::new());

    interpreter.interpret("while (false) { }").unwrap();

    assert!(interpreter.variables().is_empty());
}

#[test]
fn output_before_a_fault_is_kept() {
    let mut interpreter = Interpreter::with_output(Vec::new());

    let result = interpreter.interpret(
        r#"
        i = 3
        while (i > 0) {
            p 12 / (i - 1)
            i = i - 1
        }
        p "unreachable"
        "#,
    );

    assert!(matches!(
        result,
        Err(Error::Runtime(RuntimeError::DivisionByZero { operator: "/" }))
    ));
    assert_eq!(interpreter.output(), b"6\n12\n");
    assert_eq!(interpreter.variables().get("i"), Some(&Value::Integer(1)));
}

#[test]
fn snapshot_of_final_state() {
    let mut interpreter = Interpreter::with_output(Vec::new());

    interpreter
        .interpret(r#"b = "two" a = 1 c = a == 1"#)
        .unwrap();

    let snapshot = interpreter.variables().snapshot();
    let rendered: Vec<_> = snapshot
        .iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .collect();
    assert_eq!(rendered, ["a = 1", "b = two", "c = true"]);
}

struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn failing_sink_is_a_fault() {
    let mut interpreter = Interpreter::with_output(BrokenSink);

    let result = interpreter.interpret("a = 1 p a a = 2");

    assert!(matches!(
        result,
        Err(Error::Runtime(RuntimeError::Output(_)))
    ));
    assert_eq!(interpreter.variables().get("a"), Some(&Value::Integer(1)));
}

#[test]
fn diagnostics_for_both_error_kinds() {
    let mut interpreter = Interpreter::with_output(Vec::new());

    let syntax = interpreter.interpret("a = (1").unwrap_err();
    assert_eq!(syntax.diagnostic("a = (1").kind(), ast::DiagnosticKind::Syntax);

    let runtime = interpreter.interpret("p nope").unwrap_err();
    let diagnostic = runtime.diagnostic("p nope");
    assert_eq!(diagnostic.kind(), ast::DiagnosticKind::Runtime);
    assert_eq!(diagnostic.message(), "undefined variable `nope`");
}
