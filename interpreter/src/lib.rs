use std::io::{self, Stdout, Write};

use ast::*;
use tracing::{debug, trace};

mod environment;
mod error;
mod value;

pub use environment::Environment;
pub use error::*;
pub use value::*;

/// Runs a parsed program against a fresh environment, printing to stdout,
/// and hands back the final variable state.
pub fn run(program: &Program) -> Result<Environment, RuntimeError> {
    let mut interpreter = Interpreter::new();
    interpreter.execute(program)?;
    Ok(interpreter.env)
}

/// A tree-walking interpreter owning one variable environment and the sink
/// `p` statements write to.
///
/// Separate instances share nothing; one instance must not be used from
/// several threads at once.
pub struct Interpreter<W = Stdout> {
    env: Environment,
    out: W,
}

impl Interpreter<Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Self {
        Self {
            env: Environment::new(),
            out,
        }
    }

    /// Parses and executes a program. Lines printed before a fault stay
    /// printed.
    pub fn interpret(&mut self, source: &str) -> Result<(), Error> {
        let program = parser::parse_program(source)?;
        self.execute(&program)?;
        Ok(())
    }

    pub fn interpret_expression(&mut self, source: &str) -> Result<Value, Error> {
        let expression = parser::parse_expression(source)?;
        Ok(self.evaluate(&expression)?)
    }

    pub fn execute(&mut self, program: &Program) -> Result<(), RuntimeError> {
        debug!(statements = program.statements.len(), "executing program");
        program.run(&mut self.env, &mut self.out)
    }

    pub fn execute_statement(&mut self, statement: &Statement) -> Result<(), RuntimeError> {
        statement.run(&mut self.env, &mut self.out)
    }

    pub fn evaluate(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        expression.run(&mut self.env, &mut self.out)
    }

    pub fn variables(&self) -> &Environment {
        &self.env
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

trait Interpretable {
    type Value;
    fn run<W: Write>(
        &self,
        env: &mut Environment,
        out: &mut W,
    ) -> Result<Self::Value, RuntimeError>;
}

impl Interpretable for Block {
    type Value = ();
    fn run<W: Write>(
        &self,
        env: &mut Environment,
        out: &mut W,
    ) -> Result<Self::Value, RuntimeError> {
        for statement in &self.statements {
            statement.run(env, out)?;
        }
        Ok(())
    }
}

impl Interpretable for Statement {
    type Value = ();
    fn run<W: Write>(
        &self,
        env: &mut Environment,
        out: &mut W,
    ) -> Result<Self::Value, RuntimeError> {
        match self {
            Statement::Assignment(Assignment { lhs, rhs }) => {
                let value = rhs.run(env, out)?;
                trace!(name = %lhs, %value, "assign");
                env.assign(lhs, value);
            }
            Statement::IfStatement(IfStatement {
                condition,
                if_branch,
                else_branch,
            }) => {
                if condition.run(env, out)?.expect_boolean("if")? {
                    if_branch.run(env, out)?;
                } else {
                    else_branch.run(env, out)?;
                }
            }
            Statement::WhileStatement(WhileStatement { condition, body }) => {
                let mut iterations = 0usize;
                while condition.run(env, out)?.expect_boolean("while")? {
                    body.run(env, out)?;
                    iterations += 1;
                }
                trace!(iterations, "loop finished");
            }
            Statement::PrintStatement(PrintStatement { expression }) => {
                let value = expression.run(env, out)?;
                writeln!(out, "{value}")?;
            }
        }
        Ok(())
    }
}

impl Value {
    fn expect_boolean(self, context: &'static str) -> Result<bool, RuntimeError> {
        match self {
            Value::Boolean(b) => Ok(b),
            other => Err(RuntimeError::TypeMismatch {
                context,
                found: vec![other.kind()],
            }),
        }
    }
}

impl Interpretable for Expression {
    type Value = Value;

    fn run<W: Write>(
        &self,
        env: &mut Environment,
        out: &mut W,
    ) -> Result<Self::Value, RuntimeError> {
        match self {
            Expression::Binary(left, op, right) => {
                let left = left.run(env, out)?;
                let right = right.run(env, out)?;
                apply_binary(*op, left, right)
            }
            Expression::Not(operand) => {
                let operand = operand.run(env, out)?;
                Ok(Value::Boolean(!operand.expect_boolean("!")?))
            }
            Expression::Identifier(id) => env.lookup(id),
            Expression::IntegerLiteral(v) => Ok(Value::Integer(*v)),
            Expression::BooleanLiteral(v) => Ok(Value::Boolean(*v)),
            Expression::StringLiteral(v) => Ok(Value::Text(v.clone())),
        }
    }
}

fn apply_binary(op: BinaryOperator, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (op, left, right) {
        (BinaryOperator::Equal, l, r) if l.kind() == r.kind() => Ok(Value::Boolean(l == r)),
        (op, Value::Integer(l), Value::Integer(r)) => apply_integer(op, l, r),
        (op, l, r) => Err(RuntimeError::TypeMismatch {
            context: op.symbol(),
            found: vec![l.kind(), r.kind()],
        }),
    }
}

fn apply_integer(op: BinaryOperator, l: i64, r: i64) -> Result<Value, RuntimeError> {
    let checked = |result: Option<i64>| {
        result
            .map(Value::Integer)
            .ok_or(RuntimeError::IntegerOverflow {
                operator: op.symbol(),
            })
    };

    match op {
        BinaryOperator::Plus => checked(l.checked_add(r)),
        BinaryOperator::Minus => checked(l.checked_sub(r)),
        BinaryOperator::Multiply => checked(l.checked_mul(r)),
        BinaryOperator::Divide | BinaryOperator::Modulo if r == 0 => {
            Err(RuntimeError::DivisionByZero {
                operator: op.symbol(),
            })
        }
        BinaryOperator::Divide => checked(l.checked_div(r)),
        BinaryOperator::Modulo => checked(l.checked_rem(r)),
        BinaryOperator::LessThan => Ok(Value::Boolean(l < r)),
        BinaryOperator::GreaterThan => Ok(Value::Boolean(l > r)),
        BinaryOperator::LessThanOrEqual => Ok(Value::Boolean(l <= r)),
        BinaryOperator::GreaterThanOrEqual => Ok(Value::Boolean(l >= r)),
        BinaryOperator::Equal => Ok(Value::Boolean(l == r)),
    }
}
