use std::sync::OnceLock;

use ast::*;
use pest::{
    iterators::{Pair, Pairs},
    pratt_parser::{Assoc, Op, PrattParser},
    Parser,
};
use tracing::debug;

mod error;

pub use error::*;

#[derive(pest_derive::Parser)]
#[grammar = "grammar.pest"]
struct Pl0Parser;

/// Parses a whole program. Empty input is an empty program.
pub fn parse(input: &str) -> Result<Program, SyntaxError> {
    parse_program(input)
}

pub fn parse_program(input: &str) -> Result<Program, SyntaxError> {
    debug!(bytes = input.len(), "parsing program");

    let pair = parse_entry(Rule::Program, input)?;
    let mut statements = vec![];
    for pair in pair.into_inner() {
        match pair.as_rule() {
            Rule::Stmt => statements.push(build_statement_from_pair(pair)?),
            Rule::EOI => {}
            r => unreachable!("Unexpected rule in program: {r:?}"),
        }
    }
    Ok(Program::new(statements))
}

pub fn parse_expression(input: &str) -> Result<Expression, SyntaxError> {
    debug!(bytes = input.len(), "parsing expression");

    let mut pairs = parse_entry(Rule::ExprInput, input)?.into_inner();
    build_expression_from_pair(next_child(&mut pairs, Rule::ExprInput))
}

pub fn parse_statement(input: &str) -> Result<Statement, SyntaxError> {
    debug!(bytes = input.len(), "parsing statement");

    let mut pairs = parse_entry(Rule::StmtInput, input)?.into_inner();
    build_statement_from_pair(next_child(&mut pairs, Rule::StmtInput))
}

fn parse_entry(rule: Rule, input: &str) -> Result<Pair<'_, Rule>, SyntaxError> {
    let mut pairs = Pl0Parser::parse(rule, input)?;
    Ok(next_child(&mut pairs, rule))
}

/// Takes a child the grammar guarantees to be present.
fn next_child<'i>(pairs: &mut Pairs<'i, Rule>, parent: Rule) -> Pair<'i, Rule> {
    match pairs.next() {
        Some(pair) => pair,
        None => unreachable!("{parent:?} is missing a child"),
    }
}

fn build_statement_from_pair(pair: Pair<Rule>) -> Result<Statement, SyntaxError> {
    debug_assert_eq!(pair.as_rule(), Rule::Stmt);

    let mut pairs = pair.into_inner();
    let pair = next_child(&mut pairs, Rule::Stmt);

    let stmt = match pair.as_rule() {
        Rule::Assign => Statement::Assignment(build_assignment_from_pair(pair)?),
        Rule::Print => {
            let mut pairs = pair.into_inner();
            let expression = build_expression_from_pair(next_child(&mut pairs, Rule::Print))?;

            debug_assert_eq!(pairs.next(), None);

            Statement::PrintStatement(PrintStatement { expression })
        }
        Rule::If => Statement::IfStatement(build_if_from_pair(pair)?),
        Rule::While => Statement::WhileStatement(build_while_from_pair(pair)?),
        r => unreachable!("Unexpected rule in statement: {r:?}"),
    };

    debug_assert_eq!(pairs.next(), None);

    Ok(stmt)
}

fn build_assignment_from_pair(pair: Pair<Rule>) -> Result<Assignment, SyntaxError> {
    debug_assert_eq!(pair.as_rule(), Rule::Assign);

    let mut pairs = pair.into_inner();
    let identifier = build_identifier_from_pair(next_child(&mut pairs, Rule::Assign));
    let expression = build_expression_from_pair(next_child(&mut pairs, Rule::Assign))?;

    debug_assert_eq!(pairs.next(), None);

    Ok(Assignment {
        lhs: identifier,
        rhs: expression,
    })
}

fn build_if_from_pair(pair: Pair<Rule>) -> Result<IfStatement, SyntaxError> {
    debug_assert_eq!(pair.as_rule(), Rule::If);

    let mut pairs = pair.into_inner();
    let condition = build_expression_from_pair(next_child(&mut pairs, Rule::If))?;
    let if_branch = build_block_from_pair(next_child(&mut pairs, Rule::If))?;
    let else_branch = match pairs.next() {
        Some(pair) => build_block_from_pair(pair)?,
        None => Block::default(),
    };

    debug_assert_eq!(pairs.next(), None);

    Ok(IfStatement {
        condition,
        if_branch,
        else_branch,
    })
}

fn build_while_from_pair(pair: Pair<Rule>) -> Result<WhileStatement, SyntaxError> {
    debug_assert_eq!(pair.as_rule(), Rule::While);

    let mut pairs = pair.into_inner();
    let condition = build_expression_from_pair(next_child(&mut pairs, Rule::While))?;
    let body = build_block_from_pair(next_child(&mut pairs, Rule::While))?;

    debug_assert_eq!(pairs.next(), None);

    Ok(WhileStatement { condition, body })
}

fn build_block_from_pair(pair: Pair<Rule>) -> Result<Block, SyntaxError> {
    debug_assert_eq!(pair.as_rule(), Rule::Block);

    let statements = pair
        .into_inner()
        .map(build_statement_from_pair)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Block::new(statements))
}

fn build_expression_from_pair(pair: Pair<Rule>) -> Result<Expression, SyntaxError> {
    debug_assert_eq!(pair.as_rule(), Rule::Expr);

    let mut pairs = pair.into_inner();

    let mut expr = build_arithmetic_from_pair(next_child(&mut pairs, Rule::Expr))?;

    while let Some(op) = pairs.next() {
        let op = match op.as_rule() {
            Rule::Lt => BinaryOperator::LessThan,
            Rule::Le => BinaryOperator::LessThanOrEqual,
            Rule::Gt => BinaryOperator::GreaterThan,
            Rule::Ge => BinaryOperator::GreaterThanOrEqual,
            Rule::Eq => BinaryOperator::Equal,
            r => unreachable!("Unexpected comparison operator: {r:?}"),
        };

        let rhs = build_arithmetic_from_pair(next_child(&mut pairs, Rule::Expr))?;

        expr = Expression::binary(expr, op, rhs);
    }

    Ok(expr)
}

fn pratt() -> &'static PrattParser<Rule> {
    static PRATT: OnceLock<PrattParser<Rule>> = OnceLock::new();
    PRATT.get_or_init(|| {
        PrattParser::new()
            .op(Op::infix(Rule::Add, Assoc::Left) | Op::infix(Rule::Sub, Assoc::Left))
            .op(Op::infix(Rule::Mul, Assoc::Left)
                | Op::infix(Rule::Div, Assoc::Left)
                | Op::infix(Rule::Rem, Assoc::Left))
            .op(Op::prefix(Rule::Not))
    })
}

fn build_arithmetic_from_pair(pair: Pair<Rule>) -> Result<Expression, SyntaxError> {
    debug_assert_eq!(pair.as_rule(), Rule::Arith);

    pratt()
        .map_primary(|primary| match primary.as_rule() {
            Rule::Int => build_integer_from_pair(primary),
            Rule::Str => Ok(Expression::StringLiteral({
                let s = primary.as_str();
                s[1..s.len() - 1].to_string()
            })),
            Rule::True => Ok(Expression::BooleanLiteral(true)),
            Rule::False => Ok(Expression::BooleanLiteral(false)),
            Rule::Ident => Ok(Expression::Identifier(build_identifier_from_pair(primary))),
            Rule::Expr => build_expression_from_pair(primary),
            r => unreachable!("Unexpected rule in primary expression: {r:?}"),
        })
        .map_prefix(|op, rhs| match op.as_rule() {
            Rule::Not => Ok(Expression::not(rhs?)),
            r => unreachable!("Unexpected rule in prefix expression: {r:?}"),
        })
        .map_infix(|lhs, op, rhs| {
            let op = match op.as_rule() {
                Rule::Add => BinaryOperator::Plus,
                Rule::Sub => BinaryOperator::Minus,
                Rule::Mul => BinaryOperator::Multiply,
                Rule::Div => BinaryOperator::Divide,
                Rule::Rem => BinaryOperator::Modulo,
                r => unreachable!("Unexpected rule in infix expression: {r:?}"),
            };
            Ok(Expression::binary(lhs?, op, rhs?))
        })
        .parse(pair.into_inner())
}

fn build_integer_from_pair(pair: Pair<Rule>) -> Result<Expression, SyntaxError> {
    debug_assert_eq!(pair.as_rule(), Rule::Int);

    pair.as_str()
        .parse()
        .map(Expression::IntegerLiteral)
        .map_err(|_| {
            SyntaxError::custom(
                pair.as_span(),
                format!("integer literal `{}` does not fit in 64 bits", pair.as_str()),
            )
        })
}

fn build_identifier_from_pair(pair: Pair<Rule>) -> String {
    debug_assert_eq!(pair.as_rule(), Rule::Ident);
    pair.as_str().to_string()
}
