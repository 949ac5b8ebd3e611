use std::fmt::{self, Display, Formatter};

/// A whole program is a block without the surrounding braces.
pub type Program = Block;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Assignment(Assignment),
    IfStatement(IfStatement),
    WhileStatement(WhileStatement),
    PrintStatement(PrintStatement),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub lhs: String,
    pub rhs: Expression,
}

/// `else_branch` is empty when the source has no `else`.
#[derive(Clone, Debug, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub if_branch: Block,
    pub else_branch: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrintStatement {
    pub expression: Expression,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Equal => "==",
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Binary(Box<Expression>, BinaryOperator, Box<Expression>),
    Not(Box<Expression>),
    Identifier(String),
    IntegerLiteral(i64),
    BooleanLiteral(bool),
    StringLiteral(String),
}

impl Expression {
    pub fn binary(lhs: Expression, op: BinaryOperator, rhs: Expression) -> Self {
        Expression::Binary(Box::new(lhs), op, Box::new(rhs))
    }

    pub fn not(operand: Expression) -> Self {
        Expression::Not(Box::new(operand))
    }
}

/// Renders every binary node inside its own parentheses, so the grouping
/// chosen by the parser is visible.
impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Binary(lhs, op, rhs) => write!(f, "({lhs} {op} {rhs})"),
            Expression::Not(operand) => write!(f, "!{operand}"),
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::IntegerLiteral(v) => write!(f, "{v}"),
            Expression::BooleanLiteral(v) => write!(f, "{v}"),
            Expression::StringLiteral(v) => write!(f, "\"{v}\""),
        }
    }
}
