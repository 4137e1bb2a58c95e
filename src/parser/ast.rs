// AST definitions for the tape language
//
// Expression nodes get their result type when they are built and keep it.
// The checking constructors below are the only way to build a node, so an
// ill-typed tree cannot exist.

use super::lexer::Lexeme;
use super::parser::{ParseError, ParseErrorKind};
use crate::memory::value::Value;
use std::fmt;
use std::rc::Rc;

/// Static result type of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Number,
    Character,
    Boolean,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Number => write!(f, "number"),
            ValueType::Character => write!(f, "character"),
            ValueType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Direction of a tape move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn is_right(self) -> bool {
        self == Direction::Right
    }
}

/// Binary operators. All of them yield a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEq => "<=",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        }
    }

    fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Nested(Box<Expression>),
    Read,
    Literal(Value),
}

/// Typed expression node
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    kind: ExprKind,
    ty: ValueType,
    line: usize,
}

impl Expression {
    /// `op lhs rhs`. Both operands must share a type; `&` and `|` want booleans.
    pub fn binary(
        operator: &Lexeme,
        op: BinaryOp,
        lhs: Expression,
        rhs: Expression,
    ) -> Result<Self, ParseError> {
        if lhs.ty != rhs.ty {
            return Err(ParseError::at(
                operator,
                ParseErrorKind::TypeMismatch,
                format!(
                    "Argument types do not match each other ({} vs {})",
                    lhs.ty, rhs.ty
                ),
            ));
        }
        if op.is_logical() && lhs.ty != ValueType::Boolean {
            return Err(ParseError::at(
                operator,
                ParseErrorKind::TypeMismatch,
                format!("'{}' needs boolean operands, found {}", op.symbol(), lhs.ty),
            ));
        }

        Ok(Expression {
            kind: ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty: ValueType::Boolean,
            line: operator.line,
        })
    }

    /// `! operand`, which must be boolean
    pub fn unary(operator: &Lexeme, op: UnaryOp, operand: Expression) -> Result<Self, ParseError> {
        if operand.ty != ValueType::Boolean {
            return Err(ParseError::at(
                operator,
                ParseErrorKind::TypeMismatch,
                format!("Unary operator needs a boolean operand, found {}", operand.ty),
            ));
        }

        Ok(Expression {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty: ValueType::Boolean,
            line: operator.line,
        })
    }

    /// `( inner )` keeps the inner type
    pub fn nested(open: &Lexeme, inner: Expression) -> Self {
        Expression {
            ty: inner.ty,
            kind: ExprKind::Nested(Box::new(inner)),
            line: open.line,
        }
    }

    pub fn read(command: &Lexeme) -> Self {
        Expression {
            kind: ExprKind::Read,
            ty: ValueType::Character,
            line: command.line,
        }
    }

    pub fn literal(lexeme: &Lexeme, value: Value) -> Self {
        Expression {
            kind: ExprKind::Literal(value),
            ty: value.value_type(),
            line: lexeme.line,
        }
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn ty(&self) -> ValueType {
        self.ty
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Binary { op, lhs, rhs } => write!(f, "{} {} {}", op.symbol(), lhs, rhs),
            ExprKind::Unary { operand, .. } => write!(f, "!{}", operand),
            ExprKind::Nested(inner) => write!(f, "({})", inner),
            ExprKind::Read => write!(f, "read"),
            ExprKind::Literal(value) => write!(f, "{}", value),
        }
    }
}

/// Brace-delimited statement list
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Empty {
        line: usize,
    },
    Move {
        direction: Direction,
        distance: Expression,
        line: usize,
    },
    Write {
        value: Expression,
        line: usize,
    },
    Goto {
        label: String,
        line: usize,
    },
    If {
        condition: Expression,
        then_block: Block,
        else_block: Option<Block>,
        line: usize,
    },
    While {
        condition: Expression,
        body: Block,
        line: usize,
    },
    Halt {
        line: usize,
    },
}

impl Statement {
    /// Move by a number-typed distance
    pub fn movement(
        command: &Lexeme,
        direction: Direction,
        distance: Expression,
    ) -> Result<Self, ParseError> {
        if distance.ty != ValueType::Number {
            return Err(ParseError::at(
                command,
                ParseErrorKind::TypeMismatch,
                format!("Moving the machine requires a numeric expression, found {}", distance.ty),
            ));
        }
        Ok(Statement::Move {
            direction,
            distance,
            line: command.line,
        })
    }

    /// Write a character-typed value
    pub fn write(command: &Lexeme, value: Expression) -> Result<Self, ParseError> {
        if value.ty != ValueType::Character {
            return Err(ParseError::at(
                command,
                ParseErrorKind::TypeMismatch,
                format!("Can't write anything other than a single character, found {}", value.ty),
            ));
        }
        Ok(Statement::Write {
            value,
            line: command.line,
        })
    }

    /// `if`/`while` condition check
    pub fn check_condition(command: &Lexeme, condition: &Expression) -> Result<(), ParseError> {
        if condition.ty != ValueType::Boolean {
            return Err(ParseError::at(
                command,
                ParseErrorKind::TypeMismatch,
                format!("Conditional statement must test a boolean, found {}", condition.ty),
            ));
        }
        Ok(())
    }

    pub fn line(&self) -> usize {
        match self {
            Statement::Empty { line }
            | Statement::Move { line, .. }
            | Statement::Write { line, .. }
            | Statement::Goto { line, .. }
            | Statement::If { line, .. }
            | Statement::While { line, .. }
            | Statement::Halt { line } => *line,
        }
    }
}

/// `name: { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub body: Rc<Block>,
    pub line: usize,
}

/// Top-level program item
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Statement(Statement),
    Function(FunctionDef),
}

/// Root of the tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub items: Vec<Item>,
}

impl Program {
    pub fn new() -> Self {
        Program { items: Vec::new() }
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(def) => Some(def),
            Item::Statement(_) => None,
        })
    }
}
