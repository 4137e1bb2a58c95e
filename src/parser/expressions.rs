//! Expression parsing
//!
//! Expressions are written in prefix form, so no precedence is involved:
//!
//! ```text
//! expression ::= '!' expression
//!              | binary_op expression expression
//!              | '(' expression ')'
//!              | 'read' | '^'
//!              | QUOTED | INTEGER | 'true' | 'false'
//! binary_op  ::= '=' | '!=' | '<' | '>' | '<=' | '>=' | '&' | '|'
//! ```
//!
//! Types are checked as each node is built (see [`Expression`]).

use crate::memory::value::Value;
use crate::parser::ast::{BinaryOp, Expression, UnaryOp};
use crate::parser::lexer::Lexeme;
use crate::parser::parser::{ParseError, ParseErrorKind, Parser};
use crate::parser::token::{Keyword, TokenKind};

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Operator('=') => Some(BinaryOp::Eq),
        TokenKind::Keyword(Keyword::NotEq) => Some(BinaryOp::NotEq),
        TokenKind::Operator('<') => Some(BinaryOp::Less),
        TokenKind::Operator('>') => Some(BinaryOp::Greater),
        TokenKind::Keyword(Keyword::LessEq) => Some(BinaryOp::LessEq),
        TokenKind::Keyword(Keyword::GreaterEq) => Some(BinaryOp::GreaterEq),
        TokenKind::Operator('&') => Some(BinaryOp::And),
        TokenKind::Operator('|') => Some(BinaryOp::Or),
        _ => None,
    }
}

impl Parser<'_> {
    /// Parse one expression, or `None` if the next token cannot start one
    pub(crate) fn parse_expression(&mut self) -> Result<Option<Expression>, ParseError> {
        let alternatives: [fn(&mut Self) -> Result<Option<Expression>, ParseError>; 5] = [
            Self::parse_unary,
            Self::parse_binary,
            Self::parse_nested,
            Self::parse_read,
            Self::parse_literal,
        ];

        for alternative in alternatives {
            if let Some(expression) = self.attempt(alternative)? {
                return Ok(Some(expression));
            }
        }
        Ok(None)
    }

    fn parse_unary(&mut self) -> Result<Option<Expression>, ParseError> {
        let Some(operator) = self.leading(TokenKind::Operator('!'))? else {
            return Ok(None);
        };
        let operand = self.required_expression(&operator, "Unary operator missing operand")?;
        Expression::unary(&operator, UnaryOp::Not, operand).map(Some)
    }

    fn parse_binary(&mut self) -> Result<Option<Expression>, ParseError> {
        let Some(operator) = self.lexer.next()? else {
            return Ok(None);
        };
        let Some(op) = binary_op(operator.kind) else {
            return Ok(None);
        };

        let lhs = self.required_expression(&operator, "Binary operator missing left operand")?;
        let rhs = self.required_expression(&operator, "Binary operator missing right operand")?;
        Expression::binary(&operator, op, lhs, rhs).map(Some)
    }

    fn parse_nested(&mut self) -> Result<Option<Expression>, ParseError> {
        let Some(open) = self.leading(TokenKind::Operator('('))? else {
            return Ok(None);
        };
        let inner = self.required_expression(&open, "Unfilled nested expression")?;
        self.expect(TokenKind::Operator(')'), &open, "Unmatched (")?;
        Ok(Some(Expression::nested(&open, inner)))
    }

    fn parse_read(&mut self) -> Result<Option<Expression>, ParseError> {
        Ok(self.lexer.next()?.and_then(|command| match command.kind {
            TokenKind::Keyword(Keyword::Read) | TokenKind::Operator('^') => {
                Some(Expression::read(&command))
            }
            _ => None,
        }))
    }

    fn parse_literal(&mut self) -> Result<Option<Expression>, ParseError> {
        let Some(lexeme) = self.lexer.next()? else {
            return Ok(None);
        };
        let value = match lexeme.kind {
            TokenKind::Literal => Value::Character(character_value(&lexeme)?),
            TokenKind::Integer => Value::Numeric(integer_value(&lexeme)?),
            TokenKind::Keyword(Keyword::True) => Value::Boolean(true),
            TokenKind::Keyword(Keyword::False) => Value::Boolean(false),
            _ => return Ok(None),
        };
        Ok(Some(Expression::literal(&lexeme, value)))
    }
}

/// The glyph between the quotes of `'x'`
fn character_value(lexeme: &Lexeme) -> Result<char, ParseError> {
    let mut chars = lexeme.text.chars();
    match (chars.next(), chars.next(), chars.next(), chars.next()) {
        (Some('\''), Some(glyph), Some('\''), None) => Ok(glyph),
        _ => Err(ParseError::at(
            lexeme,
            ParseErrorKind::InvalidLiteral,
            "Malformed character literal",
        )),
    }
}

fn integer_value(lexeme: &Lexeme) -> Result<i64, ParseError> {
    lexeme.text.parse::<i64>().map_err(|_| {
        ParseError::at(
            lexeme,
            ParseErrorKind::InvalidLiteral,
            "Integer literal out of range",
        )
    })
}

#[cfg(test)]
mod tests {
    use crate::memory::value::Value;
    use crate::parser::ast::{BinaryOp, ExprKind, Expression, ValueType};
    use crate::parser::buffer::Buffer;
    use crate::parser::lexer::Lexer;
    use crate::parser::parser::{ParseError, ParseErrorKind, Parser};
    use crate::parser::token::TokenTable;

    fn expression(source: &str) -> Result<Option<Expression>, ParseError> {
        let table = TokenTable::standard();
        let mut parser = Parser::new(Lexer::new(Buffer::new(source), &table));
        parser.parse_expression()
    }

    #[test]
    fn test_literals() {
        let e = expression("'z'").unwrap().unwrap();
        assert_eq!(e.kind(), &ExprKind::Literal(Value::Character('z')));
        assert_eq!(e.ty(), ValueType::Character);

        let e = expression("42").unwrap().unwrap();
        assert_eq!(e.kind(), &ExprKind::Literal(Value::Numeric(42)));

        let e = expression("false").unwrap().unwrap();
        assert_eq!(e.ty(), ValueType::Boolean);
    }

    #[test]
    fn test_prefix_nesting() {
        let e = expression("| (= ^ 'a') !(< 1 2)").unwrap().unwrap();
        assert_eq!(e.ty(), ValueType::Boolean);
        match e.kind() {
            ExprKind::Binary { op, lhs, rhs } => {
                assert_eq!(*op, BinaryOp::Or);
                assert!(matches!(lhs.kind(), ExprKind::Nested(_)));
                assert!(matches!(rhs.kind(), ExprKind::Unary { .. }));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_two_character_operators() {
        let e = expression("<= 1 2").unwrap().unwrap();
        assert!(matches!(e.kind(), ExprKind::Binary { op: BinaryOp::LessEq, .. }));
        let e = expression("!= read 'x'").unwrap().unwrap();
        assert!(matches!(e.kind(), ExprKind::Binary { op: BinaryOp::NotEq, .. }));
    }

    #[test]
    fn test_no_expression_is_soft() {
        assert_eq!(expression(";").unwrap(), None);
        assert_eq!(expression("").unwrap(), None);
    }

    #[test]
    fn test_committed_failures() {
        let err = expression("= 1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingToken);

        let err = expression("(true").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingToken);

        let err = expression("!5").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TypeMismatch);

        let err = expression("99999999999999999999").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidLiteral);
    }
}
