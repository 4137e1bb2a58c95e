//! Statement parsing implementation
//!
//! # Grammar
//!
//! ```text
//! statement ::= ';' | move_stmt | write_stmt | goto_stmt
//!             | if_stmt | while_stmt | halt_stmt
//! move_stmt  ::= ('left' | 'right' | '<<' | '>>') expression ';'
//! write_stmt ::= 'write' expression ';'
//! goto_stmt  ::= 'goto' IDENT ';'
//! if_stmt    ::= 'if' '(' expression ')' block ('else' block)?
//! while_stmt ::= 'while' '(' expression ')' block
//! halt_stmt  ::= 'halt' ';'
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::{Block, Direction, Expression, Statement};
use crate::parser::lexer::Lexeme;
use crate::parser::parser::{ParseError, ParseErrorKind, Parser};
use crate::parser::token::{Keyword, TokenKind};

impl Parser<'_> {
    /// Parse a statement, trying each alternative in turn
    pub(crate) fn parse_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        let alternatives: [fn(&mut Self) -> Result<Option<Statement>, ParseError>; 7] = [
            Self::parse_empty_statement,
            Self::parse_move_statement,
            Self::parse_write_statement,
            Self::parse_goto_statement,
            Self::parse_conditional,
            Self::parse_while_statement,
            Self::parse_halt_statement,
        ];

        for alternative in alternatives {
            if let Some(statement) = self.attempt(alternative)? {
                return Ok(Some(statement));
            }
        }
        Ok(None)
    }

    fn parse_empty_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        Ok(self
            .leading(TokenKind::Operator(';'))?
            .map(|semi| Statement::Empty { line: semi.line }))
    }

    fn parse_move_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        let Some(command) = self.lexer.next()? else {
            return Ok(None);
        };
        let direction = match command.kind {
            TokenKind::Keyword(Keyword::Left | Keyword::ShiftLeft) => Direction::Left,
            TokenKind::Keyword(Keyword::Right | Keyword::ShiftRight) => Direction::Right,
            _ => return Ok(None),
        };

        let distance = self.required_expression(&command, "Move missing distance")?;
        let statement = Statement::movement(&command, direction, distance)?;
        self.expect_semicolon(&command)?;
        Ok(Some(statement))
    }

    fn parse_write_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        let Some(command) = self.leading(TokenKind::Keyword(Keyword::Write))? else {
            return Ok(None);
        };

        let value = self.required_expression(&command, "Write missing value")?;
        let statement = Statement::write(&command, value)?;
        self.expect_semicolon(&command)?;
        Ok(Some(statement))
    }

    fn parse_goto_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        let Some(command) = self.leading(TokenKind::Keyword(Keyword::Goto))? else {
            return Ok(None);
        };

        let label = self.expect(TokenKind::Identifier, &command, "Goto missing label")?;
        if !self.env.contains(&label.text) {
            return Err(ParseError::at(
                &label,
                ParseErrorKind::UnresolvedLabel,
                format!("Label '{}' is not defined", label.text),
            ));
        }
        self.expect_semicolon(&command)?;

        Ok(Some(Statement::Goto {
            label: label.text,
            line: command.line,
        }))
    }

    /// Parse `if (cond) { ... }` with an optional `else { ... }`
    pub(crate) fn parse_conditional(&mut self) -> Result<Option<Statement>, ParseError> {
        let Some(command) = self.leading(TokenKind::Keyword(Keyword::If))? else {
            return Ok(None);
        };

        let condition = self.parse_condition(&command)?;
        let then_block = self.required_block(&command, "If missing statement block")?;

        let else_block = self.attempt(|p| {
            let Some(other) = p.leading(TokenKind::Keyword(Keyword::Else))? else {
                return Ok(None);
            };
            p.required_block(&other, "Else missing statement block").map(Some)
        })?;

        Ok(Some(Statement::If {
            condition,
            then_block,
            else_block,
            line: command.line,
        }))
    }

    fn parse_while_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        let Some(command) = self.leading(TokenKind::Keyword(Keyword::While))? else {
            return Ok(None);
        };

        let condition = self.parse_condition(&command)?;
        let body = self.required_block(&command, "While missing statement block")?;

        Ok(Some(Statement::While {
            condition,
            body,
            line: command.line,
        }))
    }

    fn parse_halt_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        let Some(command) = self.leading(TokenKind::Keyword(Keyword::Halt))? else {
            return Ok(None);
        };
        self.expect_semicolon(&command)?;
        Ok(Some(Statement::Halt { line: command.line }))
    }

    // ===== Helpers =====

    /// `'(' expression ')'` with a boolean expression
    fn parse_condition(&mut self, command: &Lexeme) -> Result<Expression, ParseError> {
        let open = self.expect(
            TokenKind::Operator('('),
            command,
            "Conditional missing opening parenthesis",
        )?;
        let condition = self.required_expression(&open, "Conditional missing expression")?;
        Statement::check_condition(command, &condition)?;
        self.expect(
            TokenKind::Operator(')'),
            &open,
            "Conditional missing closing parenthesis",
        )?;
        Ok(condition)
    }

    fn required_block(&mut self, command: &Lexeme, message: &str) -> Result<Block, ParseError> {
        match self.parse_block()? {
            Some(block) => Ok(block),
            None => Err(self.missing(command, message)?),
        }
    }

    pub(crate) fn required_expression(
        &mut self,
        after: &Lexeme,
        message: &str,
    ) -> Result<Expression, ParseError> {
        match self.parse_expression()? {
            Some(expression) => Ok(expression),
            None => Err(self.missing(after, message)?),
        }
    }

    fn expect_semicolon(&mut self, command: &Lexeme) -> Result<Lexeme, ParseError> {
        self.expect(TokenKind::Operator(';'), command, "Missing Semicolon")
    }

    /// MissingToken error at the next lexeme, or at `after` when input ran out
    pub(crate) fn missing(&mut self, after: &Lexeme, message: &str) -> Result<ParseError, ParseError> {
        let found = self.lexer.next()?.unwrap_or_else(|| after.clone());
        Ok(ParseError::at(&found, ParseErrorKind::MissingToken, message))
    }
}
